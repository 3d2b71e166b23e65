//! Plotters-powered line chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast palette for terminal rendering, cycled per line.
pub const PALETTE: [(u8, u8, u8); 8] = [
    (0, 255, 255),
    (255, 255, 0),
    (0, 255, 0),
    (255, 0, 255),
    (255, 128, 0),
    (128, 160, 255),
    (255, 0, 0),
    (255, 255, 255),
];

/// Ratatui color matching a palette slot (used by the legend).
pub fn palette_color(idx: usize) -> Color {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// One line in plot coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SeriesPlottersChart<'a> {
    pub lines: &'a [PlotLine],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (idx, line) in self.lines.iter().enumerate() {
                let (r, g, b) = PALETTE[idx % PALETTE.len()];
                let color = RGBColor(r, g, b);
                if line.points.len() == 1 {
                    // A one-sample line has no segment to draw.
                    chart.draw_series(line.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                } else {
                    chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
