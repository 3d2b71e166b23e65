//! Ratatui-based terminal UI.
//!
//! A settings panel picks the scope (world or a tracked country), the view and
//! the metric; the chart area shows line views with Plotters and the ranking
//! view with Ratatui's `BarChart`.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, ChartOutput};
use crate::cli::SourceArgs;
use crate::config::Settings;
use crate::data::{PopulationTable, SnapshotSource};
use crate::domain::{ChartKind, DerivedSeries, Metric, RankedEntity, SeriesX, Snapshot, TRACKED_COUNTRIES, ViewKind};
use crate::error::AppError;
use crate::report::{fmt_compact, fmt_thousands};
use crate::stats::{AssemblerConfig, Scope, SeriesAssembler, View};

mod plotters_chart;

use plotters_chart::{PlotLine, SeriesPlottersChart, palette_color};

/// Start the TUI.
pub fn run(args: SourceArgs, settings: Settings) -> Result<(), AppError> {
    // Build everything that can fail before taking over the terminal.
    let source = pipeline::open_source(&args, &settings)?;
    let config = pipeline::assembler_config(&args, &settings, None);
    let population = PopulationTable::builtin()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(source, population, config);
    app.refresh_snapshot();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

const FIELD_COUNT: usize = 3;

struct App {
    source: Box<dyn SnapshotSource>,
    population: PopulationTable,
    config: AssemblerConfig,
    /// 0 = world, `n` = `TRACKED_COUNTRIES[n - 1]`.
    scope_idx: usize,
    view: ViewKind,
    metric: Metric,
    selected_field: usize,
    status: String,
    snapshot: Option<Snapshot>,
    output: Option<ChartOutput>,
}

impl App {
    fn new(source: Box<dyn SnapshotSource>, population: PopulationTable, config: AssemblerConfig) -> Self {
        Self {
            source,
            population,
            config,
            scope_idx: 0,
            view: ViewKind::Week,
            metric: Metric::Confirmed,
            selected_field: 0,
            status: "Fetching snapshot...".to_string(),
            snapshot: None,
            output: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => self.selected_field = (self.selected_field + 1).min(FIELD_COUNT - 1),
            KeyCode::Left => self.adjust_field(false),
            KeyCode::Right => self.adjust_field(true),
            KeyCode::Char('r') => self.refresh_snapshot(),
            KeyCode::Char('w') => {
                self.scope_idx = 0;
                self.rebuild();
            }
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, forward: bool) {
        match self.selected_field {
            0 => {
                let n = TRACKED_COUNTRIES.len() + 1;
                self.scope_idx = if forward {
                    (self.scope_idx + 1) % n
                } else {
                    (self.scope_idx + n - 1) % n
                };
            }
            1 => self.view = if forward { self.view.next() } else { self.view.prev() },
            2 => self.metric = if forward { self.metric.next() } else { self.metric.prev() },
            _ => {}
        }
        self.rebuild();
    }

    fn scope(&self) -> (Scope, String) {
        match self.scope_idx.checked_sub(1).and_then(|i| TRACKED_COUNTRIES.get(i)) {
            Some(country) => (Scope::Entity(country.server_id.to_string()), country.display()),
            None => (Scope::World, "World".to_string()),
        }
    }

    fn refresh_snapshot(&mut self) {
        self.status = "Fetching snapshot...".to_string();
        match self.source.fetch_snapshot() {
            Ok(snapshot) => {
                self.status = format!("{} entities", snapshot.len());
                self.snapshot = Some(snapshot);
                self.rebuild();
            }
            Err(e) => {
                // Keep showing the previous snapshot, if any.
                self.status = format!("Fetch failed: {e}");
            }
        }
    }

    fn rebuild(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            self.output = None;
            return;
        };

        let assembler = SeriesAssembler::new(&self.population, self.config);
        let chart = ChartKind::new(self.view, self.metric);
        let (scope, label) = self.scope();
        let title = format!("{label}: {}", chart.title());
        match pipeline::build_chart(&assembler, snapshot, chart, scope, title) {
            Ok(out) => {
                if out.view.is_empty() {
                    self.status = "Nothing to draw for this view.".to_string();
                }
                self.output = Some(out);
            }
            Err(e) => {
                self.status = e.to_string();
                self.output = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let updated = self
            .snapshot
            .as_ref()
            .and_then(Snapshot::latest_date)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let (_, scope) = self.scope();

        let lines = vec![
            Line::from(vec![
                Span::styled("covid", Style::default().fg(Color::Cyan)),
                Span::raw(" - COVID-19 time-series charts"),
            ]),
            Line::from(Span::styled(
                format!(
                    "scope: {scope} | view: {} | metric: {} | updated: {updated} | top: {} | threshold: {}",
                    self.view.title(),
                    self.metric.title(),
                    self.config.top_n,
                    self.config.threshold.min(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self.output.as_ref().map(|o| o.title.as_str()).unwrap_or("Chart");
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(out) = &self.output else {
            let msg = Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        match &out.view {
            View::Lines(lines) => self.draw_lines(frame, inner, lines),
            View::Bars(bars) => draw_bars(frame, inner, bars),
        }
    }

    fn draw_lines(&self, frame: &mut ratatui::Frame<'_>, inner: Rect, lines: &[DerivedSeries]) {
        let Some(prepared) = prepare_lines(lines) else {
            let msg = Paragraph::new("No samples pass the display filter.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        // Reserve the last row for the legend.
        let legend_rect = Rect {
            y: inner.y + inner.height.saturating_sub(1),
            height: 1.min(inner.height),
            ..inner
        };
        let plot_area = Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        };

        let fmt_x: fn(f64) -> String = if prepared.dated { fmt_axis_date } else { fmt_axis_day };
        let x_label = if prepared.dated { "date" } else { "day" };
        let y_label = if self.view == ViewKind::Mortality { "%" } else { "count" };

        let (chart_rect, insets) = chart_layout(plot_area);
        let widget = SeriesPlottersChart {
            lines: &prepared.lines,
            x_bounds: prepared.x_bounds,
            y_bounds: prepared.y_bounds,
            x_label,
            y_label,
            fmt_x,
            fmt_y: fmt_compact,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, plot_area, chart_rect, insets, &prepared, fmt_x);
        }

        let spans: Vec<Span> = prepared
            .lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| {
                [
                    Span::styled("■ ", Style::default().fg(palette_color(idx))),
                    Span::raw(format!("{}  ", line.label)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), legend_rect);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (_, scope) = self.scope();
        let metric = if self.view.uses_metric() {
            self.metric.title().to_string()
        } else {
            format!("{} (not used)", self.metric.title())
        };
        let items = vec![
            ListItem::new(format!("Scope: {scope}")),
            ListItem::new(format!("View: {}", self.view.title())),
            ListItem::new(format!("Metric: {metric}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  w world  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Ranking view: horizontal bars, largest on top.
fn draw_bars(frame: &mut ratatui::Frame<'_>, inner: Rect, bars: &[RankedEntity]) {
    let items: Vec<Bar> = bars
        .iter()
        .rev()
        .map(|b| {
            Bar::default()
                .value(b.value)
                .label(Line::from(b.name.clone()))
                .text_value(fmt_thousands(b.value))
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(BarGroup::default().bars(&items));
    frame.render_widget(chart, inner);
}

/// Line data in plot coordinates with shared bounds.
struct PreparedLines {
    lines: Vec<PlotLine>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    /// Whether x values are dates (else day numbers).
    dated: bool,
}

/// Convert derived series (plus their secondary lines) to plot coordinates.
///
/// Returns `None` when there is nothing to draw.
fn prepare_lines(series: &[DerivedSeries]) -> Option<PreparedLines> {
    let mut lines = Vec::new();
    let mut dated = false;
    for s in series.iter().filter(|s| !s.is_empty()) {
        dated |= matches!(s.x.first(), Some(SeriesX::Date(_)));
        lines.push(PlotLine {
            label: s.label.clone(),
            points: s.points().map(|(x, y)| (x.as_f64(), y)).collect(),
        });
        if let Some(sec) = &s.secondary {
            lines.push(PlotLine {
                label: format!("{} {}", s.label, sec.label),
                points: s.x.iter().map(|x| x.as_f64()).zip(sec.y.iter().copied()).collect(),
            });
        }
    }

    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y1 = f64::NEG_INFINITY;
    for &(x, y) in lines.iter().flat_map(|l| l.points.iter()) {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    if !x0.is_finite() {
        return None;
    }
    if x1 <= x0 {
        x0 -= 1.0;
        x1 += 1.0;
    }
    if y1 <= 0.0 {
        y1 = 1.0;
    }

    Some(PreparedLines {
        lines,
        x_bounds: [x0, x1],
        y_bounds: [0.0, y1 * 1.05],
        dated,
    })
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d %b").to_string())
        .unwrap_or_default()
}

fn fmt_axis_day(v: f64) -> String {
    format!("{v:.0}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    prepared: &PreparedLines,
    fmt_x: fn(f64) -> String,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x_lo, x_hi] = prepared.x_bounds;
    let [y_lo, y_hi] = prepared.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_x(x_lo + u * (x_hi - x_lo));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.chars().count() as u16;
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_compact(y_lo + u * (y_hi - y_lo));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(if prepared.dated { "date" } else { "day" })
        .alignment(Alignment::Center)
        .style(style);
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DerivedSecondary;

    #[test]
    fn prepare_lines_includes_secondary_and_bounds() {
        let d0 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let mut s = DerivedSeries::new("Italy");
        s.push(SeriesX::Date(d0), 10.0);
        s.push(SeriesX::Date(d0.succ_opt().unwrap()), 20.0);
        s.secondary = Some(DerivedSecondary {
            label: "Recovered".into(),
            y: vec![1.0, 2.0],
        });

        let prepared = prepare_lines(&[s, DerivedSeries::new("Empty")]).unwrap();
        assert!(prepared.dated);
        assert_eq!(prepared.lines.len(), 2);
        assert_eq!(prepared.lines[1].label, "Italy Recovered");
        assert_eq!(prepared.x_bounds[1] - prepared.x_bounds[0], 1.0);
        assert_eq!(prepared.y_bounds, [0.0, 21.0]);
    }

    #[test]
    fn nothing_to_draw() {
        assert!(prepare_lines(&[]).is_none());
        assert!(prepare_lines(&[DerivedSeries::new("X")]).is_none());
    }

    #[test]
    fn axis_labels() {
        let d = NaiveDate::from_ymd_opt(2020, 4, 5).unwrap();
        assert_eq!(fmt_axis_date(SeriesX::Date(d).as_f64()), "05 Apr");
        assert_eq!(fmt_axis_day(12.0), "12");
    }
}
