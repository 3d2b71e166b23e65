//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a chat reply
//! - deterministic output (helpful for golden tests)
//!
//! Line charts draw one glyph per series (secondary series get their own
//! glyph) with a legend underneath. Bar charts are horizontal, largest on top.

use crate::domain::{DerivedSeries, RankedEntity, SeriesX};
use crate::report::{fmt_compact, fmt_thousands, truncate};

/// Glyphs assigned to series in order; wraps around for long legends.
pub const SERIES_GLYPHS: [char; 10] = ['*', '+', 'o', 'x', '#', '@', '%', '&', '=', '~'];

const MAX_BAR_LABEL: usize = 20;

/// One drawable line: label, glyph and points in plot coordinates.
struct Trace<'a> {
    label: String,
    glyph: char,
    x: &'a [SeriesX],
    y: &'a [f64],
}

/// Render line series on a shared grid.
pub fn render_line_chart(title: &str, series: &[DerivedSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let traces = collect_traces(series);
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');

    let Some((x_first, x_last)) = x_bounds(&traces) else {
        out.push_str("(no data)\n");
        return out;
    };
    let (x_min, x_max) = spread(x_first.as_f64(), x_last.as_f64());
    let (y_min, y_max) = y_range(&traces);

    let mut grid = vec![vec![' '; width]; height];
    for trace in &traces {
        draw_trace(&mut grid, trace, (x_min, x_max), (y_min, y_max));
    }

    out.push_str(&format!(
        "x=[{x_first}, {x_last}] | y=[{}, {}]\n",
        fmt_compact(y_min),
        fmt_compact(y_max)
    ));
    for row in grid {
        let line: String = row.into_iter().collect();
        out.push('|');
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('\n');

    let legend: Vec<String> = traces
        .iter()
        .map(|t| format!("{} {}", t.glyph, t.label))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

/// Render a ranking as horizontal bars.
///
/// `bars` is expected ascending (the assembler's order), so the last entry,
/// the largest, is printed first.
pub fn render_bar_chart(title: &str, bars: &[RankedEntity], width: usize) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');

    if bars.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let labels: Vec<String> = bars.iter().map(|b| truncate(&b.name, MAX_BAR_LABEL)).collect();
    let values: Vec<String> = bars.iter().map(|b| fmt_thousands(b.value)).collect();
    let label_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let value_w = values.iter().map(String::len).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + value_w + 3).max(1);
    let max = bars.iter().map(|b| b.value).max().unwrap_or(0);

    for idx in (0..bars.len()).rev() {
        let len = if max == 0 {
            0
        } else {
            ((bars[idx].value as f64 / max as f64) * bar_w as f64).round() as usize
        };
        let label = &labels[idx];
        let pad = label_w - label.chars().count();
        out.push_str(&format!(
            "{label}{} |{} {}\n",
            " ".repeat(pad),
            "#".repeat(len),
            values[idx]
        ));
    }

    out
}

fn collect_traces(series: &[DerivedSeries]) -> Vec<Trace<'_>> {
    let mut traces = Vec::new();
    for s in series {
        if s.is_empty() {
            continue;
        }
        traces.push(Trace {
            label: s.label.clone(),
            glyph: SERIES_GLYPHS[traces.len() % SERIES_GLYPHS.len()],
            x: &s.x,
            y: &s.y,
        });
        if let Some(sec) = &s.secondary {
            traces.push(Trace {
                label: format!("{} {}", s.label, sec.label),
                glyph: SERIES_GLYPHS[traces.len() % SERIES_GLYPHS.len()],
                x: &s.x,
                y: &sec.y,
            });
        }
    }
    traces
}

fn x_bounds(traces: &[Trace<'_>]) -> Option<(SeriesX, SeriesX)> {
    let first = traces.iter().filter_map(|t| t.x.iter().min()).min()?;
    let last = traces.iter().filter_map(|t| t.x.iter().max()).max()?;
    Some((*first, *last))
}

/// Counts start at zero; the top is the largest value drawn.
fn y_range(traces: &[Trace<'_>]) -> (f64, f64) {
    let mut min_y = 0.0_f64;
    let mut max_y = f64::NEG_INFINITY;
    for t in traces {
        for &y in t.y.iter().take(t.x.len()) {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    spread(min_y, max_y)
}

/// Widen a degenerate range so mapping never divides by zero.
fn spread(min: f64, max: f64) -> (f64, f64) {
    if max.is_finite() && max > min {
        (min, max)
    } else {
        (min, min + 1.0)
    }
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_trace(grid: &mut [Vec<char>], trace: &Trace<'_>, x_range: (f64, f64), y_range: (f64, f64)) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (x, &y) in trace.x.iter().zip(trace.y) {
        let col = map_x(x.as_f64(), x_range.0, x_range.1, width);
        let row = map_y(y, y_range.0, y_range.1, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, trace.glyph),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = trace.glyph;
                }
            }
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Earlier traces keep their cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DerivedSecondary;

    fn days(label: &str, ys: &[f64]) -> DerivedSeries {
        let mut s = DerivedSeries::new(label);
        for (i, &y) in ys.iter().enumerate() {
            s.push(SeriesX::Day(i as u32 + 1), y);
        }
        s
    }

    #[test]
    fn line_chart_golden_snapshot_small() {
        let series = vec![days("Rising", &[0.0, 2000.0, 4000.0]), days("Flat", &[2000.0, 2000.0, 2000.0])];
        let txt = render_line_chart("Daily", &series, 10, 5);
        let expected = concat!(
            "Daily\n",
            "x=[1, 3] | y=[0, 4K]\n",
            "|        **\n",
            "|      **\n",
            "|++++**++++\n",
            "|  **\n",
            "|**\n",
            "+----------\n",
            "* Rising  + Flat\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn secondary_series_gets_its_own_glyph() {
        let mut s = days("Italy", &[1.0, 2.0]);
        s.secondary = Some(DerivedSecondary {
            label: "Recovered".into(),
            y: vec![0.0, 1.0],
        });
        let txt = render_line_chart("Total", &[s], 10, 5);
        assert!(txt.ends_with("* Italy  + Italy Recovered\n"));
        assert!(txt.contains('+'));
    }

    #[test]
    fn empty_views_say_so() {
        assert_eq!(render_line_chart("Week", &[DerivedSeries::new("X")], 20, 5), "Week\n(no data)\n");
        assert_eq!(render_bar_chart("Top", &[], 20), "Top\n(no data)\n");
    }

    #[test]
    fn bar_chart_golden_snapshot() {
        let bars = vec![
            RankedEntity { name: "Chile".into(), value: 500 },
            RankedEntity { name: "Brazil".into(), value: 1000 },
        ];
        let txt = render_bar_chart("Top confirmed", &bars, 20);
        let expected = concat!(
            "Top confirmed\n",
            "Brazil |###### 1,000\n",
            "Chile  |### 500\n",
        );
        assert_eq!(txt, expected);
    }
}
