//! ratatui drawing of a [`RenderPass`].

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
    Frame,
};

use super::surface::{RenderPass, SeriesView};
use crate::config::MAX_GRID_DIMENSION;

pub const WINDOW_TITLE: &str = "livechart";
pub const X_AXIS_TITLE: &str = "time (seconds)";

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::LightBlue,
    Color::LightRed,
];

/// Whether input is still streaming in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Streaming,
    Finished,
}

/// Draw the chart (or subplot grid) and the status line.
pub fn draw(frame: &mut Frame, pass: &RenderPass<'_>, phase: Phase) {
    let [chart_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    match pass.grid {
        Some(grid) => {
            let rows = Layout::vertical(even_split(grid.vertical)).split(chart_area);
            let cells: Vec<Vec<Rect>> = rows
                .iter()
                .map(|row| {
                    Layout::horizontal(even_split(grid.horizontal))
                        .split(*row)
                    .to_vec()
                })
                .collect();

            for (index, series) in pass.series.iter().enumerate() {
                let Some(cell) = series.cell else { continue };
                let Some(area) = cells.get(cell.row).and_then(|row| row.get(cell.col)) else {
                    continue;
                };
                let title = series.title().unwrap_or(series.name).to_string();
                draw_chart(
                    frame,
                    *area,
                    pass.times,
                    &[(index, series)],
                    title,
                    false,
                );
            }
        }
        None => {
            let series: Vec<(usize, &SeriesView<'_>)> = pass.series.iter().enumerate().collect();
            draw_chart(
                frame,
                chart_area,
                pass.times,
                &series,
                WINDOW_TITLE.to_string(),
                pass.needs_legend(),
            );
        }
    }

    frame.render_widget(status_line(pass, phase), status_area);
}

fn even_split(parts: usize) -> Vec<Constraint> {
    let parts = parts.clamp(1, MAX_GRID_DIMENSION);
    vec![Constraint::Ratio(1, parts as u32); parts]
}

fn draw_chart(
    frame: &mut Frame,
    area: Rect,
    times: &[f64],
    series: &[(usize, &SeriesView<'_>)],
    title: String,
    legend: bool,
) {
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|(_, view)| {
            times
                .iter()
                .copied()
                .zip(view.values.iter().copied())
                .collect()
        })
        .collect();

    let datasets = series
        .iter()
        .zip(&points)
        .map(|((index, view), data)| {
            Dataset::default()
                .name(view.name.to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PALETTE[index % PALETTE.len()]))
                .data(data)
        })
        .collect();

    let x_bounds = x_bounds(times);
    let y_bounds = y_bounds(series.iter().flat_map(|(_, view)| view.values.iter().copied()));

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} ")),
        )
        .x_axis(
            Axis::default()
                .title(X_AXIS_TITLE.dark_gray())
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        )
        .legend_position(legend.then_some(LegendPosition::BottomRight));

    frame.render_widget(chart, area);
}

fn status_line(pass: &RenderPass<'_>, phase: Phase) -> Line<'static> {
    let samples = pass.times.len();
    let mut spans = vec![Span::raw(format!(
        " {samples} sample{}",
        if samples == 1 { "" } else { "s" }
    ))];

    if pass.skipped_lines > 0 {
        spans.push(Span::raw(" · "));
        spans.push(Span::raw(format!("{} skipped", pass.skipped_lines)).yellow());
    }
    if let Some(last) = pass.times.last() {
        spans.push(Span::raw(format!(" · t={}s", format_tick(*last))));
    }
    spans.push(Span::raw(" · "));
    spans.push(match phase {
        Phase::Streaming => "reading stdin".dark_gray(),
        Phase::Finished => "input closed, press q to quit".dark_gray(),
    });

    Line::from(spans)
}

/// Span of the time axis, widened to one second while it is a single point.
pub fn x_bounds(times: &[f64]) -> [f64; 2] {
    let first = times.first().copied().unwrap_or(0.0);
    let last = times.last().copied().unwrap_or(first);
    if last > first {
        [first, last]
    } else {
        [first, first + 1.0]
    }
}

/// Min and max of the finite `values`, padded when they coincide.
pub fn y_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        });

    if min > max {
        return [0.0, 1.0];
    }
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return [min - pad, max + pad];
    }
    [min, max]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let [low, high] = bounds;
    [low, (low + high) / 2.0, high]
        .into_iter()
        .map(|value| Span::raw(format_tick(value)))
        .collect()
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e5).contains(&magnitude) {
        format!("{value:.1e}")
    } else {
        format!("{value:.2}")
    }
}
