//! Ratatui-based interactive plot view.
//!
//! Shown when the run is started with `SHOW_PLOT = 1`: a header with the
//! model equation and R², the scatter + fitted curve chart, and a footer.
//! `q`, `Esc` or `Enter` closes the view.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::error::AppError;
use crate::plot::FitPlot;

mod plotters_chart;

use plotters_chart::FitChart;

/// What the view displays.
pub struct FitView<'a> {
    pub title: String,
    pub plot: &'a FitPlot,
}

/// Open the interactive view and block until the user closes it.
pub fn show(view: &FitView<'_>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    event_loop(&mut terminal, view)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
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

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, view: &FitView<'_>) -> Result<(), AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(f, view))
                .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100))
            .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
        {
            continue;
        }

        match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
                    return Ok(());
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }
}

fn draw(frame: &mut Frame<'_>, view: &FitView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    draw_header(frame, chunks[0], view);
    draw_chart(frame, chunks[1], view.plot);
    draw_footer(frame, chunks[2]);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, view: &FitView<'_>) {
    let plot = view.plot;
    let lines = vec![
        Line::from(vec![
            Span::styled("curvefit", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", view.title)),
        ]),
        Line::from(Span::styled(
            format!(
                "{} | R² = {:.6} | n = {}",
                plot.equation,
                plot.r_squared,
                plot.points.len()
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_chart(frame: &mut Frame<'_>, area: Rect, plot: &FitPlot) {
    let block = Block::default().title("Fit").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    match chart_area(inner) {
        Some(chart) => {
            frame.render_widget(FitChart { plot }, chart);
            draw_tick_labels(frame, inner, chart, plot);
        }
        None => frame.render_widget(FitChart { plot }, inner),
    }
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect) {
    let line = Line::from(Span::styled(
        "q / Esc / Enter close",
        Style::default().fg(Color::Gray),
    ));
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

/// Columns reserved left of the chart for y labels.
const Y_LABEL_WIDTH: u16 = 9;
/// Rows reserved below the chart: tick labels, then the axis name.
const X_LABEL_ROWS: u16 = 2;
const TICKS: usize = 5;

fn fmt_axis(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e4 || v.abs() < 1e-2) {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}

/// Chart rect inside `inner` with room for tick labels, or `None` when the
/// panel is too small to spare it.
fn chart_area(inner: Rect) -> Option<Rect> {
    let min_w = Y_LABEL_WIDTH + 2 + 10;
    let min_h = 1 + X_LABEL_ROWS + 5;
    if inner.width <= min_w || inner.height <= min_h {
        return None;
    }
    Some(Rect {
        x: inner.x + Y_LABEL_WIDTH,
        y: inner.y + 1,
        width: inner.width - Y_LABEL_WIDTH - 2,
        height: inner.height - 1 - X_LABEL_ROWS,
    })
}

/// `TICKS` evenly spaced values over `[lo, hi]`, paired with their offset
/// in cells along an axis of `cells` length.
fn ticks(bounds: [f64; 2], cells: u16) -> impl Iterator<Item = (u16, f64)> {
    let span = cells.saturating_sub(1) as f64;
    (0..TICKS).map(move |i| {
        let u = i as f64 / (TICKS - 1) as f64;
        ((span * u).round() as u16, bounds[0] + u * (bounds[1] - bounds[0]))
    })
}

fn draw_tick_labels(frame: &mut Frame<'_>, inner: Rect, chart: Rect, plot: &FitPlot) {
    let style = Style::default().fg(Color::Gray);
    let right_edge = inner.x + inner.width;
    let label_row = chart.y + chart.height;

    for (offset, value) in ticks(plot.x_bounds, chart.width) {
        let label = fmt_axis(value);
        let len = label.len() as u16;
        let x = (chart.x + offset).saturating_sub(len / 2);
        if x >= right_edge {
            continue;
        }
        let rect = Rect::new(x, label_row, len.min(right_edge - x), 1);
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    for (offset, value) in ticks(plot.y_bounds, chart.height) {
        let label = fmt_axis(value);
        let len = (label.len() as u16).min(Y_LABEL_WIDTH - 1);
        let y = chart.y + chart.height - 1 - offset;
        let rect = Rect::new(chart.x - 1 - len, y, len, 1);
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    frame.render_widget(
        Paragraph::new("x").alignment(Alignment::Center).style(style),
        Rect::new(chart.x, label_row + 1, chart.width, 1),
    );
    frame.render_widget(
        Paragraph::new("y").style(style.add_modifier(Modifier::BOLD)),
        Rect::new(inner.x, inner.y, 1, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    use crate::domain::{CurveGrid, GoodnessOfFit, SampleSet};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn header_shows_equation_and_r_squared() {
        let samples = SampleSet::new(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0]).unwrap();
        let grid = CurveGrid {
            x: vec![0.0, 1.5, 3.0],
            y: vec![0.0, 3.0, 6.0],
        };
        let goodness = GoodnessOfFit { rss: 0.0, tss: 8.0, r_squared: 1.0 };
        let plot = FitPlot::new(&samples, &grid, "y = 2.00e+00*x +0.00e+00", &goodness);
        let view = FitView {
            title: "points.csv (linear)".to_string(),
            plot: &plot,
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &view)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("points.csv (linear)"), "{text}");
        assert!(text.contains("y = 2.00e+00*x +0.00e+00"), "{text}");
        assert!(text.contains("R² = 1.000000"), "{text}");
        assert!(text.contains("q / Esc / Enter close"), "{text}");
    }

    #[test]
    fn ticks_span_both_bounds() {
        let t: Vec<(u16, f64)> = ticks([0.0, 4.0], 41).collect();
        assert_eq!(t.len(), TICKS);
        assert_eq!(t[0], (0, 0.0));
        assert_eq!(t[2], (20, 2.0));
        assert_eq!(t[4], (40, 4.0));
    }

    #[test]
    fn tiny_panels_skip_the_label_gutter() {
        assert!(chart_area(Rect::new(0, 0, 15, 30)).is_none());
        let chart = chart_area(Rect::new(1, 1, 80, 20)).unwrap();
        assert_eq!(chart, Rect::new(1 + Y_LABEL_WIDTH, 2, 80 - Y_LABEL_WIDTH - 2, 20 - 1 - X_LABEL_ROWS));
    }

    #[test]
    fn axis_labels_switch_to_scientific_for_extremes() {
        assert_eq!(fmt_axis(0.0), "0.00");
        assert_eq!(fmt_axis(12.345), "12.35");
        assert_eq!(fmt_axis(25000.0), "2.5e4");
        assert_eq!(fmt_axis(0.001), "1.0e-3");
    }
}
