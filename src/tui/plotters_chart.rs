//! Terminal rendering of a [`FitPlot`] through `plotters-ratatui-backend`.
//!
//! Draws the same geometry as the saved JPEG: zero axes when in range, the
//! observed samples, and the fitted curve. Tick labels are drawn by the
//! caller as plain ratatui text around the chart rect.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::FitPlot;

const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 8;

/// Render-only chart over a prepared [`FitPlot`].
pub struct FitChart<'a> {
    pub plot: &'a FitPlot,
}

impl FitChart<'_> {
    fn bounds_are_drawable(&self) -> bool {
        let [x0, x1] = self.plot.x_bounds;
        let [y0, y1] = self.plot.y_bounds;
        [x0, x1, y0, y1].iter().all(|v| v.is_finite()) && x0 < x1 && y0 < y1
    }
}

impl Widget for FitChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if !self.bounds_are_drawable() {
            return;
        }

        let plot = self.plot;
        let [x0, x1] = plot.x_bounds;
        let [y0, y1] = plot.y_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).build_cartesian_2d(x0..x1, y0..y1)?;

            let axis_color = RGBColor(110, 110, 110);
            if y0 <= 0.0 && 0.0 <= y1 {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(x0, 0.0), (x1, 0.0)],
                    axis_color,
                )))?;
            }
            if x0 <= 0.0 && 0.0 <= x1 {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, y0), (0.0, y1)],
                    axis_color,
                )))?;
            }

            chart.draw_series(LineSeries::new(
                plot.curve.iter().copied().filter(|(_, y)| y.is_finite()),
                RGBColor(255, 64, 64),
            ))?;

            // Circle radii come out oversized on this backend; single cells read better.
            chart.draw_series(
                plot.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), RGBColor(0, 255, 255))),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
