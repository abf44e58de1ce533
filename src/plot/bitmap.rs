//! JPEG rendering of the diagnostic plot through Plotters' bitmap backend.
//!
//! Text (caption, tick labels) needs a font backend. Without the `plot-text`
//! feature the image carries only the geometry: observed points, fitted curve
//! and the x/y axes when they fall inside the plotted range.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::AppError;
use crate::plot::FitPlot;

const IMAGE_SIZE: (u32, u32) = (960, 720);

/// Render `plot` to `path`. The encoding follows the file extension.
pub fn render_fit_image(path: &Path, plot: &FitPlot) -> Result<(), AppError> {
    let [x0, x1] = plot.x_bounds;
    let [y0, y1] = plot.y_bounds;

    let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(24);
    #[cfg(feature = "plot-text")]
    builder
        .caption(plot.caption(), ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45);
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_error)?;

    #[cfg(feature = "plot-text")]
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(render_error)?;

    let axis_style = BLACK.mix(0.35).stroke_width(1);
    if y0 <= 0.0 && 0.0 <= y1 {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x0, 0.0), (x1, 0.0)],
                axis_style,
            )))
            .map_err(render_error)?;
    }
    if x0 <= 0.0 && 0.0 <= x1 {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, y0), (0.0, y1)],
                axis_style,
            )))
            .map_err(render_error)?;
    }

    chart
        .draw_series(
            plot.points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(
            plot.curve.iter().copied().filter(|(_, y)| y.is_finite()),
            RED.stroke_width(2),
        ))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    info!(path = %path.display(), "plot written");
    Ok(())
}

fn render_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Render(err.to_string())
}
