//! Raster rendering of the charts for document embedding.
//!
//! The images carry no text: titles and axis names are typeset by the
//! document around them, so rendering does not depend on system fonts.

use super::{BoxSeries, Chart, ChartKind, HistogramSeries};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use tstudent::{TStudentError, TStudentResult};

const SINGLE_SIZE: (u32, u32) = (960, 720);
const PAIR_SIZE: (u32, u32) = (1500, 600);
const MARGIN: u32 = 30;
const N_GRID_LINES: usize = 5;

const PALETTE: [RGBColor; 2] = [RGBColor(31, 119, 180), RGBColor(255, 127, 14)];
const GRID: RGBColor = RGBColor(225, 225, 225);

/// An RGB image, 3 bytes per pixel, row major.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

fn render_error<E: std::fmt::Display>(err: E) -> TStudentError {
    TStudentError::Render {
        issue: err.to_string(),
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Pads a value range by 5% on both sides, widening degenerate ranges.
fn padded(min: f64, max: f64) -> (f64, f64) {
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = 0.05 * (max - min);
    (min - pad, max + pad)
}

fn draw_frame<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> TStudentResult<ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>> {
    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(render_error)?;

    let step = (y_range.1 - y_range.0) / N_GRID_LINES as f64;
    chart
        .draw_series((0..=N_GRID_LINES).map(|idx| {
            let y = y_range.0 + idx as f64 * step;
            PathElement::new(vec![(x_range.0, y), (x_range.1, y)], GRID.stroke_width(1))
        }))
        .map_err(render_error)?;

    let corners = vec![
        (x_range.0, y_range.1),
        (x_range.0, y_range.0),
        (x_range.1, y_range.0),
    ];
    chart
        .draw_series(std::iter::once(PathElement::new(corners, BLACK.stroke_width(2))))
        .map_err(render_error)?;

    Ok(chart)
}

fn draw_box_plot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &[BoxSeries],
) -> TStudentResult<()> {
    let (min, max) = extent(series.iter().flat_map(|s| s.values.iter().copied()));
    let x_range = (-0.5, series.len() as f64 - 0.5);
    let mut chart = draw_frame(area, x_range, padded(min, max))?;

    for (idx, s) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let x = idx as f64;
        let summary = &s.summary;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - 0.3, summary.quartile_fst), (x + 0.3, summary.quartile_trd)],
                color.mix(0.8).filled(),
            )))
            .map_err(render_error)?;

        let lines = vec![
            vec![(x - 0.3, summary.median), (x + 0.3, summary.median)],
            vec![(x, summary.quartile_trd), (x, summary.whisker_high)],
            vec![(x, summary.quartile_fst), (x, summary.whisker_low)],
            vec![(x - 0.15, summary.whisker_high), (x + 0.15, summary.whisker_high)],
            vec![(x - 0.15, summary.whisker_low), (x + 0.15, summary.whisker_low)],
        ];
        chart
            .draw_series(
                lines
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
            )
            .map_err(render_error)?;

        chart
            .draw_series(
                summary
                    .outliers
                    .iter()
                    .map(|v| Circle::new((x, *v), 5, BLACK.stroke_width(1))),
            )
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &HistogramSeries,
    color: RGBColor,
) -> TStudentResult<()> {
    let x_range = series.x_range();
    let y_range = (0.0, series.max_count() * 1.1);
    let mut chart = draw_frame(area, x_range, y_range)?;

    chart
        .draw_series(
            series
                .bins
                .edges()
                .zip(series.bins.counts.iter())
                .map(|((lower, upper), count)| {
                    Rectangle::new([(lower, 0.0), (upper, *count as f64)], color.mix(0.6).filled())
                }),
        )
        .map_err(render_error)?;
    chart
        .draw_series(
            series
                .bins
                .edges()
                .zip(series.bins.counts.iter())
                .map(|((lower, upper), count)| {
                    Rectangle::new([(lower, 0.0), (upper, *count as f64)], WHITE.stroke_width(1))
                }),
        )
        .map_err(render_error)?;

    if let Some(density) = &series.density {
        chart
            .draw_series(std::iter::once(PathElement::new(
                density.clone(),
                color.stroke_width(3),
            )))
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
) -> TStudentResult<()> {
    let (x_min, x_max) = extent(points.iter().map(|p| p.0));
    let (y_min, y_max) = extent(points.iter().map(|p| p.1));
    let mut chart = draw_frame(area, padded(x_min, x_max), padded(y_min, y_max))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new(*p, 6, PALETTE[0].mix(0.8).filled())),
        )
        .map_err(render_error)?;
    Ok(())
}

fn size_of(chart: &Chart) -> (u32, u32) {
    match chart.kind {
        ChartKind::HistogramPair(..) => PAIR_SIZE,
        _ => SINGLE_SIZE,
    }
}

/// Rasterizes a chart into an in-memory RGB image.
pub fn render(chart: &Chart) -> TStudentResult<RasterImage> {
    let (width, height) = size_of(chart);
    let mut rgb = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        match &chart.kind {
            ChartKind::BoxPlot(series) => draw_box_plot(&root, series)?,
            ChartKind::Histogram(series) => draw_histogram(&root, series, PALETTE[0])?,
            ChartKind::HistogramPair(left, right) => {
                let (left_area, right_area) = root.split_horizontally(width / 2);
                draw_histogram(&left_area, left, PALETTE[0])?;
                draw_histogram(&right_area, right, PALETTE[1])?;
            }
            ChartKind::Scatter { points, .. } => draw_scatter(&root, points)?,
        }
        root.present().map_err(render_error)?;
    }

    Ok(RasterImage { width, height, rgb })
}
