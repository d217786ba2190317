use super::{BoxSeries, Chart, ChartKind, HistogramSeries};
use crate::ComponentWriter;
use plotly::box_plot::{BoxMean, BoxPoints};
use plotly::common::{Line, Marker, Mode, Title};
use plotly::histogram::Bins;
use plotly::layout::{Axis, BarMode, GridPattern, LayoutGrid};
use plotly::{BoxPlot, Histogram, Layout, Plot, Rgb, Scatter};
use std::ops::Deref;
use std::path::Path;
use tstudent::TStudentResult;

/// NOTE: due to the orphan rule, we need the `PlotComponent` bound
/// for implementing ComponentWriter generically rather than for `Plot` directly
pub trait PlotComponent: Deref<Target = Plot> {}
impl<T> PlotComponent for T where T: Deref<Target = Plot> {}

impl<T> ComponentWriter for T
where
    T: PlotComponent,
{
    fn write(&self, file: &Path) -> TStudentResult<()> {
        self.deref().to_html(file);
        Ok(())
    }
}

/// https://igiagkiozis.github.io/plotly/content/recipes/statistical_charts/box_plots.html
const PALETTE: [(u8, u8, u8); 2] = [(31, 119, 180), (255, 127, 14)];

fn series_color(idx: usize) -> Rgb {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Rgb::new(r, g, b)
}

pub struct BoxPlotComponent {
    plot: Plot,
}

impl Deref for BoxPlotComponent {
    type Target = Plot;
    fn deref(&self) -> &Self::Target {
        &self.plot
    }
}

impl BoxPlotComponent {
    pub fn new(title: &str) -> Self {
        let mut box_plot = BoxPlotComponent { plot: Plot::new() };
        box_plot.set_layout(title);
        box_plot
    }

    fn set_layout(&mut self, title: &str) {
        let layout = Layout::new().title(Title::new(title)).y_axis(
            Axis::new()
                .show_grid(true)
                .zero_line(true)
                .grid_width(1)
                .zero_line_width(2),
        );
        self.plot.set_layout(layout);
    }

    pub fn add_series(&mut self, idx: usize, series: &BoxSeries) {
        let trace = BoxPlot::new(series.values.clone())
            .name(series.name.as_str())
            .marker(Marker::new().color(series_color(idx)).size(6))
            .box_mean(BoxMean::True)
            .box_points(BoxPoints::Outliers)
            .line(Line::new().width(2.0));
        self.plot.add_trace(trace);
    }
}

pub struct HistogramComponent {
    plot: Plot,
}

impl Deref for HistogramComponent {
    type Target = Plot;
    fn deref(&self) -> &Self::Target {
        &self.plot
    }
}

impl HistogramComponent {
    pub fn new(title: &str, x_title: &str) -> Self {
        let mut histogram = HistogramComponent { plot: Plot::new() };
        histogram.set_layout(title, x_title);
        histogram
    }

    fn set_layout(&mut self, title: &str, x_title: &str) {
        let layout = Layout::new()
            .bar_mode(BarMode::Overlay)
            .title(Title::new(title))
            .x_axis(Axis::new().title(Title::new(x_title)).zero_line(true))
            .y_axis(Axis::new().title(Title::new("Count")).zero_line(true));
        self.plot.set_layout(layout);
    }

    /// Two histograms in a 1x2 grid, the right one on the `x2`/`y2` axes.
    pub fn side_by_side(title: &str, left: &HistogramSeries, right: &HistogramSeries) -> Self {
        let mut histogram = HistogramComponent { plot: Plot::new() };
        let layout = Layout::new()
            .title(Title::new(title))
            .grid(
                LayoutGrid::new()
                    .rows(1)
                    .columns(2)
                    .pattern(GridPattern::Independent),
            )
            .x_axis(Axis::new().title(Title::new(&left.name)).zero_line(true))
            .y_axis(Axis::new().title(Title::new("Count")).zero_line(true))
            .x_axis2(Axis::new().title(Title::new(&right.name)).zero_line(true))
            .y_axis2(Axis::new().title(Title::new("Count")).zero_line(true));
        histogram.plot.set_layout(layout);
        histogram.add_traces(0, left, None);
        histogram.add_traces(1, right, Some(("x2", "y2")));
        histogram
    }

    pub fn add_series(&mut self, idx: usize, series: &HistogramSeries) {
        self.add_traces(idx, series, None);
    }

    fn add_traces(&mut self, idx: usize, series: &HistogramSeries, axes: Option<(&str, &str)>) {
        let bins = Bins::new(series.bins.min, series.bins.max(), series.bins.bin_width);
        let mut histogram = Histogram::new(series.values.clone())
            .name(series.name.as_str())
            .opacity(0.6)
            .marker(Marker::new().color(series_color(idx)))
            .x_bins(bins);
        if let Some((x_axis, y_axis)) = axes {
            histogram = histogram.x_axis(x_axis).y_axis(y_axis);
        }
        self.plot.add_trace(histogram);

        if let Some(density) = &series.density {
            let (xs, ys): (Vec<f64>, Vec<f64>) = density.iter().copied().unzip();
            let mut curve = Scatter::new(xs, ys)
                .name(format!("densidad {}", series.name).as_str())
                .mode(Mode::Lines)
                .line(Line::new().width(2.0))
                .marker(Marker::new().color(series_color(idx)));
            if let Some((x_axis, y_axis)) = axes {
                curve = curve.x_axis(x_axis).y_axis(y_axis);
            }
            self.plot.add_trace(curve);
        }
    }
}

pub struct ScatterComponent {
    plot: Plot,
}

impl Deref for ScatterComponent {
    type Target = Plot;
    fn deref(&self) -> &Self::Target {
        &self.plot
    }
}

impl ScatterComponent {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        let mut scatter = ScatterComponent { plot: Plot::new() };
        let layout = Layout::new()
            .title(Title::new(title))
            .x_axis(Axis::new().title(Title::new(x_label)).zero_line(true))
            .y_axis(Axis::new().title(Title::new(y_label)).zero_line(true));
        scatter.plot.set_layout(layout);
        scatter
    }

    pub fn add_points(&mut self, points: &[(f64, f64)]) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
        let trace = Scatter::new(xs, ys)
            .mode(Mode::Markers)
            .name("")
            .marker(Marker::new().color(series_color(0)).size(8));
        self.plot.add_trace(trace);
    }
}

/// The on-screen rendering of a chart.
pub enum InteractiveChart {
    Box(BoxPlotComponent),
    Histogram(HistogramComponent),
    Scatter(ScatterComponent),
}

impl Deref for InteractiveChart {
    type Target = Plot;
    fn deref(&self) -> &Self::Target {
        match self {
            InteractiveChart::Box(c) => &c.plot,
            InteractiveChart::Histogram(c) => &c.plot,
            InteractiveChart::Scatter(c) => &c.plot,
        }
    }
}

impl From<&Chart> for InteractiveChart {
    fn from(chart: &Chart) -> Self {
        match &chart.kind {
            ChartKind::BoxPlot(series) => {
                let mut component = BoxPlotComponent::new(&chart.title);
                for (idx, s) in series.iter().enumerate() {
                    component.add_series(idx, s);
                }
                InteractiveChart::Box(component)
            }
            ChartKind::Histogram(series) => {
                let mut component = HistogramComponent::new(&chart.title, &series.name);
                component.add_series(0, series);
                InteractiveChart::Histogram(component)
            }
            ChartKind::HistogramPair(left, right) => InteractiveChart::Histogram(
                HistogramComponent::side_by_side(&chart.title, left, right),
            ),
            ChartKind::Scatter {
                x_label,
                y_label,
                points,
            } => {
                let mut component = ScatterComponent::new(&chart.title, x_label, y_label);
                component.add_points(points);
                InteractiveChart::Scatter(component)
            }
        }
    }
}
