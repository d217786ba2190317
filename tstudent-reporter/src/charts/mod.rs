mod interactive;
mod raster;

pub use interactive::{BoxPlotComponent, HistogramComponent, InteractiveChart, ScatterComponent};
pub use raster::{render, RasterImage};

use tstudent::stats::{kde_curve, BoxSummary, HistogramBins, Sample};
use tstudent::{Analysis, TStudentError, TStudentResult, TestKind};

const KDE_POINTS: usize = 200;

#[derive(Debug, Clone)]
pub struct BoxSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone)]
pub struct HistogramSeries {
    pub name: String,
    pub title: String,
    pub values: Vec<f64>,
    pub bins: HistogramBins,
    /// Density curve scaled to the bin counts.
    pub density: Option<Vec<(f64, f64)>>,
}

impl HistogramSeries {
    fn from_sample(sample: &Sample) -> Option<Self> {
        let bins = HistogramBins::sturges(&sample.values)?;
        let scale = sample.len() as f64 * bins.bin_width;
        let density = kde_curve(&sample.values, KDE_POINTS)
            .map(|curve| curve.into_iter().map(|(x, d)| (x, d * scale)).collect());
        Some(Self {
            name: sample.name.clone(),
            title: format!("Histograma de {}", sample.name),
            values: sample.values.clone(),
            bins,
            density,
        })
    }

    pub fn max_count(&self) -> f64 {
        let bars = self.bins.counts.iter().copied().max().unwrap_or_default() as f64;
        let curve = self
            .density
            .iter()
            .flatten()
            .map(|(_, y)| *y)
            .fold(0.0, f64::max);
        bars.max(curve)
    }

    /// The x range covering the bins and the density curve.
    pub fn x_range(&self) -> (f64, f64) {
        let (mut min, mut max) = (self.bins.min, self.bins.max());
        for (x, _) in self.density.iter().flatten() {
            min = min.min(*x);
            max = max.max(*x);
        }
        (min, max)
    }
}

#[derive(Debug, Clone)]
pub enum ChartKind {
    BoxPlot(Vec<BoxSeries>),
    Histogram(HistogramSeries),
    /// Two histograms drawn side by side.
    HistogramPair(HistogramSeries, HistogramSeries),
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<(f64, f64)>,
    },
}

#[derive(Debug, Clone)]
pub struct Chart {
    /// File stem used when the chart is written to disk.
    pub id: &'static str,
    pub title: String,
    pub kind: ChartKind,
}

impl Chart {
    fn box_plot(samples: &[Sample]) -> Option<Self> {
        let series = samples
            .iter()
            .map(|sample| {
                Some(BoxSeries {
                    name: sample.name.clone(),
                    values: sample.values.clone(),
                    summary: BoxSummary::from_samples(&sample.values)?,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        let names: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
        Some(Self {
            id: "box_plot",
            title: format!("Comparación de {}", names.join(" y ")),
            kind: ChartKind::BoxPlot(series),
        })
    }

    fn histogram(sample: &Sample) -> Option<Self> {
        let series = HistogramSeries::from_sample(sample)?;
        Some(Self {
            id: "histogram",
            title: series.title.clone(),
            kind: ChartKind::Histogram(series),
        })
    }

    fn histogram_pair(x: &Sample, y: &Sample) -> Option<Self> {
        let left = HistogramSeries::from_sample(x)?;
        let right = HistogramSeries::from_sample(y)?;
        Some(Self {
            id: "histograms",
            title: "Histogramas".to_string(),
            kind: ChartKind::HistogramPair(left, right),
        })
    }

    fn scatter(x: &Sample, y: &Sample, points: &[(f64, f64)]) -> Self {
        Self {
            id: "scatter",
            title: format!("Dispersión entre {} y {}", x.name, y.name),
            kind: ChartKind::Scatter {
                x_label: x.name.clone(),
                y_label: y.name.clone(),
                points: points.to_vec(),
            },
        }
    }
}

/// The charts generated for one analysis, tagged with the test kind they belong to.
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub kind: TestKind,
    pub charts: Vec<Chart>,
}

fn missing_sample(kind: TestKind) -> TStudentError {
    TStudentError::Render {
        issue: format!("the '{}' analysis carries no samples to plot", kind),
    }
}

impl ChartSet {
    /// Builds the charts of the analysis' test kind from scratch.
    pub fn for_analysis(analysis: &Analysis) -> TStudentResult<Self> {
        let kind = analysis.kind();
        let samples = &analysis.samples;
        let charts = match (kind, samples.as_slice()) {
            (TestKind::TwoSampleIndependent, [x, y]) => vec![
                Chart::box_plot(samples),
                Chart::histogram_pair(x, y),
                Some(Chart::scatter(x, y, &analysis.pairs)),
            ],
            (TestKind::OneSample, [x]) => vec![Chart::histogram(x)],
            (TestKind::Paired, [x, y]) => {
                vec![Chart::box_plot(samples), Chart::histogram_pair(x, y)]
            }
            _ => return Err(missing_sample(kind)),
        };

        let charts = charts
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| missing_sample(kind))?;

        Ok(Self { kind, charts })
    }

    /// Fails when the charts were generated for another test kind than the analysis.
    pub fn ensure_matches(&self, analysis: &Analysis) -> TStudentResult<()> {
        if self.kind != analysis.kind() {
            return Err(TStudentError::StaleCharts {
                expected: analysis.kind().to_string(),
                found: self.kind.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn interactive(&self) -> Vec<(&Chart, InteractiveChart)> {
        self.charts
            .iter()
            .map(|chart| (chart, InteractiveChart::from(chart)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tstudent::data::{Cell, Table};
    use tstudent::stats::SignificanceLevel;
    use tstudent::TestRequest;

    fn table() -> Table {
        let a = [2., 4., 4., 4., 5., 5., 7., 9.];
        let b = [1., 2., 3., 4., 5., 6., 7., 8.];
        let rows = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| vec![Cell::Number(*x), Cell::Number(*y)])
            .collect();
        Table::from_rows(vec!["a".into(), "b".into()], rows).unwrap()
    }

    fn analysis(kind: TestKind) -> Analysis {
        let table = table();
        let request = TestRequest::build(&table, kind, "a", Some("b"), true, 4.0).unwrap();
        Analysis::run(&table, request, SignificanceLevel::default()).unwrap()
    }

    #[test]
    fn test_charts_per_kind() {
        let two_sample = ChartSet::for_analysis(&analysis(TestKind::TwoSampleIndependent)).unwrap();
        let ids: Vec<&str> = two_sample.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["box_plot", "histograms", "scatter"]);
        assert_eq!(two_sample.charts[2].title, "Dispersión entre a y b");

        let one_sample = ChartSet::for_analysis(&analysis(TestKind::OneSample)).unwrap();
        assert_eq!(one_sample.len(), 1);
        assert_eq!(one_sample.charts[0].title, "Histograma de a");

        let paired = ChartSet::for_analysis(&analysis(TestKind::Paired)).unwrap();
        let ids: Vec<&str> = paired.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["box_plot", "histograms"]);
    }

    #[test]
    fn test_stale_charts_rejected() {
        let paired_charts = ChartSet::for_analysis(&analysis(TestKind::Paired)).unwrap();
        let one_sample = analysis(TestKind::OneSample);
        assert!(matches!(
            paired_charts.ensure_matches(&one_sample),
            Err(TStudentError::StaleCharts { .. })
        ));
        assert!(paired_charts
            .ensure_matches(&analysis(TestKind::Paired))
            .is_ok());
    }

    #[test]
    fn test_density_scaled_to_counts() {
        let set = ChartSet::for_analysis(&analysis(TestKind::OneSample)).unwrap();
        if let ChartKind::Histogram(series) = &set.charts[0].kind {
            let density = series.density.as_ref().unwrap();
            let step = density[1].0 - density[0].0;
            let area: f64 = density.iter().map(|(_, y)| y * step).sum();
            // area under a count-scaled density is n * bin_width
            let expected = series.values.len() as f64 * series.bins.bin_width;
            assert!((area - expected).abs() / expected < 0.01);
            assert!(series.max_count() >= 3.0);
        } else {
            panic!("expected a histogram");
        }
    }
}
