use serde::Serialize;

pub fn sum(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |acc, v| acc + v)
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(sum(samples) / samples.len() as f64)
}

/// The unbiased sample variance (denominator `n - 1`).
pub fn variance(samples: &[f64]) -> Option<f64> {
    let len = samples.len();
    if len <= 1 {
        return None;
    }
    let mean = mean(samples)?;
    let squared_errors = samples.iter().fold(0.0, |acc, v| {
        let error = (v - mean).powi(2);
        acc + error
    });
    Some(squared_errors / (len - 1) as f64)
}

pub fn standard_deviation(samples: &[f64]) -> Option<f64> {
    variance(samples).map(f64::sqrt)
}

/// Linearly interpolated quantile of an ascending, non-empty sample.
pub fn quantile(sorted: &[f64], level: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = level.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + weight * (sorted[upper] - sorted[lower])
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Box plot statistics: quartiles, whiskers at the most extreme
/// observations within 1.5 IQR of the box and the outliers beyond them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub quartile_fst: f64,
    pub median: f64,
    pub quartile_trd: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sorted = sorted(samples);
        let quartile_fst = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let quartile_trd = quantile(&sorted, 0.75);
        let iqr = quartile_trd - quartile_fst;
        let low_fence = quartile_fst - 1.5 * iqr;
        let high_fence = quartile_trd + 1.5 * iqr;

        // observations next to the median always lie within the fences
        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let whisker_low = inside.iter().copied().fold(f64::INFINITY, f64::min);
        let whisker_high = inside.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .filter(|v| **v < low_fence || **v > high_fence)
            .copied()
            .collect();

        Some(Self {
            quartile_fst,
            median,
            quartile_trd,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Equal width histogram bins, counted per bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBins {
    pub min: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl HistogramBins {
    /// Bins the samples using Sturges' rule for the number of bins.
    pub fn sturges(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n_bins = ((samples.len() as f64).log2().ceil() as usize + 1).max(1);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // a constant sample gets a single unit-wide bin around its value
        let (min, bin_width, n_bins) = if max > min {
            (min, (max - min) / n_bins as f64, n_bins)
        } else {
            (min - 0.5, 1.0, 1)
        };

        let mut counts = vec![0; n_bins];
        for v in samples.iter() {
            let idx = (((v - min) / bin_width).floor() as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        Some(Self {
            min,
            bin_width,
            counts,
        })
    }

    pub fn max(&self) -> f64 {
        self.min + self.bin_width * self.counts.len() as f64
    }

    /// Lower and upper edge of every bin.
    pub fn edges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.counts.len()).map(move |idx| {
            let lower = self.min + idx as f64 * self.bin_width;
            (lower, lower + self.bin_width)
        })
    }
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on
/// `n_points` equidistant points spanning the sample extended by 3 bandwidths.
/// Returns `None` for samples without spread.
pub fn kde_curve(samples: &[f64], n_points: usize) -> Option<Vec<(f64, f64)>> {
    let n = samples.len() as f64;
    let std = standard_deviation(samples)?;
    if std <= 0.0 || n_points < 2 {
        return None;
    }
    let bandwidth = std * n.powf(-0.2);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (n_points - 1) as f64;
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    let curve = (0..n_points)
        .map(|idx| {
            let x = min + idx as f64 * step;
            let density = samples
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                / norm;
            (x, density)
        })
        .collect();
    Some(curve)
}
