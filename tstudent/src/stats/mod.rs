mod descriptive;
mod interpretation;
mod ttest;

pub use descriptive::{
    kde_curve, mean, quantile, standard_deviation, sum, variance, BoxSummary, HistogramBins,
};
pub use interpretation::{Interpretation, SignificanceLevel, DEFAULT_ALPHA};
pub use ttest::{
    independent_t_test, one_sample_t_test, paired_samples, paired_t_test, Sample, TestResult,
};
