use super::descriptive::{mean, variance};
use crate::{TStudentError, TStudentResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// The observations of one variable with its missing cells removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Drops the missing cells of a column.
    pub fn from_column(name: impl Into<String>, column: &[Option<f64>]) -> Self {
        Self::new(name, column.iter().flatten().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean and unbiased variance, failing for degenerate samples.
    fn moments(&self) -> TStudentResult<(f64, f64)> {
        let n = self.len();
        let (mean, variance) = match (mean(&self.values), variance(&self.values)) {
            (Some(mean), Some(variance)) => (mean, variance),
            _ => {
                return Err(TStudentError::InsufficientObservations {
                    variable: self.name.clone(),
                    n,
                })
            }
        };
        // relative to the magnitude of the data
        if !variance.is_finite() || variance <= f64::EPSILON * mean * mean {
            return Err(TStudentError::ZeroVariance {
                variable: self.name.clone(),
            });
        }
        Ok((mean, variance))
    }
}

/// Builds the paired samples from two columns, keeping only rows where both values are present.
pub fn paired_samples(
    name1: &str,
    column1: &[Option<f64>],
    name2: &str,
    column2: &[Option<f64>],
) -> TStudentResult<(Sample, Sample)> {
    if column1.len() != column2.len() {
        return Err(TStudentError::LengthMismatch {
            left: column1.len(),
            right: column2.len(),
        });
    }
    let (values1, values2) = column1
        .iter()
        .zip(column2.iter())
        .filter_map(|pair| match pair {
            (Some(v1), Some(v2)) => Some((*v1, *v2)),
            _ => None,
        })
        .unzip();
    Ok((Sample::new(name1, values1), Sample::new(name2, values2)))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

/// Two-sided p-value of `t_stat` under a Student t distribution with `df` degrees of freedom.
fn two_sided_p_value(t_stat: f64, df: f64) -> TStudentResult<f64> {
    let t_dist = StudentsT::new(0.0, 1.0, df).map_err(|err| TStudentError::InvalidConfig {
        issue: format!("invalid degrees of freedom {}: {}", df, err),
    })?;
    let cdf_val = t_dist.cdf(t_stat.abs());
    Ok((2.0 * (1.0 - cdf_val)).clamp(0.0, 1.0))
}

/// Independent two-sample t-test: Student's pooled variance when `equal_variance`,
/// Welch's otherwise. The reported degrees of freedom are `n1 + n2 - 2` either way;
/// the Welch p-value uses the Welch-Satterthwaite degrees of freedom.
pub fn independent_t_test(x: &Sample, y: &Sample, equal_variance: bool) -> TStudentResult<TestResult> {
    let (mean1, var1) = x.moments()?;
    let (mean2, var2) = y.moments()?;
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let mean_diff = mean1 - mean2;

    let (t_statistic, df) = if equal_variance {
        let pooled_var = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / (n1 + n2 - 2.0);
        let std_err = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
        (mean_diff / std_err, n1 + n2 - 2.0)
    } else {
        let term1 = var1 / n1;
        let term2 = var2 / n2;
        let combined_var = term1 + term2;
        let df = combined_var * combined_var
            / (term1 * term1 / (n1 - 1.0) + term2 * term2 / (n2 - 1.0));
        (mean_diff / combined_var.sqrt(), df)
    };

    Ok(TestResult {
        t_statistic,
        p_value: two_sided_p_value(t_statistic, df)?,
        degrees_of_freedom: x.len() + y.len() - 2,
    })
}

/// One-sample t-test of the sample mean against `test_value`.
pub fn one_sample_t_test(x: &Sample, test_value: f64) -> TStudentResult<TestResult> {
    let (mean, var) = x.moments()?;
    let n = x.len() as f64;
    let t_statistic = (mean - test_value) / (var / n).sqrt();
    let df = x.len() - 1;

    Ok(TestResult {
        t_statistic,
        p_value: two_sided_p_value(t_statistic, df as f64)?,
        degrees_of_freedom: df,
    })
}

/// Paired t-test: a one-sample test of the differences `x - y` against zero.
pub fn paired_t_test(x: &Sample, y: &Sample) -> TStudentResult<TestResult> {
    if x.len() != y.len() {
        return Err(TStudentError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let differences: Vec<f64> = x
        .values
        .iter()
        .zip(y.values.iter())
        .map(|(v1, v2)| v1 - v2)
        .collect();
    let name = format!("{} - {}", x.name, y.name);
    one_sample_t_test(&Sample::new(name, differences), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(name: &str, values: &[f64]) -> Sample {
        Sample::new(name, values.to_vec())
    }

    #[test]
    fn test_student_two_sample() {
        let x = sample("x", &[2., 4., 4., 4., 5., 5., 7., 9.]);
        let y = sample("y", &[1., 2., 3., 4., 5., 6., 7., 8.]);
        let result = independent_t_test(&x, &y, true).unwrap();

        assert_eq!(result.degrees_of_freedom, 14);
        assert_abs_diff_eq!(result.t_statistic, 0.43496, epsilon = 1e-4);
        assert!(result.p_value > 0.6 && result.p_value < 0.75);
    }

    #[test]
    fn test_welch_reports_simplified_df() {
        let x = sample("x", &[2., 4., 4., 4., 5., 5., 7., 9.]);
        let y = sample("y", &[1., 2., 3., 4., 5., 6., 7., 8., 12., 15.]);
        let welch = independent_t_test(&x, &y, false).unwrap();
        let student = independent_t_test(&x, &y, true).unwrap();

        assert_eq!(welch.degrees_of_freedom, 16);
        assert_eq!(student.degrees_of_freedom, 16);
        // reference values with the Welch-Satterthwaite df of ~13.54
        assert_abs_diff_eq!(welch.t_statistic, -0.817_610_833, epsilon = 1e-8);
        assert_abs_diff_eq!(welch.p_value, 0.427_733_542, epsilon = 1e-6);
        assert!((welch.t_statistic - student.t_statistic).abs() > 1e-6);
    }

    #[test]
    fn test_equal_size_welch_matches_student_statistic() {
        let x = sample("x", &[2., 4., 4., 4., 5., 5., 7., 9.]);
        let y = sample("y", &[1., 2., 3., 4., 5., 6., 7., 8.]);
        let welch = independent_t_test(&x, &y, false).unwrap();
        let student = independent_t_test(&x, &y, true).unwrap();

        assert_abs_diff_eq!(welch.t_statistic, student.t_statistic, epsilon = 1e-12);
        // Welch-Satterthwaite df (~13.75) is below 14, so the p-value is slightly larger
        assert!(welch.p_value > student.p_value);
    }

    #[test]
    fn test_one_sample() {
        let x = sample("x", &[5., 6., 7., 5., 6., 7.]);
        let result = one_sample_t_test(&x, 6.0).unwrap();
        assert_eq!(result.degrees_of_freedom, 5);
        assert_abs_diff_eq!(result.t_statistic, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 1.0, epsilon = 1e-9);

        let result = one_sample_t_test(&x, 0.0).unwrap();
        assert!(result.t_statistic > 0.0);
        assert!(result.p_value < 1e-3);
    }

    #[test]
    fn test_paired() {
        let x = sample("antes", &[10., 12., 9., 11., 13., 8., 10., 12., 11., 9.]);
        let y = sample("despues", &[11., 14., 9., 13., 14., 9., 12., 13., 13., 10.]);
        let result = paired_t_test(&x, &y).unwrap();

        assert_eq!(result.degrees_of_freedom, 9);
        assert_abs_diff_eq!(result.t_statistic, -6.0908, epsilon = 1e-3);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_degenerate_samples_are_errors() {
        let single = sample("single", &[1.0]);
        let constant = sample("constant", &[3.0, 3.0, 3.0]);
        let regular = sample("regular", &[1.0, 2.0, 3.0]);

        assert!(matches!(
            one_sample_t_test(&single, 0.0),
            Err(TStudentError::InsufficientObservations { n: 1, .. })
        ));
        assert!(matches!(
            one_sample_t_test(&sample("empty", &[]), 0.0),
            Err(TStudentError::InsufficientObservations { n: 0, .. })
        ));
        assert!(matches!(
            one_sample_t_test(&constant, 3.0),
            Err(TStudentError::ZeroVariance { .. })
        ));
        assert!(matches!(
            independent_t_test(&regular, &constant, true),
            Err(TStudentError::ZeroVariance { .. })
        ));
        // constant shift: the differences have no variance
        let shifted = sample("shifted", &[2.0, 3.0, 4.0]);
        assert!(matches!(
            paired_t_test(&regular, &shifted),
            Err(TStudentError::ZeroVariance { .. })
        ));
        assert!(matches!(
            paired_t_test(&regular, &single),
            Err(TStudentError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_small_scale_samples_have_variance() {
        let micro = sample("micro", &[1e-13, 2e-13, 3e-13, 4e-13]);
        let result = one_sample_t_test(&micro, 0.0).unwrap();
        assert_eq!(result.degrees_of_freedom, 3);
        assert!(result.t_statistic > 0.0);

        let constant = sample("constant", &[0.1, 0.1, 0.1, 0.1]);
        assert!(matches!(
            one_sample_t_test(&constant, 0.0),
            Err(TStudentError::ZeroVariance { .. })
        ));
    }

    #[test]
    fn test_paired_samples_drop_incomplete_rows() {
        let (x, y) = paired_samples(
            "a",
            &[Some(1.0), None, Some(3.0), Some(4.0)],
            "b",
            &[Some(2.0), Some(5.0), None, Some(6.0)],
        )
        .unwrap();
        assert_eq!(x.values, vec![1.0, 4.0]);
        assert_eq!(y.values, vec![2.0, 6.0]);

        let column = [Some(1.0), None, Some(2.0)];
        assert_eq!(Sample::from_column("c", &column).values, vec![1.0, 2.0]);
    }
}
