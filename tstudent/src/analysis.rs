use crate::data::Table;
use crate::selection::{TestKind, TestRequest};
use crate::stats::{
    independent_t_test, one_sample_t_test, paired_samples, paired_t_test, standard_deviation,
    Interpretation, Sample, SignificanceLevel, TestResult,
};
use crate::TStudentResult;
use log::info;
use serde::Serialize;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub name: String,
    pub n: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

impl From<&Sample> for SampleSummary {
    fn from(sample: &Sample) -> Self {
        Self {
            name: sample.name.clone(),
            n: sample.len(),
            mean: crate::stats::mean(&sample.values),
            std: standard_deviation(&sample.values),
        }
    }
}

/// The outcome of one user-triggered analysis: exactly one result per request.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub request: TestRequest,
    pub result: TestResult,
    pub interpretation: Interpretation,
    pub summaries: Vec<SampleSummary>,

    /// The samples that entered the test, in selection order.
    #[serde(skip_serializing)]
    pub samples: Vec<Sample>,
    /// Rows where both selected variables are present.
    #[serde(skip_serializing)]
    pub pairs: Vec<(f64, f64)>,
}

fn row_pairs(x: &Sample, y: &Sample) -> Vec<(f64, f64)> {
    x.values
        .iter()
        .copied()
        .zip(y.values.iter().copied())
        .collect()
}

impl Analysis {
    pub fn run(
        table: &Table,
        request: TestRequest,
        alpha: SignificanceLevel,
    ) -> TStudentResult<Self> {
        info!(
            "Running '{}' on {:?}",
            request.kind,
            request.variables()
        );

        let column1 = table.numeric_values(&request.variable1)?;
        let (result, samples, pairs) = match (&request.kind, &request.variable2) {
            (TestKind::OneSample, _) => {
                let sample = Sample::from_column(request.variable1.as_str(), &column1);
                let result = one_sample_t_test(&sample, request.test_value)?;
                (result, vec![sample], Vec::new())
            }
            (TestKind::TwoSampleIndependent, Some(variable2)) => {
                let column2 = table.numeric_values(variable2)?;
                let x = Sample::from_column(request.variable1.as_str(), &column1);
                let y = Sample::from_column(variable2.as_str(), &column2);
                let result = independent_t_test(&x, &y, request.equal_variance)?;
                let (px, py) =
                    paired_samples(&request.variable1, &column1, variable2, &column2)?;
                (result, vec![x, y], row_pairs(&px, &py))
            }
            (TestKind::Paired, Some(variable2)) => {
                let column2 = table.numeric_values(variable2)?;
                let (x, y) = paired_samples(&request.variable1, &column1, variable2, &column2)?;
                let result = paired_t_test(&x, &y)?;
                let pairs = row_pairs(&x, &y);
                (result, vec![x, y], pairs)
            }
            (kind, None) => {
                return Err(crate::TStudentError::InvalidSelection {
                    issue: format!("'{}' requires a second variable", kind),
                })
            }
        };

        let interpretation = Interpretation::from_p_value(result.p_value, alpha);
        info!(
            "t = {:.4}, p = {:.4}, df = {}",
            result.t_statistic, result.p_value, result.degrees_of_freedom
        );

        Ok(Self {
            summaries: samples.iter().map(SampleSummary::from).collect(),
            request,
            result,
            interpretation,
            samples,
            pairs,
        })
    }

    pub fn kind(&self) -> TestKind {
        self.request.kind
    }
}

impl Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format_option = |option_v: Option<f64>| match option_v {
            Some(v) => format!("{:.4}", v),
            None => "".to_string(),
        };

        writeln!(f)?;
        writeln!(f, "_______{}_______________________", self.request.kind)?;
        for summary in self.summaries.iter() {
            writeln!(
                f,
                "{:<16} | n = {} | mean = {} | std = {}",
                summary.name,
                summary.n,
                format_option(summary.mean),
                format_option(summary.std)
            )?;
        }
        if self.request.kind == TestKind::OneSample {
            writeln!(f, "Valor teórico    | {}", self.request.test_value)?;
        }
        if self.request.kind == TestKind::TwoSampleIndependent {
            writeln!(f, "Varianzas iguales| {}", self.request.equal_variance)?;
        }
        writeln!(f, "_______RESULTADOS______________________________")?;
        writeln!(f, "t-statistic      | {:.4}", self.result.t_statistic)?;
        writeln!(f, "p-value          | {:.4}", self.result.p_value)?;
        writeln!(f, "Grados de libertad | {}", self.result.degrees_of_freedom)?;
        writeln!(f, "alpha            | {}", self.interpretation.alpha)?;
        writeln!(f, "_______INTERPRETACIÓN__________________________")?;
        writeln!(f, "{}", self.interpretation)?;
        writeln!(f, "_______________________________________________")
    }
}
