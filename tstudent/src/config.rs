use crate::selection::{TestKind, DEFAULT_TEST_VALUE};
use crate::stats::SignificanceLevel;
use crate::{TStudentError, TStudentResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnalysisConfig {
    #[serde(alias = "dataFile")]
    #[serde(alias = "file")]
    pub data_file: String,
    #[serde(alias = "testKind")]
    pub kind: TestKind,
    pub variable1: String,
    pub variable2: Option<String>,

    #[serde(alias = "equalVariance")]
    #[serde(alias = "equalVar")]
    equal_variance: Option<bool>,
    #[serde(alias = "testValue")]
    #[serde(alias = "theoreticalValue")]
    test_value: Option<f64>,
    alpha: Option<f64>,

    #[serde(alias = "reportDirectory")]
    #[serde(alias = "reportDir")]
    pub report_directory: Option<String>,
    /// Whether to render the PDF report into the report directory.
    pub pdf: Option<bool>,
}

impl AnalysisConfig {
    pub fn new(data_file: String, kind: TestKind, variable1: String) -> Self {
        Self {
            data_file,
            kind,
            variable1,
            variable2: None,
            equal_variance: None,
            test_value: None,
            alpha: None,
            report_directory: None,
            pdf: None,
        }
    }

    pub fn with_variable2(mut self, variable2: Option<String>) -> Self {
        self.variable2 = variable2;
        self
    }

    pub fn with_equal_variance(mut self, equal_variance: bool) -> Self {
        self.equal_variance = Some(equal_variance);
        self
    }

    pub fn with_test_value(mut self, test_value: Option<f64>) -> Self {
        self.test_value = test_value;
        self
    }

    pub fn with_alpha(mut self, alpha: Option<f64>) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_report_directory(mut self, report_directory: Option<String>) -> Self {
        self.report_directory = report_directory;
        self
    }

    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = Some(pdf);
        self
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_file)
    }

    pub fn equal_variance(&self) -> bool {
        self.equal_variance.unwrap_or(true)
    }

    pub fn test_value(&self) -> f64 {
        self.test_value.unwrap_or(DEFAULT_TEST_VALUE)
    }

    pub fn alpha(&self) -> TStudentResult<SignificanceLevel> {
        match self.alpha {
            Some(alpha) => SignificanceLevel::new(alpha),
            None => Ok(SignificanceLevel::default()),
        }
    }

    pub fn pdf(&self) -> bool {
        self.pdf.unwrap_or_default()
    }

    /// Checks the settings that do not depend on the data.
    pub fn validate(&self) -> TStudentResult<()> {
        self.alpha()?;
        if self.pdf() && self.report_directory.is_none() {
            return Err(TStudentError::InvalidConfig {
                issue: "the PDF report needs a report directory".to_string(),
            });
        }
        Ok(())
    }
}
