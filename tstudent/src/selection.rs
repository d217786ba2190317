use crate::data::Table;
use crate::{TStudentError, TStudentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TEST_VALUE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    #[serde(alias = "independent", alias = "twoSample")]
    TwoSampleIndependent,
    #[serde(alias = "oneSample", alias = "one-sample")]
    OneSample,
    #[serde(alias = "paired")]
    Paired,
}

impl TestKind {
    /// The label shown to the user and written into the reports.
    pub fn label(&self) -> &'static str {
        match self {
            TestKind::TwoSampleIndependent => "Dos muestras independientes",
            TestKind::OneSample => "Una muestra",
            TestKind::Paired => "Muestras emparejadas",
        }
    }

    pub fn needs_second_variable(&self) -> bool {
        !matches!(self, TestKind::OneSample)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "independent" | "two-sample" | "twosampleindependent" | "dos-muestras-independientes" => {
                Ok(TestKind::TwoSampleIndependent)
            }
            "one-sample" | "onesample" | "una-muestra" => Ok(TestKind::OneSample),
            "paired" | "muestras-emparejadas" => Ok(TestKind::Paired),
            _ => Err(format!(
                "unknown test kind '{}', expected one of: independent, one-sample, paired",
                s
            )),
        }
    }
}

/// A fully validated test request: the variables exist, are numeric and distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub kind: TestKind,
    pub variable1: String,
    pub variable2: Option<String>,
    pub equal_variance: bool,
    pub test_value: f64,
}

impl TestRequest {
    pub fn two_sample(
        table: &Table,
        variable1: &str,
        variable2: &str,
        equal_variance: bool,
    ) -> TStudentResult<Self> {
        let selector = VariableSelector::new(table);
        selector.check_pair(variable1, variable2)?;
        Ok(Self {
            kind: TestKind::TwoSampleIndependent,
            variable1: variable1.to_string(),
            variable2: Some(variable2.to_string()),
            equal_variance,
            test_value: DEFAULT_TEST_VALUE,
        })
    }

    pub fn one_sample(table: &Table, variable: &str, test_value: f64) -> TStudentResult<Self> {
        VariableSelector::new(table).check(variable)?;
        if !test_value.is_finite() {
            return Err(TStudentError::InvalidSelection {
                issue: format!("the theoretical value must be finite, got {}", test_value),
            });
        }
        Ok(Self {
            kind: TestKind::OneSample,
            variable1: variable.to_string(),
            variable2: None,
            equal_variance: true,
            test_value,
        })
    }

    pub fn paired(table: &Table, variable1: &str, variable2: &str) -> TStudentResult<Self> {
        VariableSelector::new(table).check_pair(variable1, variable2)?;
        Ok(Self {
            kind: TestKind::Paired,
            variable1: variable1.to_string(),
            variable2: Some(variable2.to_string()),
            equal_variance: true,
            test_value: DEFAULT_TEST_VALUE,
        })
    }

    /// Dispatches to the constructor of the given kind.
    pub fn build(
        table: &Table,
        kind: TestKind,
        variable1: &str,
        variable2: Option<&str>,
        equal_variance: bool,
        test_value: f64,
    ) -> TStudentResult<Self> {
        let second = || {
            variable2.ok_or_else(|| TStudentError::InvalidSelection {
                issue: format!("'{}' requires a second variable", kind),
            })
        };
        match kind {
            TestKind::TwoSampleIndependent => {
                Self::two_sample(table, variable1, second()?, equal_variance)
            }
            TestKind::OneSample => Self::one_sample(table, variable1, test_value),
            TestKind::Paired => Self::paired(table, variable1, second()?),
        }
    }

    /// The selected variables in selection order.
    pub fn variables(&self) -> Vec<&str> {
        let mut variables = vec![self.variable1.as_str()];
        if let Some(v2) = &self.variable2 {
            variables.push(v2.as_str());
        }
        variables
    }
}

/// Offers the columns a user may pick, mirroring the selection controls:
/// the second choice never contains the first one.
pub struct VariableSelector<'a> {
    table: &'a Table,
    numeric_columns: Vec<&'a str>,
}

impl<'a> VariableSelector<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            numeric_columns: table.numeric_columns(),
        }
    }

    pub fn first_choices(&self) -> &[&'a str] {
        &self.numeric_columns
    }

    pub fn second_choices(&self, variable1: &str) -> Vec<&'a str> {
        self.numeric_columns
            .iter()
            .filter(|c| **c != variable1)
            .copied()
            .collect()
    }

    /// Whether the table supports the given kind at all.
    pub fn supports(&self, kind: TestKind) -> bool {
        if kind.needs_second_variable() {
            self.numeric_columns.len() >= 2
        } else {
            !self.numeric_columns.is_empty()
        }
    }

    fn check(&self, variable: &str) -> TStudentResult<()> {
        if self.numeric_columns.contains(&variable) {
            return Ok(());
        }
        match self.table.column(variable) {
            Some(_) => Err(TStudentError::NonNumericColumn {
                column: variable.to_string(),
            }),
            None => Err(TStudentError::UnknownColumn {
                column: variable.to_string(),
            }),
        }
    }

    fn check_pair(&self, variable1: &str, variable2: &str) -> TStudentResult<()> {
        self.check(variable1)?;
        if !self.second_choices(variable1).contains(&variable2) {
            self.check(variable2)?;
            return Err(TStudentError::InvalidSelection {
                issue: format!("the second variable must differ from '{}'", variable1),
            });
        }
        Ok(())
    }
}
