use crate::{TStudentError, TStudentResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub const DEFAULT_ALPHA: f64 = 0.05;

const REJECT: &str = "Rechazamos la hipótesis nula. Existe una diferencia significativa.";
const KEEP: &str = "No podemos rechazar la hipótesis nula. No existe evidencia suficiente para afirmar que hay una diferencia significativa.";

/// A significance level within the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceLevel(f64);

impl SignificanceLevel {
    pub fn new(alpha: f64) -> TStudentResult<Self> {
        if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(TStudentError::InvalidSignificanceLevel { alpha })
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SignificanceLevel {
    fn default() -> Self {
        Self(DEFAULT_ALPHA)
    }
}

impl Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub alpha: SignificanceLevel,
    pub reject_null: bool,
}

impl Interpretation {
    /// The null hypothesis is rejected iff `p_value < alpha`.
    pub fn from_p_value(p_value: f64, alpha: SignificanceLevel) -> Self {
        Self {
            alpha,
            reject_null: p_value < alpha.value(),
        }
    }

    pub fn sentence(&self) -> &'static str {
        if self.reject_null {
            REJECT
        } else {
            KEEP
        }
    }
}

impl Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sentence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_level_bounds() {
        assert!(SignificanceLevel::new(0.05).is_ok());
        assert!(SignificanceLevel::new(0.999).is_ok());
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                SignificanceLevel::new(alpha),
                Err(TStudentError::InvalidSignificanceLevel { .. })
            ));
        }
        assert_eq!(SignificanceLevel::default().value(), 0.05);
        assert_eq!(SignificanceLevel::default().to_string(), "0.05");
    }

    #[test]
    fn test_reject_iff_strictly_below_alpha() {
        let p_values = [0.0, 0.001, 0.01, 0.049, 0.05, 0.051, 0.3, 0.5, 0.99, 1.0];
        for alpha in (1..100).map(|i| i as f64 / 100.0) {
            let level = SignificanceLevel::new(alpha).unwrap();
            for p in p_values {
                let interpretation = Interpretation::from_p_value(p, level);
                assert_eq!(interpretation.reject_null, p < alpha, "p={} alpha={}", p, alpha);
            }
        }

        let at_boundary = Interpretation::from_p_value(0.05, SignificanceLevel::default());
        assert!(!at_boundary.reject_null);
        assert!(at_boundary.sentence().starts_with("No podemos rechazar"));
    }
}
