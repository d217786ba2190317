use thiserror::Error;

#[derive(Error, Debug)]
pub enum TStudentError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerDe(#[from] serde_json::Error),

    #[error("Unable to parse the CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to parse the spreadsheet: {issue}")]
    Spreadsheet { issue: String },

    #[error("Unsupported file format '{extension}', expected a .csv or spreadsheet file")]
    UnsupportedFormat { extension: String },

    #[error("Invalid configuration: {issue}")]
    InvalidConfig { issue: String },

    #[error("Invalid selection: {issue}")]
    InvalidSelection { issue: String },

    #[error("Column '{column}' does not exist")]
    UnknownColumn { column: String },

    #[error("Column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    #[error("'{variable}' needs at least 2 observations, got {n}")]
    InsufficientObservations { variable: String, n: usize },

    #[error("'{variable}' has zero variance, the t-statistic is undefined")]
    ZeroVariance { variable: String },

    #[error("Paired samples differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Significance level must lie in (0, 1), got {alpha}")]
    InvalidSignificanceLevel { alpha: f64 },

    #[error("Charts were generated for '{found}' but the analysis is '{expected}'")]
    StaleCharts { expected: String, found: String },

    #[error("Chart rendering failed: {issue}")]
    Render { issue: String },

    #[error("PDF generation failed: {issue}")]
    Pdf { issue: String },
}

pub type TStudentResult<T> = Result<T, TStudentError>;
