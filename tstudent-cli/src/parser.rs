use log::error;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;
use tstudent::{AnalysisConfig, TStudentError, TestKind};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("File {0:?} does not exist")]
    MissingFile(PathBuf),
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("unable to parse the TOML structure: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Analysis(#[from] TStudentError),
}

pub fn parse_toml(file_name: &str) -> Result<AnalysisConfig, CliError> {
    let file = Path::new(file_name);
    if !file.exists() {
        error!("File {:?} does not exist", file.as_os_str());
        return Err(CliError::MissingFile(file.to_path_buf()));
    }

    let file_content = fs::read_to_string(file)?;
    let config: AnalysisConfig = toml::from_str(&file_content)?;
    config.validate()?;
    Ok(config)
}

/// Options of a single analysis run.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// The data file, CSV or spreadsheet with headers in the first row.
    #[clap(short, long)]
    pub data: String,
    /// One of: independent, one-sample, paired.
    #[clap(short, long)]
    pub kind: TestKind,
    #[clap(long)]
    pub variable1: String,
    /// Required for the independent and paired tests.
    #[clap(long)]
    pub variable2: Option<String>,
    /// Use Welch's test instead of the pooled variance.
    #[clap(long)]
    pub unequal_variance: bool,
    /// Hypothesized mean of the one-sample test.
    #[clap(long, allow_negative_numbers = true)]
    pub test_value: Option<f64>,
    /// Significance level in (0, 1), default 0.05.
    #[clap(short, long)]
    pub alpha: Option<f64>,
    /// Directory receiving the report files.
    #[clap(short, long)]
    pub report_dir: Option<String>,
    /// Also render the PDF report.
    #[clap(long)]
    pub pdf: bool,
    /// Open the interactive charts in the browser.
    #[clap(long)]
    pub show: bool,
}

impl From<&RunArgs> for AnalysisConfig {
    fn from(args: &RunArgs) -> Self {
        AnalysisConfig::new(args.data.clone(), args.kind, args.variable1.clone())
            .with_variable2(args.variable2.clone())
            .with_equal_variance(!args.unequal_variance)
            .with_test_value(args.test_value)
            .with_alpha(args.alpha)
            .with_report_directory(args.report_dir.clone())
            .with_pdf(args.pdf)
    }
}
