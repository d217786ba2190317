extern crate clap;

mod parser;

use chrono::Utc;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info, trace, warn};
use parser::{parse_toml, RunArgs};
use std::error::Error;
use std::path::Path;
use tstudent::{data, run_analysis, AnalysisConfig, VariableSelector};
use tstudent_reporter::ReportFactory;

const LOG_LEVEL: &str = "LOG_LEVEL";
const DEFAULT_LEVEL: &str = "INFO";
const DEFAULT_TOML: &str = "analysis.toml";
const PREVIEW_ROWS: usize = 5;

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview a data file and list the numeric columns available for the tests.
    Columns {
        #[clap(short, long)]
        data: String,
        /// Also list the columns allowed as second variable.
        #[clap(long)]
        variable1: Option<String>,
    },
    /// Run a t-test with the given options.
    Run(RunArgs),
    /// Read the analysis from a TOML file.
    FromToml {
        /// The path to the analysis file.<br>
        /// Default value: 'analysis.toml' in current dir
        #[clap(short, long)]
        file_name: Option<String>,
    },
}

/// CLI for Student's t-tests on tabular data.
#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    #[clap(subcommand)]
    cmd: Command,
}

fn list_columns(data_file: &str, variable1: Option<&str>) -> Result<(), Box<dyn Error>> {
    let table = data::load_table(Path::new(data_file))?;
    println!("{}", table.preview(PREVIEW_ROWS));

    let selector = VariableSelector::new(&table);
    if selector.first_choices().is_empty() {
        warn!("{} has no numeric columns", data_file);
    }
    println!("Variables: {}", selector.first_choices().join(", "));

    if let Some(variable1) = variable1 {
        if !selector.first_choices().contains(&variable1) {
            warn!("'{}' is not a numeric column", variable1);
        }
        println!(
            "Variable 2 (con '{}'): {}",
            variable1,
            selector.second_choices(variable1).join(", ")
        );
    }
    Ok(())
}

fn analyze(config: &AnalysisConfig, show: bool) -> Result<(), Box<dyn Error>> {
    trace!("Running analysis with {:?}", config);
    let start_time = Utc::now();
    let (_, analysis) = run_analysis(config)?;
    let end_time = Utc::now();

    info!("{}", analysis);

    let factory = ReportFactory::new(start_time, end_time, config, &analysis)?;
    println!("{}", factory.text_report());

    if show {
        factory.show();
    }

    // the results are already printed when writing the report fails
    let files = factory.create_report().map_err(|err| {
        error!("Report creation failed: {}", err);
        err
    })?;
    for file in files {
        info!("Wrote {:?}", file.as_os_str());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_level = std::env::var(LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(&log_level)).init();

    let args = CliArgs::parse();

    let outcome = match args.cmd {
        Command::Columns { data, variable1 } => list_columns(&data, variable1.as_deref()),
        Command::Run(run_args) => analyze(&AnalysisConfig::from(&run_args), run_args.show),
        Command::FromToml { file_name } => {
            trace!("Parsing TOML");
            let file_name = file_name.unwrap_or_else(|| DEFAULT_TOML.to_string());
            match parse_toml(&file_name) {
                Ok(config) => analyze(&config, false),
                Err(err) => Err(err.into()),
            }
        }
    };

    if let Err(err) = &outcome {
        error!("{}", err);
    }
    trace!("Finished");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tstudent::{TStudentError, TestKind};

    fn config(dir: &TempDir) -> AnalysisConfig {
        let data_file = dir.path().join("datos.csv");
        fs::write(&data_file, "x\n5\n6\n7\n5\n6\n7\n").unwrap();
        AnalysisConfig::new(
            data_file.to_string_lossy().to_string(),
            TestKind::OneSample,
            "x".into(),
        )
        .with_test_value(Some(6.0))
    }

    #[test]
    fn test_report_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        // a plain file where the report directory belongs
        let blocked = dir.path().join("reporte");
        fs::write(&blocked, "").unwrap();
        let config =
            config(&dir).with_report_directory(Some(blocked.to_string_lossy().to_string()));

        assert!(analyze(&config, false).is_err());
    }

    #[test]
    fn test_pdf_without_report_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_pdf(true);

        let err = analyze(&config, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TStudentError>(),
            Some(TStudentError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_analyze_writes_report() {
        let dir = TempDir::new().unwrap();
        let report_dir = dir.path().join("reporte");
        let config =
            config(&dir).with_report_directory(Some(report_dir.to_string_lossy().to_string()));

        analyze(&config, false).unwrap();
        assert!(report_dir.join(tstudent_reporter::TEXT_REPORT_FILE_NAME).is_file());
    }
}
