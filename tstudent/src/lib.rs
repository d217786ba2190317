mod analysis;
mod config;
pub mod data;
mod errors;
pub mod selection;
pub mod stats;

pub use analysis::{Analysis, SampleSummary};
pub use config::AnalysisConfig;
pub use errors::{TStudentError, TStudentResult};
pub use selection::{TestKind, TestRequest, VariableSelector};

use log::info;

/// Runs one full pass for a configuration: load, select, test and interpret.
pub fn run_analysis(config: &AnalysisConfig) -> TStudentResult<(data::Table, Analysis)> {
    config.validate()?;
    let alpha = config.alpha()?;
    let table = data::load_table(&config.data_path())?;

    let request = TestRequest::build(
        &table,
        config.kind,
        &config.variable1,
        config.variable2.as_deref(),
        config.equal_variance(),
        config.test_value(),
    )?;

    let analysis = Analysis::run(&table, request, alpha)?;
    info!("Analysis finished: {}", analysis.interpretation);
    Ok((table, analysis))
}
