mod charts;
mod pdf_report;
mod report;
mod text_report;

pub use charts::{render, Chart, ChartKind, ChartSet, InteractiveChart, RasterImage};
pub use pdf_report::{PdfReport, PDF_REPORT_FILE_NAME, PDF_REPORT_MIME};
pub use report::ReportFactory;
pub use text_report::{text_report, TEXT_REPORT_FILE_NAME, TEXT_REPORT_MIME};

use std::path::Path;
use tstudent::TStudentResult;

/// A report component that can be persisted on its own, e.g. an interactive chart.
pub trait ComponentWriter {
    fn write(&self, file: &Path) -> TStudentResult<()>;
}
