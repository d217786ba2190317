use crate::charts::ChartSet;
use crate::pdf_report::{PdfReport, PDF_REPORT_FILE_NAME};
use crate::text_report::{text_report, REPORT_TITLE, TEXT_REPORT_FILE_NAME};
use crate::ComponentWriter;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tstudent::{Analysis, AnalysisConfig, TStudentResult};

const COMPONENTS_DIR: &str = "components";
const DATA_DIR: &str = "data";
const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const HIST_PATH: &str = "hist";
const RESULTS_FILE: &str = "results.json";
const META_FILE: &str = "meta.json";
const REPORT_PAGE: &str = "report.html";

#[derive(Serialize)]
struct ReportMeta<'a> {
    start_time: String,
    end_time: String,
    config: &'a AnalysisConfig,
}

impl<'a> From<&ReportFactory<'a>> for ReportMeta<'a> {
    fn from(rf: &ReportFactory<'a>) -> Self {
        Self {
            start_time: format!("{}", rf.start_time.format(FORMAT)),
            end_time: format!("{}", rf.end_time.format(FORMAT)),
            config: rf.config,
        }
    }
}

fn create_dir(dir: &Path) -> TStudentResult<()> {
    if dir.exists() && dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Moves the given files, if present, into a fresh timestamped folder below `data/hist`.
fn hist_results(data_dir: &Path, files: &[PathBuf]) -> TStudentResult<()> {
    let existing: Vec<&PathBuf> = files.iter().filter(|f| f.is_file()).collect();
    if existing.is_empty() {
        return Ok(());
    }

    let copy_dir = data_dir
        .join(HIST_PATH)
        .join(Utc::now().format("%Y-%m-%d__%H_%M_%S").to_string());
    create_dir(&copy_dir)?;

    for src_path in existing {
        if let Some(file_name) = src_path.file_name() {
            fs::rename(src_path, copy_dir.join(file_name))?;
        }
    }
    info!("Archived previous results to {:?}", copy_dir.as_os_str());
    Ok(())
}

fn setup_report_structure(path: &Path) -> TStudentResult<(PathBuf, PathBuf)> {
    create_dir(path)?;

    let components_dir = path.join(COMPONENTS_DIR);
    create_dir(&components_dir)?;

    let data_dir = path.join(DATA_DIR);
    create_dir(&data_dir)?;

    info!("Creating report in {:?}", path.as_os_str());
    Ok((components_dir, data_dir))
}

/// Serializes the data, creates or updates the file and its contents.
fn write_or_update<D: Serialize>(serializable_data: &D, file: &Path) -> TStudentResult<()> {
    let json = serde_json::to_string_pretty(serializable_data)?;
    fs::write(file, json)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub struct ReportFactory<'a> {
    config: &'a AnalysisConfig,
    analysis: &'a Analysis,
    charts: ChartSet,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl<'a> ReportFactory<'a> {
    /// Generates the charts of the analysis; nothing is written yet.
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        config: &'a AnalysisConfig,
        analysis: &'a Analysis,
    ) -> TStudentResult<Self> {
        let charts = ChartSet::for_analysis(analysis)?;
        Ok(Self {
            config,
            analysis,
            charts,
            start_time,
            end_time,
        })
    }

    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    pub fn text_report(&self) -> String {
        text_report(self.analysis)
    }

    /// Renders the PDF report into memory.
    pub fn pdf_report(&self) -> TStudentResult<Vec<u8>> {
        PdfReport::build(self.analysis, &self.charts)?.to_bytes()
    }

    /// Opens the interactive charts in the browser.
    pub fn show(&self) {
        for (chart, component) in self.charts.interactive() {
            info!("Showing '{}'", chart.title);
            component.show();
        }
    }

    fn dump_data(&self, data_dir: &Path) -> TStudentResult<()> {
        let results_file = data_dir.join(RESULTS_FILE);
        let meta_file = data_dir.join(META_FILE);

        write_or_update(self.analysis, &results_file)?;
        write_or_update(&ReportMeta::from(self), &meta_file)?;
        Ok(())
    }

    fn create_components(&self, components_dir: &Path) -> TStudentResult<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(self.charts.len());
        for (chart, component) in self.charts.interactive() {
            let file = components_dir.join(format!("{}.html", chart.id));
            component.write(&file)?;
            files.push(file);
        }
        Ok(files)
    }

    fn write_documents(&self, path: &Path) -> TStudentResult<Vec<PathBuf>> {
        let text_file = path.join(TEXT_REPORT_FILE_NAME);
        fs::write(&text_file, self.text_report())?;
        let mut files = vec![text_file];

        if self.config.pdf() {
            let pdf_file = path.join(PDF_REPORT_FILE_NAME);
            fs::write(&pdf_file, self.pdf_report()?)?;
            files.push(pdf_file);
        }
        Ok(files)
    }

    fn write_report_page(&self, path: &Path, components: &[PathBuf]) -> TStudentResult<PathBuf> {
        let frames: Vec<String> = components
            .iter()
            .filter_map(|file| file.file_name())
            .map(|name| {
                format!(
                    "<iframe src=\"{}/{}\"></iframe>",
                    COMPONENTS_DIR,
                    name.to_string_lossy()
                )
            })
            .collect();

        let mut documents = format!(
            "<a href=\"{0}\">{0}</a>",
            TEXT_REPORT_FILE_NAME
        );
        if self.config.pdf() {
            documents.push_str(&format!(" | <a href=\"{0}\">{0}</a>", PDF_REPORT_FILE_NAME));
        }

        let page = include_str!("./templates/report_template.html")
            .replace("$TITLE$", REPORT_TITLE)
            .replace(
                "$GENERATED$",
                &format!("Generado el {}", self.end_time.format(FORMAT)),
            )
            .replace("$SUMMARY$", &escape_html(&self.text_report()))
            .replace("$DOCUMENTS$", &format!("<p>{}</p>", documents))
            .replace("$COMPONENTS$", &frames.join("\n    "));

        let report_file = path.join(REPORT_PAGE);
        fs::write(&report_file, page)?;
        Ok(report_file)
    }

    /// Writes every artifact into the configured report directory and returns their paths.
    /// Without a report directory nothing is written.
    pub fn create_report(&self) -> TStudentResult<Vec<PathBuf>> {
        let report_path = match &self.config.report_directory {
            Some(dir) => Path::new(dir),
            None if self.config.pdf() => {
                warn!("The PDF report needs a report directory, nothing written");
                return Ok(Vec::new());
            }
            None => {
                info!("No report directory configured");
                return Ok(Vec::new());
            }
        };

        let (components_dir, data_dir) = setup_report_structure(report_path)?;

        let previous = [
            data_dir.join(RESULTS_FILE),
            data_dir.join(META_FILE),
            report_path.join(TEXT_REPORT_FILE_NAME),
            report_path.join(PDF_REPORT_FILE_NAME),
        ];
        hist_results(&data_dir, &previous)?;

        let mut written = self.write_documents(report_path)?;
        self.dump_data(&data_dir)?;
        written.push(data_dir.join(RESULTS_FILE));
        written.push(data_dir.join(META_FILE));

        let components = self.create_components(&components_dir)?;
        written.push(self.write_report_page(report_path, &components)?);
        written.extend(components);

        info!("Report written, {} files", written.len());
        Ok(written)
    }
}
