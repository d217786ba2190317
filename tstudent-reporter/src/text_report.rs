use tstudent::Analysis;

pub const TEXT_REPORT_FILE_NAME: &str = "reporte_prueba_t.txt";
pub const TEXT_REPORT_MIME: &str = "text/plain";

pub(crate) const REPORT_TITLE: &str = "Resultados de la Prueba t de Student";

/// The lines of the report body, in order and without the title.
pub(crate) fn report_lines(analysis: &Analysis) -> Vec<String> {
    let result = &analysis.result;
    vec![
        format!("Tipo de prueba: {}", analysis.kind().label()),
        format!("t-statistic: {:.4}", result.t_statistic),
        format!("p-value: {:.4}", result.p_value),
        format!("Grados de libertad: {}", result.degrees_of_freedom),
        format!(
            "Nivel de significancia (alpha): {}",
            analysis.interpretation.alpha
        ),
        format!("Interpretación: {}", analysis.interpretation.sentence()),
    ]
}

/// Renders the plain text report, blocks separated by an empty line.
pub fn text_report(analysis: &Analysis) -> String {
    let mut blocks = vec![REPORT_TITLE.to_string()];
    blocks.extend(report_lines(analysis));
    let mut report = blocks.join("\n\n");
    report.push('\n');
    report
}
