use crate::charts::{render, ChartSet, RasterImage};
use crate::text_report::{report_lines, REPORT_TITLE};
use image::{DynamicImage, RgbImage};
use log::info;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fmt::Debug;
use tstudent::{Analysis, TStudentError, TStudentResult};

pub const PDF_REPORT_FILE_NAME: &str = "informe_prueba_t.pdf";
pub const PDF_REPORT_MIME: &str = "application/pdf";

const DOCUMENT_TITLE: &str = "Informe de Prueba t de Student";
const RUNNING_HEADER: &str = "Informe de Prueba t de Student generado por tstudent";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LAYER: &str = "Layer 1";

const IMAGE_WIDTH: f32 = 180.0;
const IMAGE_X: f32 = 15.0;
const IMAGE_TOP: f32 = 260.0;
const CHART_TITLE_Y: f32 = 270.0;

const HEADER_Y: f32 = 285.0;
const FOOTER_Y: f32 = 10.0;
const BODY_START_Y: f32 = 245.0;
const LINE_HEIGHT: f32 = 6.0;
const BLOCK_GAP: f32 = 4.0;
const WRAP_AT: usize = 85;

const MM_PER_POINT: f32 = 0.3528;

fn pdf_error<E: Debug>(err: E) -> TStudentError {
    TStudentError::Pdf {
        issue: format!("{:?}", err),
    }
}

/// Approximate x offset centering `text` on the page, for Helvetica glyphs.
fn centered_x(text: &str, font_size: f32) -> f32 {
    let width = text.chars().count() as f32 * font_size * 0.5 * MM_PER_POINT;
    ((PAGE_WIDTH - width) / 2.0).max(0.0)
}

/// Greedy word wrap; words longer than the limit stay on their own line.
fn wrap(text: &str, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > limit {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> TStudentResult<Self> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(pdf_error)?,
        })
    }
}

/// Header and footer shared by every page.
fn decorate(layer: &PdfLayerReference, fonts: &Fonts, page_number: usize) {
    layer.use_text(RUNNING_HEADER, 9.0, Mm(IMAGE_X), Mm(HEADER_Y), &fonts.regular);

    let footer = format!("Página {}", page_number);
    layer.use_text(
        footer.as_str(),
        8.0,
        Mm(centered_x(&footer, 8.0)),
        Mm(FOOTER_Y),
        &fonts.italic,
    );
}

struct Figure {
    title: String,
    image: RasterImage,
}

impl Figure {
    /// Height on the page once scaled to the fixed image width.
    fn height_mm(&self) -> f32 {
        IMAGE_WIDTH * self.image.height as f32 / self.image.width as f32
    }

    fn dpi(&self) -> f32 {
        self.image.width as f32 * 25.4 / IMAGE_WIDTH
    }

    fn draw(&self, layer: &PdfLayerReference, fonts: &Fonts) -> TStudentResult<()> {
        layer.use_text(
            self.title.as_str(),
            14.0,
            Mm(centered_x(&self.title, 14.0)),
            Mm(CHART_TITLE_Y),
            &fonts.bold,
        );

        let buffer = RgbImage::from_raw(self.image.width, self.image.height, self.image.rgb.clone())
            .ok_or_else(|| {
                pdf_error(format!(
                    "raster of '{}' does not match {}x{}",
                    self.title, self.image.width, self.image.height
                ))
            })?;
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(buffer));
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(IMAGE_X)),
                translate_y: Some(Mm(IMAGE_TOP - self.height_mm())),
                dpi: Some(self.dpi()),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// The printable report: a results page followed by one page per chart.
pub struct PdfReport {
    body: Vec<String>,
    figures: Vec<Figure>,
}

impl PdfReport {
    /// Rasterizes the charts; they must belong to the same analysis.
    pub fn build(analysis: &Analysis, charts: &ChartSet) -> TStudentResult<Self> {
        charts.ensure_matches(analysis)?;

        let figures = charts
            .charts
            .iter()
            .map(|chart| {
                Ok(Figure {
                    title: chart.title.clone(),
                    image: render(chart)?,
                })
            })
            .collect::<TStudentResult<Vec<_>>>()?;

        Ok(Self {
            body: report_lines(analysis),
            figures,
        })
    }

    pub fn page_count(&self) -> usize {
        1 + self.figures.len()
    }

    fn draw_results_page(&self, layer: &PdfLayerReference, fonts: &Fonts) {
        layer.use_text(
            REPORT_TITLE,
            16.0,
            Mm(centered_x(REPORT_TITLE, 16.0)),
            Mm(CHART_TITLE_Y),
            &fonts.bold,
        );

        let mut y = BODY_START_Y;
        for block in self.body.iter() {
            for line in wrap(block, WRAP_AT) {
                layer.use_text(line.as_str(), 12.0, Mm(centered_x(&line, 12.0)), Mm(y), &fonts.regular);
                y -= LINE_HEIGHT;
            }
            y -= BLOCK_GAP;
        }
    }

    /// Lays out the document and serializes it into memory.
    pub fn to_bytes(&self) -> TStudentResult<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(DOCUMENT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let fonts = Fonts::load(&doc)?;

        let results_layer = doc.get_page(page).get_layer(layer);
        self.draw_results_page(&results_layer, &fonts);
        decorate(&results_layer, &fonts, 1);

        for (idx, figure) in self.figures.iter().enumerate() {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            let chart_layer = doc.get_page(page).get_layer(layer);
            figure.draw(&chart_layer, &fonts)?;
            decorate(&chart_layer, &fonts, idx + 2);
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        info!(
            "PDF report with {} pages ({} bytes)",
            self.page_count(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tstudent::data::{Cell, Table};
    use tstudent::stats::SignificanceLevel;
    use tstudent::{TestKind, TestRequest};

    fn analysis(kind: TestKind) -> Analysis {
        let rows = (0..10)
            .map(|i| {
                let x = 10.0 + (i % 4) as f64;
                vec![Cell::Number(x), Cell::Number(x + 1.0 + (i % 3) as f64)]
            })
            .collect();
        let table = Table::from_rows(vec!["antes".into(), "despues".into()], rows).unwrap();
        let request =
            TestRequest::build(&table, kind, "antes", Some("despues"), true, 11.0).unwrap();
        Analysis::run(&table, request, SignificanceLevel::default()).unwrap()
    }

    fn pdf_pages(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_page_count_per_kind() {
        for (kind, expected) in [
            (TestKind::TwoSampleIndependent, 4),
            (TestKind::OneSample, 2),
            (TestKind::Paired, 3),
        ] {
            let analysis = analysis(kind);
            let charts = ChartSet::for_analysis(&analysis).unwrap();
            let report = PdfReport::build(&analysis, &charts).unwrap();
            assert_eq!(report.page_count(), expected);

            let bytes = report.to_bytes().unwrap();
            assert!(bytes.starts_with(b"%PDF"));
            assert_eq!(pdf_pages(&bytes), expected, "{}", kind);
        }
    }

    #[test]
    fn test_stale_charts_are_rejected() {
        let paired = analysis(TestKind::Paired);
        let one_sample = analysis(TestKind::OneSample);
        let charts = ChartSet::for_analysis(&one_sample).unwrap();
        assert!(matches!(
            PdfReport::build(&paired, &charts),
            Err(TStudentError::StaleCharts { .. })
        ));
    }

    #[test]
    fn test_wrap_long_sentences() {
        let sentence = "Interpretación: No podemos rechazar la hipótesis nula. No existe evidencia suficiente para afirmar que hay una diferencia significativa.";
        let lines = wrap(sentence, WRAP_AT);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= WRAP_AT));
        assert_eq!(lines.join(" "), sentence);
        assert_eq!(wrap("", WRAP_AT), Vec::<String>::new());
    }

    #[test]
    fn test_centering() {
        assert!((centered_x("", 12.0) - PAGE_WIDTH / 2.0).abs() < f32::EPSILON);
        assert!(centered_x(RUNNING_HEADER, 12.0) > 0.0);
    }
}
