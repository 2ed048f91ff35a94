use std::path::{Path, PathBuf};

use crate::config::PdfConfig;
use crate::error::StageError;

use super::PdfRenderer;

/// Renders translated text to an A4 PDF with an embedded TrueType font.
/// Vietnamese needs full Unicode coverage, so the font family is loaded
/// from disk rather than using the PDF built-ins.
pub struct TextPdfRenderer {
    font_dir: PathBuf,
    font_family: String,
}

impl TextPdfRenderer {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            font_dir: config.font_dir.clone(),
            font_family: config.font_family.clone(),
        }
    }
}

impl PdfRenderer for TextPdfRenderer {
    fn render(&self, text: &str, output: &Path) -> Result<(), StageError> {
        let _span = tracing::info_span!("stage.pdf").entered();

        let font = genpdf::fonts::from_files(&self.font_dir, &self.font_family, None)
            .map_err(|e| {
                StageError::Pdf(format!(
                    "failed to load font family '{}' from {}: {e}",
                    self.font_family,
                    self.font_dir.display()
                ))
            })?;

        let mut doc = genpdf::Document::new(font);
        doc.set_title("Translated Document");

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        let paragraphs = split_paragraphs(text);
        if paragraphs.is_empty() {
            doc.push(genpdf::elements::Paragraph::new(""));
        }
        for (i, paragraph) in paragraphs.iter().enumerate() {
            if i > 0 {
                doc.push(genpdf::elements::Break::new(1.0));
            }
            doc.push(genpdf::elements::Paragraph::new(paragraph.as_str()));
        }

        doc.render_to_file(output)
            .map_err(|e| StageError::Pdf(format!("failed to write {}: {e}", output.display())))
    }
}

/// Splits on blank lines; single newlines inside a paragraph become spaces
/// so wrapped OCR lines flow as prose.
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.replace('\n', " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
