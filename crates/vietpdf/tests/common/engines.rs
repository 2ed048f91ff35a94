//! In-memory engine fakes. They operate on real files in the harness
//! tempdir but never touch tesseract, the network, or a font directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use vietpdf::engine::{ImageFilter, OcrEngine, PdfRenderer, Translator};
use vietpdf::error::StageError;

/// Copies the input beside itself as `<stem>-gray.png`, standing in for the
/// grayscale conversion.
pub struct CopyFilter;

impl ImageFilter for CopyFilter {
    fn apply(&self, input: &Path) -> Result<PathBuf, StageError> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let output = input.with_file_name(format!("{stem}-gray.png"));
        std::fs::copy(input, &output)
            .map_err(|e| StageError::Filter(format!("failed to copy {}: {e}", input.display())))?;
        Ok(output)
    }
}

/// "Recognizes" the file content itself as the extracted text, so distinct
/// images produce distinct documents. Empty input fails the way a real OCR
/// engine does on a blank page.
pub struct ContentOcr;

impl OcrEngine for ContentOcr {
    fn recognize(&self, image: &Path) -> Result<String, StageError> {
        let bytes = std::fs::read(image)
            .map_err(|e| StageError::Ocr(format!("failed to read {}: {e}", image.display())))?;
        if bytes.is_empty() {
            return Err(StageError::Ocr("no text recognized in image".to_string()));
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Marks text as translated without a network round trip.
pub struct PrefixTranslator;

impl Translator for PrefixTranslator {
    fn translate(&self, text: &str) -> Result<String, StageError> {
        Ok(format!("vi: {text}"))
    }
}

/// Writes a minimal document that still looks like a PDF to a byte sniffer.
pub struct StubPdfRenderer;

impl PdfRenderer for StubPdfRenderer {
    fn render(&self, text: &str, output: &Path) -> Result<(), StageError> {
        std::fs::write(output, format!("%PDF-1.4\n{text}\n%%EOF\n"))
            .map_err(|e| StageError::Pdf(format!("failed to write {}: {e}", output.display())))
    }
}
