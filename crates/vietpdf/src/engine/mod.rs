//! External engine seams: image filtering, OCR, translation, and PDF
//! rendering. The pipeline is generic over these traits; production
//! implementations live in the submodules and tests supply in-memory fakes.
//!
//! All engines are synchronous; the pipeline runs them on a blocking
//! thread, one job at a time.

pub mod filter;
pub mod ocr;
pub mod pdf;
pub mod translate;

use std::path::{Path, PathBuf};

use crate::error::StageError;

pub trait ImageFilter: Send + Sync {
    /// Produces a derived image suitable for OCR and returns its path.
    fn apply(&self, input: &Path) -> Result<PathBuf, StageError>;
}

pub trait OcrEngine: Send + Sync {
    /// Extracts English text from the image at `image`.
    fn recognize(&self, image: &Path) -> Result<String, StageError>;
}

pub trait Translator: Send + Sync {
    /// Translates English text to Vietnamese. Retry policy is the
    /// implementation's own concern.
    fn translate(&self, text: &str) -> Result<String, StageError>;
}

pub trait PdfRenderer: Send + Sync {
    /// Renders `text` as a PDF document at exactly `output`.
    fn render(&self, text: &str, output: &Path) -> Result<(), StageError>;
}

pub use filter::GrayscaleFilter;
pub use ocr::TesseractOcr;
pub use pdf::TextPdfRenderer;
pub use translate::GoogleTranslator;
