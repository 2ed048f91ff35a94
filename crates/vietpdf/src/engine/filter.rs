use std::path::{Path, PathBuf};

use crate::error::StageError;

use super::ImageFilter;

/// Pre-OCR image filter. Current policy is grayscale conversion only; the
/// derived image is written beside the input as `<stem>-gray.png`.
pub struct GrayscaleFilter;

impl GrayscaleFilter {
    pub fn new() -> Self {
        Self
    }

    fn derived_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        input.with_file_name(format!("{stem}-gray.png"))
    }
}

impl Default for GrayscaleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFilter for GrayscaleFilter {
    fn apply(&self, input: &Path) -> Result<PathBuf, StageError> {
        let _span = tracing::info_span!("stage.filter").entered();

        let img = image::open(input).map_err(|e| {
            StageError::Filter(format!("failed to open image {}: {e}", input.display()))
        })?;

        let gray = img.grayscale();
        let output = Self::derived_path(input);
        gray.save(&output).map_err(|e| {
            StageError::Filter(format!(
                "failed to save grayscale image {}: {e}",
                output.display()
            ))
        })?;

        Ok(output)
    }
}
