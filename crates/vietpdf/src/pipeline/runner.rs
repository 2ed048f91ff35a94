//! The linear processing pipeline: filter → OCR → translate → PDF.
//!
//! One `run` per job. Stages execute strictly in order, each timed; the
//! first stage error aborts the run with a stage-qualified message.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info_span;

use crate::engine::{ImageFilter, OcrEngine, PdfRenderer, Translator};
use crate::error::StageError;
use crate::job::{
    DETAIL_CACHED, DETAIL_FILTER_MS, DETAIL_OCR_MS, DETAIL_PDF_MS, DETAIL_PDF_PATH,
    DETAIL_TRANSLATE_MS,
};

/// Elapsed wall-clock per stage, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub filter_ms: u128,
    pub ocr_ms: u128,
    pub translate_ms: u128,
    pub pdf_ms: u128,
}

impl StageTimings {
    /// Details map for a freshly produced artifact (`cached = "false"`).
    pub fn fresh_details(&self, artifact_path: &str) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert(DETAIL_CACHED.to_string(), "false".to_string());
        details.insert(DETAIL_FILTER_MS.to_string(), self.filter_ms.to_string());
        details.insert(DETAIL_OCR_MS.to_string(), self.ocr_ms.to_string());
        details.insert(
            DETAIL_TRANSLATE_MS.to_string(),
            self.translate_ms.to_string(),
        );
        details.insert(DETAIL_PDF_MS.to_string(), self.pdf_ms.to_string());
        details.insert(DETAIL_PDF_PATH.to_string(), artifact_path.to_string());
        details
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub artifact_path: PathBuf,
    pub timings: StageTimings,
}

pub struct Pipeline<F, O, T, P> {
    filter: F,
    ocr: O,
    translator: T,
    renderer: P,
    pdf_dir: PathBuf,
}

impl<F, O, T, P> Pipeline<F, O, T, P>
where
    F: ImageFilter,
    O: OcrEngine,
    T: Translator,
    P: PdfRenderer,
{
    pub fn new(filter: F, ocr: O, translator: T, renderer: P, pdf_dir: impl Into<PathBuf>) -> Self {
        Self {
            filter,
            ocr,
            translator,
            renderer,
            pdf_dir: pdf_dir.into(),
        }
    }

    /// The deterministic artifact location for a job. The cache stores this
    /// path, so it must not vary between runs of the same job.
    pub fn artifact_path(&self, job_id: &str) -> PathBuf {
        self.pdf_dir.join(format!("{job_id}.pdf"))
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    pub fn run(&self, job_id: &str, image_path: &Path) -> Result<PipelineOutput, StageError> {
        let _span = info_span!("pipeline", job_id = %job_id).entered();
        let mut timings = StageTimings::default();

        let filtered = timed(&mut timings.filter_ms, || self.filter.apply(image_path))?;
        tracing::debug!(job_id, filtered = %filtered.display(), ms = timings.filter_ms,
            "Filter stage done");

        let english = timed(&mut timings.ocr_ms, || self.ocr.recognize(&filtered))?;
        tracing::debug!(job_id, chars = english.len(), ms = timings.ocr_ms, "OCR stage done");

        let vietnamese = timed(&mut timings.translate_ms, || {
            self.translator.translate(&english)
        })?;
        tracing::debug!(job_id, chars = vietnamese.len(), ms = timings.translate_ms,
            "Translate stage done");

        // Render beside the final location, then move into place so the
        // deterministic path never holds a half-written document.
        let artifact_path = self.artifact_path(job_id);
        let part_path = self.pdf_dir.join(format!("{job_id}.pdf.part"));
        timed(&mut timings.pdf_ms, || {
            self.renderer.render(&vietnamese, &part_path)?;
            std::fs::rename(&part_path, &artifact_path).map_err(|e| {
                let _ = std::fs::remove_file(&part_path);
                StageError::Pdf(format!(
                    "failed to move PDF to {}: {e}",
                    artifact_path.display()
                ))
            })
        })?;
        tracing::debug!(job_id, artifact = %artifact_path.display(), ms = timings.pdf_ms,
            "PDF stage done");

        Ok(PipelineOutput {
            artifact_path,
            timings,
        })
    }
}

fn timed<T>(
    slot: &mut u128,
    f: impl FnOnce() -> Result<T, StageError>,
) -> Result<T, StageError> {
    let start = Instant::now();
    let result = f();
    *slot = start.elapsed().as_millis();
    result
}
