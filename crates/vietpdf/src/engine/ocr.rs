use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::OcrConfig;
use crate::error::StageError;

use super::OcrEngine;

/// OCR via the `tesseract` binary, invoked as a subprocess with a
/// wall-clock bound. LSTM engine only, single uniform block of text.
pub struct TesseractOcr {
    binary: PathBuf,
    languages: String,
    dpi: u32,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        let languages = if config.languages.is_empty() {
            "eng".to_string()
        } else {
            config.languages.join("+")
        };

        Self {
            binary: config.binary.clone(),
            languages,
            dpi: config.dpi,
            timeout: config.timeout,
        }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<std::process::ExitStatus, StageError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(StageError::Ocr(format!(
                            "tesseract exceeded the {}s time limit",
                            self.timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    return Err(StageError::Ocr(format!("failed to wait for tesseract: {e}")))
                }
            }
        }
    }
}

/// Drains a child pipe on its own thread so the subprocess never blocks on
/// a full pipe buffer.
fn drain<R: Read + Send + 'static>(reader: Option<R>) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            let _ = reader.read_to_end(&mut buf);
        }
        buf
    })
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &Path) -> Result<String, StageError> {
        let _span = tracing::info_span!("stage.ocr").entered();

        if !image.exists() {
            return Err(StageError::Ocr(format!(
                "image does not exist: {}",
                image.display()
            )));
        }

        let mut child = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .args(["-l", &self.languages])
            .args(["--oem", "1"])
            .args(["--psm", "6"])
            .args(["--dpi", &self.dpi.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StageError::Ocr(format!("failed to spawn {}: {e}", self.binary.display()))
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_with_deadline(&mut child)?;

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let detail = String::from_utf8_lossy(&stderr);
            return Err(StageError::Ocr(format!(
                "tesseract exited with {status}: {}",
                detail.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}
