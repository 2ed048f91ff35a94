use std::time::Duration;

use crate::config::TranslateConfig;
use crate::error::StageError;

use super::Translator;

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// English-to-Vietnamese translation over the unofficial Google Translate
/// endpoint. Transient failures are retried inside this engine with a
/// constant pause between attempts; the trait caller sees one outcome.
pub struct GoogleTranslator {
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            timeout: config.timeout,
            retries: config.retries,
            backoff: config.backoff,
        }
    }

    fn request(&self, text: &str) -> Result<String, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;

        let response = client
            .get(TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", "en"),
                ("tl", "vi"),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("translate endpoint returned {status}"));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| format!("unreadable response body: {e}"))?;

        parse_translation(&body).ok_or_else(|| "no translation in response".to_string())
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> Result<String, StageError> {
        let _span = tracing::info_span!("stage.translate").entered();

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let mut last_error = String::new();
        for attempt in 0..=self.retries {
            if attempt > 0 {
                tracing::warn!(attempt, retries = self.retries, error = %last_error,
                    "Retrying translation");
                std::thread::sleep(self.backoff);
            }

            match self.request(text) {
                Ok(translated) => return Ok(translated),
                Err(e) => last_error = e,
            }
        }

        Err(StageError::Translate(format!(
            "all {} attempts failed, last error: {last_error}",
            self.retries + 1
        )))
    }
}

/// The endpoint answers a deeply nested array; the translated text is the
/// first element of each segment under the first top-level element.
fn parse_translation(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut translated = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(|p| p.as_str()) {
            translated.push_str(part);
        }
    }
    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}
