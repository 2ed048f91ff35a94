//! Service configuration, loaded from the environment.
//!
//! Every tunable lives in one `Config` value passed into constructors; no
//! module reads the environment on its own.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub broker: BrokerConfig,
    pub store: StoreConfig,
    pub http: HttpConfig,
    pub upload_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub worker_count: usize,
    pub ocr: OcrConfig,
    pub translate: TranslateConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub broker: String,
    pub topic: String,
    pub group_id: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub addr: String,
    pub job_ttl: Duration,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Allowed CORS origins. Empty means permissive (development posture).
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub binary: PathBuf,
    pub languages: Vec<String>,
    pub dpi: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub font_dir: PathBuf,
    pub font_family: String,
}

impl Config {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary lookup function. Tests inject a
    /// map here instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            broker: BrokerConfig {
                broker: string_or(&lookup, "KAFKA_BROKER", "localhost:9092"),
                topic: string_or(&lookup, "KAFKA_TOPIC", "image_processing_jobs"),
                group_id: string_or(&lookup, "KAFKA_GROUP_ID", "image-processor-group"),
            },
            store: StoreConfig {
                addr: string_or(&lookup, "REDIS_ADDR", "localhost:6379"),
                job_ttl: Duration::from_secs(parse_or(&lookup, "JOB_TTL_SECS", 24 * 60 * 60)?),
                cache_ttl: Duration::from_secs(parse_or(
                    &lookup,
                    "CACHE_TTL_SECS",
                    7 * 24 * 60 * 60,
                )?),
            },
            http: HttpConfig {
                host: string_or(&lookup, "HOST", "0.0.0.0"),
                port: parse_or(&lookup, "PORT", 8080)?,
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
                cors_origins: list_or(&lookup, "CORS_ORIGINS"),
            },
            upload_dir: PathBuf::from(string_or(&lookup, "UPLOAD_DIR", "./uploads")),
            pdf_dir: PathBuf::from(string_or(&lookup, "PDF_DIR", "./pdfs")),
            worker_count: parse_or(&lookup, "WORKER_COUNT", num_cpus::get())?,
            ocr: OcrConfig {
                binary: PathBuf::from(string_or(&lookup, "TESSERACT_BIN", "tesseract")),
                languages: {
                    let langs = list_or(&lookup, "OCR_LANGUAGES");
                    if langs.is_empty() {
                        vec!["eng".to_string()]
                    } else {
                        langs
                    }
                },
                dpi: parse_or(&lookup, "OCR_DPI", 300)?,
                timeout: Duration::from_secs(parse_or(&lookup, "OCR_TIMEOUT_SECS", 60)?),
            },
            translate: TranslateConfig {
                timeout: Duration::from_secs(parse_or(&lookup, "TRANSLATE_TIMEOUT_SECS", 10)?),
                retries: parse_or(&lookup, "TRANSLATE_RETRIES", 3)?,
                backoff: Duration::from_secs(parse_or(&lookup, "TRANSLATE_BACKOFF_SECS", 1)?),
            },
            pdf: PdfConfig {
                font_dir: PathBuf::from(string_or(&lookup, "FONT_DIR", "./fonts")),
                font_family: string_or(&lookup, "FONT_FAMILY", "Roboto"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Validation {
                message: "WORKER_COUNT must be at least 1".to_string(),
            });
        }
        if self.http.max_upload_bytes == 0 {
            return Err(ConfigError::Validation {
                message: "MAX_UPLOAD_BYTES must be at least 1".to_string(),
            });
        }
        if self.store.job_ttl.is_zero() || self.store.cache_ttl.is_zero() {
            return Err(ConfigError::Validation {
                message: "JOB_TTL_SECS and CACHE_TTL_SECS must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

fn string_or<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Comma-separated list; absent or empty yields an empty vec.
fn list_or<F>(lookup: &F, name: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}
