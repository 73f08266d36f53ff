//! Runtime configuration: model endpoints, timeouts, and data locations.
//!
//! Defaults are compiled in; each can be overridden through a `FACTLANE_*`
//! environment variable so deployments never need a config file.

use std::path::PathBuf;

pub const APP_NAME: &str = "Factlane";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_MODEL_BASE_URL: &str = "http://localhost:11434";
/// Small, fast multimodal model for the classification pass.
pub const DEFAULT_TRIAGE_MODEL: &str = "qwen2.5vl:7b";
/// Larger model for the schema-fill pass, where accuracy dominates.
pub const DEFAULT_EXTRACTION_MODEL: &str = "qwen2.5vl:32b";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RETRY_BUDGET: u32 = 1;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model_base_url: String,
    pub triage_model: String,
    pub extraction_model: String,
    pub request_timeout_secs: u64,
    pub retry_budget: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            triage_model: DEFAULT_TRIAGE_MODEL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl PipelineConfig {
    /// Defaults with `FACTLANE_*` environment overrides. Unparseable
    /// numeric overrides fall back to the default rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_base_url: env_or("FACTLANE_MODEL_URL", defaults.model_base_url),
            triage_model: env_or("FACTLANE_TRIAGE_MODEL", defaults.triage_model),
            extraction_model: env_or("FACTLANE_EXTRACTION_MODEL", defaults.extraction_model),
            request_timeout_secs: env_parsed(
                "FACTLANE_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            retry_budget: env_parsed("FACTLANE_RETRY_BUDGET", defaults.retry_budget),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Application data directory under the user's home.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the SQLite fact base.
pub fn factbase_path() -> PathBuf {
    app_data_dir().join("factbase.db")
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,factlane=debug".to_string()
}
