use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "SiteCert";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory.
/// Falls back to the working directory when the platform reports no home.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn database_path() -> PathBuf {
    app_data_dir().join("database").join("sitecert.db")
}

/// Default root directory for stored certification artifacts.
pub fn storage_dir() -> PathBuf {
    app_data_dir().join("storage")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "sitecert=info,warn"
}

// ═══════════════════════════════════════════════════════════
// Certification defaults
// ═══════════════════════════════════════════════════════════

pub const DEFAULT_COMPANY_NAME: &str = "Certified Building Inspections, LLC";
pub const DEFAULT_COMPANY_CONTACT: &str = "(555) 010-4400 | certifications@cbi-inspections.com";
pub const DEFAULT_BUILDING_CODE: &str = "International Building Code (IBC)";
pub const DEFAULT_CODE_YEAR: &str = "2021";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_KEY_PREFIX: &str = "certifications";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;

/// Settings consumed by the certification pipeline.
///
/// Boilerplate fields are applied to the narrative payload wherever the
/// project or its extractions leave a value missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationConfig {
    pub company_name: String,
    pub company_contact: String,
    pub building_code: String,
    pub code_year: String,
    pub model_name: String,
    pub key_prefix: String,
    pub ollama_url: String,
    pub llm_timeout_secs: u64,
}

impl Default for CertificationConfig {
    fn default() -> Self {
        Self {
            company_name: DEFAULT_COMPANY_NAME.into(),
            company_contact: DEFAULT_COMPANY_CONTACT.into(),
            building_code: DEFAULT_BUILDING_CODE.into(),
            code_year: DEFAULT_CODE_YEAR.into(),
            model_name: DEFAULT_MODEL.into(),
            key_prefix: DEFAULT_KEY_PREFIX.into(),
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl CertificationConfig {
    /// Defaults overlaid with any `SITECERT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("SITECERT_COMPANY_NAME") {
            config.company_name = v;
        }
        if let Some(v) = non_empty("SITECERT_COMPANY_CONTACT") {
            config.company_contact = v;
        }
        if let Some(v) = non_empty("SITECERT_BUILDING_CODE") {
            config.building_code = v;
        }
        if let Some(v) = non_empty("SITECERT_CODE_YEAR") {
            config.code_year = v;
        }
        if let Some(v) = non_empty("SITECERT_MODEL") {
            config.model_name = v;
        }
        if let Some(v) = non_empty("SITECERT_KEY_PREFIX") {
            config.key_prefix = v.trim_matches('/').to_string();
        }
        if let Some(v) = non_empty("SITECERT_OLLAMA_URL") {
            config.ollama_url = v;
        }
        if let Some(secs) = non_empty("SITECERT_LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.llm_timeout_secs = secs;
        }
        config
    }
}
