//! Configuration — `.deobkit.toml`
//!
//! Per-project defaults for the workflow: which location/count strategies
//! to run, which identifier names to emit, and corrector settings. Every
//! field has a default, so the file is optional and may be partial.
//!
//! ```toml
//! base-mode = "minus-hex"
//! count-mode = "lines-between"
//! start-name = "startHex"
//! end-name = "endHex"
//!
//! [corrector]
//! model = "llama-3.3-70b-versatile"
//! max-tokens = 4096
//! timeout-seconds = 30
//! ```

use crate::offsets::{BaseHexMode, CountMode};
use crate::DeobResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Workflow configuration (loaded from `.deobkit.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeobConfig {
    /// How the base hex literal is located
    #[serde(default = "default_base_mode")]
    pub base_mode: BaseHexMode,

    /// How the count is measured
    #[serde(default = "default_count_mode")]
    pub count_mode: CountMode,

    /// Identifier emitted for the base value
    #[serde(default = "default_start_name")]
    pub start_name: String,

    /// Identifier emitted for the derived value
    #[serde(default = "default_end_name")]
    pub end_name: String,

    /// Corrector settings
    #[serde(default)]
    pub corrector: CorrectorConfig,
}

/// Settings for the LLM-backed corrector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CorrectorConfig {
    /// Model override (provider default otherwise)
    #[serde(default)]
    pub model: Option<String>,

    /// Endpoint override (provider default otherwise)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum tokens per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_mode() -> BaseHexMode {
    BaseHexMode::MinusHex
}
fn default_count_mode() -> CountMode {
    CountMode::LinesBetween
}
fn default_start_name() -> String {
    "startHex".to_string()
}
fn default_end_name() -> String {
    "endHex".to_string()
}
fn default_max_tokens() -> usize {
    4096
}
fn default_timeout() -> u64 {
    30
}

impl Default for DeobConfig {
    fn default() -> Self {
        Self {
            base_mode: default_base_mode(),
            count_mode: default_count_mode(),
            start_name: default_start_name(),
            end_name: default_end_name(),
            corrector: CorrectorConfig::default(),
        }
    }
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            model: None,
            endpoint: None,
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl DeobConfig {
    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> DeobResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Try `.deobkit.toml` then `deobkit.toml` under `root`, fall back
    /// to defaults when neither loads.
    pub fn from_dir(root: &Path) -> Self {
        for name in [".deobkit.toml", "deobkit.toml"] {
            let path = root.join(name);
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {} — using defaults", path.display(), e);
                }
            }
        }

        Self::default()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
