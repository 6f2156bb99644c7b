//! Coach configuration
//!
//! All tunable settings are gathered into one value that is constructed once
//! in `main` and passed down explicitly. Nothing below the CLI layer reads
//! the process environment, so the pipeline can be driven entirely by
//! injected fixtures in tests.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "coach.yml";

/// Configuration for the coaching pipeline.
///
/// Every field has a default; a `coach.yml` in the working directory can
/// override any subset of them. The API key is never read from the file,
/// only from the environment (`OPENAI_API_KEY`, optionally via `.env`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Model identifier sent to the completion service
    pub model: String,
    /// Maximum completion length in tokens
    pub max_tokens: u32,
    /// Sampling temperature for generation
    pub temperature: f32,
    /// API key for the completion service (environment only)
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Root of the knowledge base (raw and cleaned corpus live underneath)
    pub kb_dir: PathBuf,
    /// Directory that receives generated blueprint packages
    pub output_dir: PathBuf,
    /// Path of the persisted batch results document
    pub results_path: PathBuf,
    /// Hard deadline for the compile-check phase, in seconds
    pub check_timeout_secs: u64,
    /// Hard deadline for the test phase, in seconds
    pub test_timeout_secs: u64,
    /// Default retry budget for a request
    pub max_retries: u32,
    /// Toolchain binary invoked for check and test phases
    pub cargo_bin: String,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
            api_key: None,
            kb_dir: PathBuf::from("kb"),
            output_dir: PathBuf::from("output"),
            results_path: PathBuf::from("results.json"),
            check_timeout_secs: 60,
            test_timeout_secs: 120,
            max_retries: 1,
            cargo_bin: "cargo".to_string(),
        }
    }
}

impl CoachConfig {
    /// Loads configuration from `coach.yml` (if present) and the environment.
    ///
    /// A `.env` file in the working directory is honored for the API key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid config file: {}", config_path.display()))?
        } else {
            CoachConfig::default()
        };

        config.api_key = std::env::var("OPENAI_API_KEY").ok();
        Ok(config)
    }

    /// Directory holding the cleaned context corpus.
    pub fn cleaned_dir(&self) -> PathBuf {
        self.kb_dir.join("cleaned")
    }

    /// Directory holding raw harvested documents.
    pub fn raw_dir(&self) -> PathBuf {
        self.kb_dir.join("raw")
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }
}
