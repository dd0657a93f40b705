use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech recognition settings
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Pipeline scheduling and output settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Recognition model size
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    // @size: ~39M params
    Tiny,
    // @size: ~74M params
    Base,
    #[default]
    // @size: ~244M params
    Small,
    // @size: ~769M params
    Medium,
    // @size: ~1.5B params
    Large,
}

impl ModelSize {
    // @returns: ggml model filename for this size
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Tiny => "ggml-tiny.bin",
            Self::Base => "ggml-base.bin",
            Self::Small => "ggml-small.bin",
            Self::Medium => "ggml-medium.bin",
            Self::Large => "ggml-large.bin",
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ModelSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(Self::Tiny),
            "base" => Ok(Self::Base),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(anyhow!("Invalid model size: {}", s)),
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognitionConfig {
    /// Model size to load
    #[serde(default)]
    pub model_size: ModelSize,

    /// Directory holding the ggml model files
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Pin the spoken language instead of auto-detecting it
    #[serde(default)]
    pub language: Option<String>,

    /// Number of inference threads (0 = all available cores)
    #[serde(default)]
    pub threads: usize,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model_size: ModelSize::default(),
            model_dir: default_model_dir(),
            language: None,
            threads: 0,
        }
    }
}

impl RecognitionConfig {
    /// Full path to the configured model file
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(self.model_size.filename())
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Whether segment texts are translated before serialization
    #[serde(default)]
    pub enabled: bool,

    /// Target language code (ISO 639-1 or 639-3)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name to request from the service
    #[serde(default = "default_translation_model")]
    pub model: String,

    /// Maximum subtitle characters per request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds, doubled on each retry)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_language: default_target_language(),
            endpoint: default_endpoint(),
            model: default_translation_model(),
            max_chars_per_request: default_max_chars_per_request(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Pipeline scheduling and output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Maximum number of videos processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Whole-job deadline in seconds (None = no deadline)
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,

    /// Reject overlapping segment timings instead of tolerating them
    #[serde(default)]
    pub strict_overlaps: bool,

    /// libass style options passed to the muxing filter
    #[serde(default = "default_mux_style")]
    pub mux_style: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            job_timeout_secs: None,
            strict_overlaps: false,
            mux_style: default_mux_style(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_translation_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_max_chars_per_request() -> usize {
    4000
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_concurrency() -> usize {
    1
}

fn default_mux_style() -> String {
    "OutlineColour=&H40000000,BorderStyle=3".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.translation.enabled {
            let _target_name =
                crate::language_utils::get_language_name(&self.translation.target_language)?;

            if self.translation.endpoint.trim().is_empty() {
                return Err(anyhow!("Translation endpoint must not be empty"));
            }
            if self.translation.max_chars_per_request < 100 {
                return Err(anyhow!(
                    "max_chars_per_request must be at least 100, got {}",
                    self.translation.max_chars_per_request
                ));
            }
        }

        if let Some(language) = &self.recognition.language {
            let _pinned_name = crate::language_utils::get_language_name(language)?;
        }

        if self.pipeline.concurrency == 0 {
            return Err(anyhow!("Pipeline concurrency must be at least 1"));
        }

        if self.pipeline.job_timeout_secs == Some(0) {
            return Err(anyhow!("Job timeout must be positive when set"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            recognition: RecognitionConfig::default(),
            translation: TranslationConfig::default(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
