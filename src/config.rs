//! Layered application configuration
//!
//! Sources, lowest precedence first: built-in defaults, `config/default.toml`,
//! `config/local.toml`, then `CONTRACT_INTEL__SECTION__KEY` environment variables.
//! A `.env` file is loaded into the environment before the layers are read.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "CONTRACT_INTEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub labeler: LabelerConfig,
    pub extractor: ExtractorConfig,
    pub reporting: ReportingConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and validate configuration from all layers
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name("config/local").required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.label_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "analysis.label_concurrency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.analysis.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "analysis.min_confidence must be within [0, 1], got {}",
                self.analysis.min_confidence
            )));
        }
        if self.analysis.default_contract_value < 0.0 {
            return Err(ConfigError::Invalid(
                "analysis.default_contract_value cannot be negative".to_string(),
            ));
        }
        if self.reporting.lines_per_page == 0 {
            return Err(ConfigError::Invalid(
                "reporting.lines_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, uploads included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8001 }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }
fn default_true() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            cors_permissive: default_true(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Contract value used when the caller supplies none
    #[serde(default = "default_contract_value")]
    pub default_contract_value: f64,

    /// Scorer confidence threshold
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Optional floor applied by the risk filter
    #[serde(default)]
    pub risk_filter_floor: Option<f64>,

    /// Clauses labeled concurrently per analysis
    #[serde(default = "default_label_concurrency")]
    pub label_concurrency: usize,
}

fn default_contract_value() -> f64 { 10_000.0 }
fn default_min_confidence() -> f64 { 0.5 }
fn default_label_concurrency() -> usize { 4 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_contract_value: default_contract_value(),
            min_confidence: default_min_confidence(),
            risk_filter_floor: None,
            label_concurrency: default_label_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelerProvider {
    Keyword,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelerConfig {
    #[serde(default = "default_provider")]
    pub provider: LabelerProvider,

    /// Zero-shot classification endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_labeler_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Zero disables the prediction cache
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,

    #[serde(default = "default_breaker_failures")]
    pub circuit_breaker_failures: usize,

    #[serde(default = "default_breaker_reset")]
    pub circuit_breaker_reset_secs: u64,
}

fn default_provider() -> LabelerProvider { LabelerProvider::Keyword }
fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli".to_string()
}
fn default_labeler_timeout_ms() -> u64 { 30_000 }
fn default_retry_attempts() -> usize { 2 }
fn default_retry_backoff_ms() -> u64 { 200 }
fn default_cache_ttl() -> u64 { 600 }
fn default_cache_max_entries() -> u64 { 10_000 }
fn default_breaker_failures() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_ms: default_labeler_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
            circuit_breaker_failures: default_breaker_failures(),
            circuit_breaker_reset_secs: default_breaker_reset(),
        }
    }
}

impl LabelerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn breaker_reset_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// OCR service URL; non-text uploads are rejected when unset
    #[serde(default)]
    pub ocr_url: Option<String>,

    #[serde(default = "default_extractor_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_extractor_timeout_ms() -> u64 { 60_000 }

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ocr_url: None,
            timeout_ms: default_extractor_timeout_ms(),
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,

    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,
}

fn default_output_dir() -> PathBuf { PathBuf::from("reports") }
fn default_lines_per_page() -> usize { 56 }

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ReportFormat::default(),
            lines_per_page: default_lines_per_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret; a random one is generated at startup when unset
    #[serde(default)]
    pub token_secret: Option<SecretString>,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl() -> u64 { 86_400 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_secs: default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8001");
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.analysis.default_contract_value, 10_000.0);
        assert_eq!(config.analysis.min_confidence, 0.5);
        assert_eq!(config.labeler.provider, LabelerProvider::Keyword);
        assert_eq!(config.labeler.retry_backoff(), Duration::from_millis(200));
        assert_eq!(config.reporting.lines_per_page, 56);
        assert!(config.auth.token_secret.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.analysis.label_concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.analysis.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.analysis.default_contract_value = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.reporting.lines_per_page = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(
                "[server]\nport = 9000\n\n[labeler]\nprovider = \"http\"\n",
                ::config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.labeler.provider, LabelerProvider::Http);
        assert_eq!(config.labeler.retry_attempts, 2);
        assert_eq!(config.logging.level, "info");
    }
}
