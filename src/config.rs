//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines constants for
//! validation ranges, baseline defaults, risk-scoring thresholds, HTTP cache
//! headers, and default paths. `AppConfig` is the root configuration struct
//! containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Reading Validation Ranges
// =============================================================================

/// Accepted heart rate range in BPM
pub const HEART_RATE_RANGE: (f64, f64) = (40.0, 200.0);

/// Accepted heart rate variability range in ms
pub const HRV_RANGE: (f64, f64) = (0.0, 200.0);

/// Accepted stress level range (percentage scale)
pub const STRESS_RANGE: (f64, f64) = (0.0, 100.0);

/// Accepted fatigue level range (percentage scale)
pub const FATIGUE_RANGE: (f64, f64) = (0.0, 100.0);

/// Confidence derating factor for an out-of-range heart rate
pub const HEART_RATE_DERATE: f64 = 0.7;

/// Confidence derating factor for the remaining vital checks
pub const VITAL_DERATE: f64 = 0.8;

// =============================================================================
// Baseline Defaults
// =============================================================================
// Applied when an astronaut has fewer than MIN_BASELINE_SAMPLES readings in
// the trailing window. Values are population-typical resting figures.

/// Minimum samples before a personal baseline is computed
pub const MIN_BASELINE_SAMPLES: usize = 5;

/// Trailing window for baseline computation, in days
pub const BASELINE_WINDOW_DAYS: i64 = 7;

pub const DEFAULT_HR_BASELINE: f64 = 70.0;
pub const DEFAULT_HR_STD: f64 = 10.0;
pub const DEFAULT_HRV_BASELINE: f64 = 50.0;
pub const DEFAULT_HRV_STD: f64 = 15.0;
pub const DEFAULT_STRESS_BASELINE: f64 = 30.0;
pub const DEFAULT_FATIGUE_BASELINE: f64 = 25.0;

// =============================================================================
// Risk Scoring Thresholds
// =============================================================================
// Point values are hand-tuned heuristics, not derived from a statistical
// model.

/// Deviation (in baseline standard deviations) that triggers a risk factor
pub const SIGMA_TRIGGER: f64 = 2.0;

/// Deviation at which a factor escalates from moderate to high
pub const SIGMA_HIGH: f64 = 3.0;

/// Floor applied to baseline standard deviation before dividing
pub const SIGMA_FLOOR: f64 = 1.0;

/// Heart-rate deviation points (moderate, high)
pub const HR_POINTS: (i64, i64) = (20, 35);

/// HRV deviation points (flat)
pub const HRV_POINTS: i64 = 15;

/// Stress thresholds (trigger, high) on the 0-100 scale
pub const STRESS_THRESHOLDS: (f64, f64) = (70.0, 85.0);

/// Stress points (moderate, high)
pub const STRESS_POINTS: (i64, i64) = (20, 30);

/// Fatigue thresholds (trigger, high) on the 0-100 scale
pub const FATIGUE_THRESHOLDS: (f64, f64) = (65.0, 80.0);

/// Fatigue points (moderate, high)
pub const FATIGUE_POINTS: (i64, i64) = (15, 25);

/// Score multiplier applied during high-exertion mission phases, where
/// elevated vitals are expected
pub const PHASE_DISCOUNT: f64 = 0.8;

/// Mission phases that receive the exertion discount
pub const DISCOUNTED_PHASES: [&str; 2] = ["eva", "high-load"];

/// Maximum risk score after clamping
pub const RISK_SCORE_CEILING: i64 = 100;

/// Escalation tier thresholds: scores at or above each value map to tiers 1-3
pub const ESCALATION_THRESHOLDS: [i64; 3] = [30, 55, 80];

/// Maximum recommendations returned per analysis
pub const RECOMMENDATION_CAP: usize = 4;

/// Escalation level at or above which an alert row is written
pub const ALERT_ESCALATION_LEVEL: u8 = 2;

// =============================================================================
// Chat Session Constants
// =============================================================================

/// Rows fetched per session when building conversational context
pub const CHAT_WINDOW_FETCH: i64 = 20;

/// Most recent exchanges inlined into the system prompt
pub const CHAT_WINDOW_INLINE: usize = 6;

/// Default history page size
pub const CHAT_HISTORY_LIMIT: i64 = 50;

// =============================================================================
// Listing Limits
// =============================================================================

/// Maximum readings fetched for a timeline or baseline window
pub const READING_FETCH_LIMIT: i64 = 1000;

/// Maximum facial analysis records per history request
pub const FACIAL_HISTORY_LIMIT: i64 = 50;

/// Maximum alerts returned per listing
pub const ALERT_LIST_LIMIT: i64 = 50;

/// Placeholder roster returned before any telemetry exists
pub const PLACEHOLDER_ASTRONAUTS: [&str; 3] = ["AST-001", "AST-002", "AST-003"];

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// Telemetry reads tolerate a few seconds of staleness; everything touching
// credentials or conversation state must never be cached.

/// Max-age for read-only telemetry endpoints (latest, timeline, dashboard)
pub const HTTP_CACHE_READ_MAX_AGE: u32 = 5;

pub const CACHE_CONTROL_READ: &str = formatcp!("private, max-age={}", HTTP_CACHE_READ_MAX_AGE);

pub const CACHE_CONTROL_NONE: &str = "no-store";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "astracare=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Environment variable consulted when [auth].secret is not configured
pub const JWT_SECRET_ENV: &str = "ASTRACARE_JWT_SECRET";

/// Environment variable consulted when [llm].api_key is not configured
pub const LLM_API_KEY_ENV: &str = "ASTRACARE_LLM_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Bearer-token authentication settings
    pub auth: AuthConfig,
    /// LLM completion provider settings
    pub llm: LlmConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub tls: TlsConfig,
}

/// TLS mode for the HTTP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain HTTP (development or behind a reverse proxy)
    #[default]
    None,
    /// User-provided certificate files
    Manual,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TlsConfig {
    #[serde(default)]
    pub mode: TlsMode,
    /// Certificate chain path (manual mode)
    pub cert_path: Option<String>,
    /// Private key path (manual mode)
    pub key_path: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://astracare.db`
    pub url: String,
    /// Connection pool size
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }
}

/// Bearer-token authentication settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Falls back to the ASTRACARE_JWT_SECRET
    /// environment variable when unset.
    secret: Option<String>,
    /// Token lifetime in hours
    #[serde(default = "AuthConfig::default_token_lifetime")]
    pub token_lifetime_hours: i64,
}

impl AuthConfig {
    fn default_token_lifetime() -> i64 {
        24
    }

    /// Resolve the signing secret from config or environment.
    pub fn resolve_secret(&self) -> Result<String, ConfigError> {
        if let Some(secret) = &self.secret {
            return Ok(secret.clone());
        }
        std::env::var(JWT_SECRET_ENV).map_err(|_| {
            ConfigError::Validation(format!(
                "No JWT secret configured. Set [auth].secret or {}",
                JWT_SECRET_ENV
            ))
        })
    }

    /// Construct directly from a secret, bypassing file loading.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: Some(secret.to_string()),
            token_lifetime_hours: Self::default_token_lifetime(),
        }
    }
}

/// LLM completion provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without the trailing
    /// `/chat/completions` segment
    pub base_url: String,
    /// API key. Falls back to the ASTRACARE_LLM_KEY environment variable
    /// when unset.
    api_key: Option<String>,
    /// Model identifier passed to the provider
    #[serde(default = "LlmConfig::default_model")]
    pub model: String,
    /// Completion token budget
    #[serde(default = "LlmConfig::default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "LlmConfig::default_temperature")]
    pub temperature: f64,
    /// Request timeout in seconds
    #[serde(default = "LlmConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl LlmConfig {
    fn default_model() -> String {
        "gpt-4o".to_string()
    }

    fn default_max_tokens() -> u32 {
        1024
    }

    fn default_temperature() -> f64 {
        0.7
    }

    fn default_request_timeout() -> u64 {
        30
    }

    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        std::env::var(LLM_API_KEY_ENV).map_err(|_| {
            ConfigError::Validation(format!(
                "No LLM API key configured. Set [llm].api_key or {}",
                LLM_API_KEY_ENV
            ))
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;

        if config.http.tls.mode == TlsMode::Manual
            && (config.http.tls.cert_path.is_none() || config.http.tls.key_path.is_none())
        {
            return Err(ConfigError::Validation(
                "TLS mode 'manual' requires cert_path and key_path".to_string(),
            ));
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml = r#"
            [http]
            host = "127.0.0.1"
            port = 8001

            [database]
            url = "sqlite::memory:"

            [auth]
            secret = "test-secret"

            [llm]
            base_url = "https://api.example.com/v1"
            api_key = "key"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.http.port, 8001);
        assert_eq!(config.http.tls.mode, TlsMode::None);
        assert_eq!(config.auth.token_lifetime_hours, 24);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn manual_tls_requires_cert_paths() {
        let toml = r#"
            [http]
            host = "0.0.0.0"
            port = 8443
            tls = { mode = "manual" }

            [database]
            url = "sqlite://astracare.db"

            [auth]
            secret = "s"

            [llm]
            base_url = "https://api.example.com/v1"
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, toml).unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
