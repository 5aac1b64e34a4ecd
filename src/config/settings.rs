//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the NEPSE client.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser User-Agent the exchange's anti-automation layer accepts.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0";

/// Main configuration settings for the NEPSE client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exchange API configuration
    pub api: ApiSettings,
    /// Token-index oracle configuration
    pub oracle: OracleSettings,
    /// Retry behavior of both retry layers
    pub retry: RetrySettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Exchange API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the exchange API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Verify the upstream TLS certificate chain. The exchange serves an
    /// incomplete chain in some regions; disabling this is the documented
    /// workaround.
    pub verify_tls: bool,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Token-index oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Filesystem path of the opaque token-index wasm module
    pub module_path: PathBuf,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Fixed delay between application-level attempts, in milliseconds
    pub attempt_delay_ms: u64,
    /// Bound on application-level attempts; unbounded when absent
    pub max_attempts: Option<u32>,
    /// Overall application-level deadline in milliseconds; unbounded when
    /// absent
    pub deadline_ms: Option<u64>,
    /// Transport-level retries for transient 5xx answers
    pub transport_retries: u32,
    /// Transport backoff base, in milliseconds
    pub transport_backoff_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.nepalstock.com".to_string(),
            timeout_secs: 30,
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from("nepse.wasm"),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempt_delay_ms: 3000,
            max_attempts: None,
            deadline_ms: None,
            transport_retries: 3,
            transport_backoff_ms: 1000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl ApiSettings {
    /// Base URL without a trailing slash, ready for path concatenation
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetrySettings {
    /// Fixed application-level delay as a [`Duration`]
    pub fn attempt_delay(&self) -> Duration {
        Duration::from_millis(self.attempt_delay_ms)
    }

    /// Transport backoff base as a [`Duration`]
    pub fn transport_backoff(&self) -> Duration {
        Duration::from_millis(self.transport_backoff_ms)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables on top of the defaults
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            crate::Error::Config(format!(
                "invalid configuration file {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Apply `NEPSE_*` environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(base_url) = std::env::var("NEPSE_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("NEPSE_TIMEOUT_SECS") {
            self.api.timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid timeout: {}", e)))?;
        }

        if let Ok(verify) = std::env::var("NEPSE_VERIFY_TLS") {
            self.api.verify_tls = verify
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid verify_tls: {}", e)))?;
        }

        if let Ok(user_agent) = std::env::var("NEPSE_USER_AGENT") {
            self.api.user_agent = user_agent;
        }

        if let Ok(path) = std::env::var("NEPSE_WASM_PATH") {
            self.oracle.module_path = PathBuf::from(path);
        }

        if let Ok(delay) = std::env::var("NEPSE_RETRY_DELAY_MS") {
            self.retry.attempt_delay_ms = delay
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid retry delay: {}", e)))?;
        }

        if let Ok(max) = std::env::var("NEPSE_MAX_ATTEMPTS") {
            self.retry.max_attempts = Some(
                max.parse()
                    .map_err(|e| crate::Error::Config(format!("Invalid max attempts: {}", e)))?,
            );
        }

        if let Ok(level) = std::env::var("NEPSE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Validate the merged configuration
    pub fn validate(&self) -> crate::Result<()> {
        let url = url::Url::parse(&self.api.base_url)
            .map_err(|e| crate::Error::Config(format!("Invalid base URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(crate::Error::Config(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.oracle.module_path.as_os_str().is_empty() {
            return Err(crate::Error::Config(
                "oracle module_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
