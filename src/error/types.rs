//! Error type definitions
//!
//! Defines the main error types used throughout the NEPSE client.

use thiserror::Error;

/// Main error type for the NEPSE client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The opaque token-index module could not be loaded or its entry
    /// points are missing. Fatal: no request can ever proceed without it.
    #[error("Oracle binding error: {0}")]
    OracleBinding(String),

    /// A bound oracle entry point failed at call time
    #[error("Oracle call error: {0}")]
    Oracle(String),

    /// Authentication call failed or returned malformed tokens/salts
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The market status call backing the payload seed failed
    #[error("Seed fetch error: {0}")]
    SeedFetch(String),

    /// Upstream reported a market seed outside the lookup table
    #[error("market seed {seed} outside lookup table range 0..{table_len}")]
    SeedOutOfRange { seed: i64, table_len: usize },

    /// An endpoint answered with a non-200 status
    #[error("unexpected status {status} from {path}")]
    UnexpectedStatus { status: u16, path: String },

    /// Caller-supplied parameters failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// TLS certificate verification failed. The exchange serves an
    /// incomplete certificate chain in some deployments.
    #[error(
        "TLS certificate error: {0}; if the exchange's certificate chain is \
         incomplete in your region, set `verify_tls = false` (or pass \
         --insecure) to skip verification"
    )]
    TlsCertificate(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date/time parsing errors
    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

/// Validation failures for caller-supplied parameters. These are rejected
/// before any network call and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Sector index id outside the exchange's documented range
    #[error("index id {value} is not a sector index, expected {min}..={max}")]
    IndexIdOutOfRange { value: i64, min: i64, max: i64 },

    /// Trading-average day window outside the supported range
    #[error("day window {value} outside supported range {min}..={max}")]
    DayWindowOutOfRange { value: u32, min: u32, max: u32 },

    /// Empty ticker symbol
    #[error("ticker symbol must not be empty")]
    EmptySymbol,

    /// Ticker symbol absent from the exchange's security list
    #[error("ticker symbol '{symbol}' is not listed on the exchange")]
    UnknownSymbol { symbol: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an oracle binding error
    pub fn oracle_binding(msg: impl Into<String>) -> Self {
        Self::OracleBinding(msg.into())
    }

    /// Create an oracle call error
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a seed fetch error
    pub fn seed_fetch(msg: impl Into<String>) -> Self {
        Self::SeedFetch(msg.into())
    }

    /// Classify a transport failure, separating certificate problems from
    /// generic network errors so the TLS guidance reaches the caller.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(inner) = cause {
            let text = inner.to_string();
            if text.contains("certificate") || text.contains("Certificate") {
                return Self::TlsCertificate(err.to_string());
            }
            cause = inner.source();
        }
        Self::Network(err)
    }

    /// Whether the fixed-delay retry loop should try the operation again.
    ///
    /// Caller-input, configuration, and certificate problems recur on every
    /// attempt; everything transient or upstream-dependent stays retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_)
                | Self::OracleBinding(_)
                | Self::Validation(_)
                | Self::TlsCertificate(_)
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test config error");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: test config error");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_oracle_binding_error() {
        let err = Error::oracle_binding("missing export 'cdx'");
        assert!(matches!(err, Error::OracleBinding(_)));
        assert!(err.to_string().contains("Oracle binding error"));
    }

    #[test]
    fn test_authentication_error() {
        let err = Error::authentication("token endpoint returned 401");
        assert!(matches!(err, Error::Authentication(_)));
        assert!(err.to_string().contains("Authentication error"));
    }

    #[test]
    fn test_seed_out_of_range_display() {
        let err = Error::SeedOutOfRange {
            seed: 104,
            table_len: 100,
        };
        assert_eq!(
            err.to_string(),
            "market seed 104 outside lookup table range 0..100"
        );
    }

    #[test]
    fn test_unexpected_status_display() {
        let err = Error::UnexpectedStatus {
            status: 502,
            path: "/api/nots/market-summary".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("/api/nots/market-summary"));
    }

    #[test]
    fn test_validation_error_display() {
        let err: Error = ValidationError::IndexIdOutOfRange {
            value: 70,
            min: 51,
            max: 67,
        }
        .into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "index id 70 is not a sector index, expected 51..=67"
        );
    }

    #[test]
    fn test_tls_error_carries_guidance() {
        let err = Error::TlsCertificate("unknown issuer".to_string());
        assert!(err.to_string().contains("verify_tls = false"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::authentication("401").is_retryable());
        assert!(Error::seed_fetch("timeout").is_retryable());
        assert!(
            Error::UnexpectedStatus {
                status: 404,
                path: "/x".into()
            }
            .is_retryable()
        );
        assert!(
            Error::SeedOutOfRange {
                seed: 100,
                table_len: 100
            }
            .is_retryable()
        );
        assert!(Error::oracle("trap: unreachable").is_retryable());

        assert!(!Error::config("bad url").is_retryable());
        assert!(!Error::oracle_binding("no module").is_retryable());
        assert!(!Error::TlsCertificate("unknown issuer".into()).is_retryable());
        assert!(!Error::from(ValidationError::EmptySymbol).is_retryable());
    }

    #[test]
    fn test_date_parse_error() {
        let date_err = chrono::DateTime::parse_from_rfc3339("invalid date");
        assert!(date_err.is_err());

        let err: Error = date_err.unwrap_err().into();
        assert!(matches!(err, Error::DateParse(_)));
    }
}
