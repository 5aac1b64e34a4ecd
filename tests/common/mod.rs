//! Common test utilities and helpers
//!
//! This module provides shared fixtures for integration tests: a
//! deterministic stand-in for the wasm oracle, token material scrambled the
//! way the exchange scrambles it, and settings pointed at a local mock
//! server.

/// Test helper functions
pub mod helpers {
    use nepse_scraper::Result;
    use nepse_scraper::client::NepseClientGeneric;
    use nepse_scraper::config::Settings;
    use nepse_scraper::oracle::{OracleEntry, SaltOracle};
    use nepse_scraper::session::ApiSessionGeneric;
    use serde_json::{Value, json};

    /// Deterministic oracle that always names index 0.
    ///
    /// With every cut at 0, descrambling reduces to dropping the first
    /// character of the scrambled string, so [`scrambled`] fixtures stay
    /// readable in assertions.
    #[derive(Debug)]
    pub struct FixedOracle;

    impl SaltOracle for FixedOracle {
        fn cut_index(&self, _entry: OracleEntry, _args: [i32; 5]) -> Result<i32> {
            Ok(0)
        }
    }

    /// Scrambles a token the way the exchange would for [`FixedOracle`]:
    /// one filler character that descrambling removes.
    pub fn scrambled(token: &str) -> String {
        format!("~{token}")
    }

    /// Authentication response body carrying scrambled tokens and the test
    /// salt quintuple (100, 200, 300, 400, 500). `salt2` arrives
    /// string-encoded, as the live endpoint intermittently does.
    pub fn token_fixture(access: &str, refresh: &str) -> Value {
        json!({
            "serverTime": 1_692_854_400_000_i64,
            "accessToken": scrambled(access),
            "refreshToken": scrambled(refresh),
            "tokenType": "",
            "salt1": 100,
            "salt2": "200",
            "salt3": 300,
            "salt4": 400,
            "salt5": 500,
        })
    }

    /// Market-open status body with the given seed id.
    pub fn market_status_fixture(is_open: &str, seed: i64) -> Value {
        json!({
            "isOpen": is_open,
            "asOf": "2023-08-24T10:59:59",
            "id": seed,
        })
    }

    /// Settings pointed at a mock server, with retry pauses shrunk so the
    /// tests run in milliseconds.
    pub fn mock_settings(base_url: &str) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = base_url.to_string();
        settings.api.timeout_secs = 5;
        settings.retry.attempt_delay_ms = 10;
        settings.retry.max_attempts = Some(3);
        settings.retry.transport_retries = 3;
        settings.retry.transport_backoff_ms = 5;
        settings
    }

    /// Session over the deterministic oracle, pointed at a mock server.
    pub fn test_session(base_url: &str) -> ApiSessionGeneric<FixedOracle> {
        test_session_with(mock_settings(base_url))
    }

    /// Session built from explicit settings.
    pub fn test_session_with(settings: Settings) -> ApiSessionGeneric<FixedOracle> {
        ApiSessionGeneric::with_oracle(settings, FixedOracle).unwrap()
    }

    /// Client over the deterministic oracle, pointed at a mock server.
    pub fn test_client(base_url: &str) -> NepseClientGeneric<FixedOracle> {
        NepseClientGeneric::with_session(test_session(base_url))
    }
}
