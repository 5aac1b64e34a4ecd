//! # Authenticated Session Module
//!
//! This module provides the authenticated session layer for the NEPSE web
//! API. It handles credential lifecycle, payload identifier derivation, and
//! the two retry layers every request passes through.
//!
//! ## Architecture
//!
//! The session module is built around the [`ApiSession`] which orchestrates:
//! - Lazy authentication and token descrambling
//! - Market seed caching for payload identifier computation
//! - Transport-level retries for transient upstream failures
//! - Application-level retries for whole logical operations
//!
//! ## Examples
//!
//! ```rust,no_run
//! use nepse_scraper::config::Settings;
//! use nepse_scraper::session::ApiSession;
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let session = ApiSession::new(settings)?;
//!
//! let status = session.market_status().await?;
//! println!("market open: {}", status.open());
//! # Ok::<(), nepse_scraper::Error>(())
//! # });
//! ```
//!
//! ## Caching Strategy
//!
//! Authentication happens on first use, never eagerly. The descrambled
//! credential and the market seed are cached behind async locks held across
//! the wire call, so concurrent callers share one authentication instead of
//! racing several. `401`/`403` answers drop the credential cache so the next
//! application-level attempt authenticates from scratch.

use std::sync::Arc;

use reqwest::{
    Client, Method, Response, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::Settings,
    endpoints,
    error::Error,
    oracle::{SaltOracle, WasmOracle},
    types::{DescrambledCredential, MarketStatus, PayloadCategory, RawTokenResponse},
};

use super::descrambler::TokenDescrambler;
use super::payload;
use super::retry::{RetryPolicy, TRANSPORT_RETRY_STATUSES, transport_backoff};

/// Convenience type alias for ApiSession backed by the wasm oracle
pub type ApiSession = ApiSessionGeneric<WasmOracle>;

/// Authenticated session against the exchange API
#[derive(Debug)]
pub struct ApiSessionGeneric<O: SaltOracle = WasmOracle> {
    /// Configuration settings
    settings: Arc<Settings>,
    /// HTTP client for requests
    http: Client,
    /// Token descrambler over the salt index oracle
    descrambler: TokenDescrambler<O>,
    /// Application-level retry policy
    retry: RetryPolicy,
    /// Cached descrambled credential, populated on first use
    credential: Mutex<Option<DescrambledCredential>>,
    /// Cached market seed for payload identifier computation
    market_seed: Mutex<Option<i64>>,
}

impl ApiSessionGeneric<WasmOracle> {
    /// Creates a session backed by the wasm oracle module named in the
    /// configuration.
    ///
    /// The oracle module is loaded and bound eagerly so a missing or broken
    /// module file fails here, not on the first request. No network traffic
    /// happens until the first operation.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use nepse_scraper::config::Settings;
    /// use nepse_scraper::session::ApiSession;
    ///
    /// let settings = Settings::default();
    /// let session = ApiSession::new(settings)?;
    /// # Ok::<(), nepse_scraper::Error>(())
    /// ```
    pub fn new(settings: Settings) -> Result<Self> {
        let oracle = WasmOracle::from_file(&settings.oracle.module_path)?;
        Self::with_oracle(settings, oracle)
    }
}

impl<O: SaltOracle> ApiSessionGeneric<O> {
    /// Creates a session over a caller-provided oracle implementation.
    pub fn with_oracle(settings: Settings, oracle: O) -> Result<Self> {
        if !settings.api.verify_tls {
            warn!("TLS certificate verification is disabled");
        }

        let http = Client::builder()
            .user_agent(settings.api.user_agent.clone())
            .default_headers(Self::default_headers(&settings)?)
            .timeout(settings.api.timeout())
            .danger_accept_invalid_certs(!settings.api.verify_tls)
            .build()
            .map_err(|err| Error::config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            retry: RetryPolicy::from_settings(&settings.retry),
            settings: Arc::new(settings),
            http,
            descrambler: TokenDescrambler::new(oracle),
            credential: Mutex::new(None),
            market_seed: Mutex::new(None),
        })
    }

    /// Settings this session was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Authenticated GET returning the parsed response body.
    ///
    /// Runs under the application-level retry policy; each attempt covers
    /// authentication, the exchange call, the status check, and body
    /// parsing as one logical operation.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.retry.run(|| self.get_once(path, params)).await
    }

    /// Authenticated POST returning the parsed response body.
    ///
    /// When `body` is `None` the computed payload identifier is sent as
    /// `{"id": <payload id>}`, which is what the web front end does for
    /// these endpoints. An explicit `body` is sent as-is.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: Option<serde_json::Value>,
        category: PayloadCategory,
    ) -> Result<T> {
        self.retry
            .run(|| self.post_once(path, params, body.as_ref(), category))
            .await
    }

    /// Current market status straight from the exchange, bypassing the
    /// seed cache.
    pub async fn market_status(&self) -> Result<MarketStatus> {
        self.retry.run(|| self.fetch_market_status()).await
    }

    /// The cached credential, authenticating on first use.
    ///
    /// The slot lock is held across the wire call so concurrent callers
    /// share one authentication instead of racing several.
    pub async fn credential(&self) -> Result<DescrambledCredential> {
        let mut slot = self.credential.lock().await;
        if let Some(credential) = slot.as_ref() {
            return Ok(credential.clone());
        }
        let credential = self.authenticate().await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Payload identifier for the given category, derived from the cached
    /// market seed and the salts of the active credential.
    pub async fn payload_id(&self, category: PayloadCategory) -> Result<i64> {
        let credential = self.credential().await?;
        let seed = self.market_seed().await?;
        payload::compute(seed, credential.salts, category)
    }

    /// Drops the cached credential and market seed. The next operation
    /// authenticates from scratch.
    pub async fn invalidate(&self) {
        *self.credential.lock().await = None;
        *self.market_seed.lock().await = None;
        debug!("session caches invalidated");
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let token = self.access_token().await?;
        debug!(path, "GET");
        let response = self
            .send(Method::GET, path, params, None, Some(&token))
            .await?;
        self.expect_json(response, path).await
    }

    async fn post_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: Option<&serde_json::Value>,
        category: PayloadCategory,
    ) -> Result<T> {
        let token = self.access_token().await?;
        let payload = match body {
            Some(body) => body.clone(),
            None => {
                let id = match self.payload_id(category).await {
                    Ok(id) => id,
                    Err(err @ Error::SeedOutOfRange { .. }) => {
                        // Stale or corrupt seed; refetch on the next attempt.
                        *self.market_seed.lock().await = None;
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                };
                json!({ "id": id })
            }
        };
        debug!(path, %category, "POST");
        let response = self
            .send(Method::POST, path, params, Some(&payload), Some(&token))
            .await?;
        self.expect_json(response, path).await
    }

    async fn authenticate(&self) -> Result<DescrambledCredential> {
        info!("no cached credential, authenticating");
        let response = self
            .send(Method::GET, endpoints::AUTHENTICATE, &[], None, None)
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::authentication(format!(
                "token endpoint answered {status}"
            )));
        }
        let raw: RawTokenResponse = response
            .json()
            .await
            .map_err(|err| Error::authentication(format!("malformed token response: {err}")))?;
        let credential = self.descrambler.descramble(&raw)?;
        debug!(issued_at = %credential.issued_at, "credential descrambled");
        Ok(credential)
    }

    /// Access token of the cached credential, authenticating on first use.
    async fn access_token(&self) -> Result<String> {
        Ok(self.credential().await?.access_token)
    }

    /// Market seed for payload computation, fetched once and cached.
    async fn market_seed(&self) -> Result<i64> {
        let mut slot = self.market_seed.lock().await;
        if let Some(seed) = *slot {
            return Ok(seed);
        }
        let status = self.fetch_market_status().await?;
        debug!(seed = status.id, "market seed cached");
        *slot = Some(status.id);
        Ok(status.id)
    }

    async fn fetch_market_status(&self) -> Result<MarketStatus> {
        let token = self.access_token().await?;
        let response = self
            .send(Method::GET, endpoints::MARKET_OPEN, &[], None, Some(&token))
            .await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Only the credential slot; the caller may hold the seed lock.
            *self.credential.lock().await = None;
        }
        if status != StatusCode::OK {
            return Err(Error::seed_fetch(format!(
                "status endpoint answered {status}"
            )));
        }
        response
            .json::<MarketStatus>()
            .await
            .map_err(|err| Error::seed_fetch(format!("malformed status response: {err}")))
    }

    /// One transport-level exchange.
    ///
    /// Transient upstream failures (gateway 5xx answers, timeouts,
    /// connection resets) are absorbed here with exponential backoff before
    /// the application policy ever sees them.
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<Response> {
        let url = self.url(path);
        let max = self.settings.retry.transport_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let mut request = self.http.request(method.clone(), &url);
            if !params.is_empty() {
                request = request.query(params);
            }
            if let Some(token) = bearer {
                request = request.header(header::AUTHORIZATION, format!("Salter {token}"));
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if TRANSPORT_RETRY_STATUSES.contains(&status) && attempt <= max {
                        let pause =
                            transport_backoff(self.settings.retry.transport_backoff(), attempt);
                        warn!(status, attempt, "transient upstream status, backing off");
                        tokio::time::sleep(pause).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) if (err.is_timeout() || err.is_connect()) && attempt <= max => {
                    let pause = transport_backoff(self.settings.retry.transport_backoff(), attempt);
                    warn!(error = %err, attempt, "transport error, backing off");
                    tokio::time::sleep(pause).await;
                }
                Err(err) => return Err(Error::from_transport(err)),
            }
        }
    }

    async fn expect_json<T: DeserializeOwned>(&self, response: Response, path: &str) -> Result<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Token likely aged out; the next attempt re-authenticates.
            self.invalidate().await;
        }
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        let text = response.text().await.map_err(Error::from_transport)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api.base(), path)
    }

    fn default_headers(settings: &Settings) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        let referer = format!("{}/", settings.api.base());
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(&referer).map_err(|err| {
                Error::config(format!("base URL unusable as Referer header: {err}"))
            })?,
        );
        Ok(headers)
    }
}
