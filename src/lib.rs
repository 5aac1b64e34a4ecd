//! NEPSE Scraper - Rust Implementation
//!
//! A client for the Nepal Stock Exchange (NEPSE) web API. The exchange
//! protects its REST endpoints behind scrambled tokens and per-request
//! payload identifiers; this library reverses both layers and exposes the
//! market data endpoints behind a typed async client.
//!
//! # Architecture
//!
//! Requests flow through three layers:
//! - **Client** ([`NepseClient`]): one typed wrapper per endpoint, with
//!   caller-input validation
//! - **Session** ([`session::ApiSession`]): lazy authentication, token
//!   descrambling via the opaque wasm salt oracle, payload identifier
//!   computation, and both retry layers
//! - **Oracle** ([`oracle::WasmOracle`]): the exchange's pre-compiled wasm
//!   module executed through a five-entry-point calling contract
//!
//! # Usage
//!
//! The wasm module shipped with the exchange front end must be available on
//! disk (`oracle.module_path` in the configuration, `nepse.wasm` by
//! default). One-shot fetches are also available from the command line:
//!
//! ```bash
//! nepse-fetch --wasm nepse.wasm market-summary
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use nepse_scraper::{NepseClient, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = NepseClient::new(Settings::default())?;
//! let summary = client.market_summary().await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod oracle;
pub mod session;
pub mod types;

pub use client::{NepseClient, NepseClientGeneric};
pub use config::Settings;
pub use error::{Error, Result, ValidationError};
pub use session::ApiSession;
pub use types::{BrokerQuery, MarketStatus, PayloadCategory, TopListCategory};
