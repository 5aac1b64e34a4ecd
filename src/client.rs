//! High-level NEPSE client
//!
//! Thin typed wrappers over the [`ApiSession`](crate::session::ApiSession)
//! primitives, one per REST endpoint the exchange's web front end uses.
//! Caller-input validation happens here, before any network traffic; the
//! session layer below handles authentication, payload identifiers, and
//! retries.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nepse_scraper::NepseClient;
//! use nepse_scraper::config::Settings;
//!
//! # tokio_test::block_on(async {
//! let client = NepseClient::new(Settings::default())?;
//!
//! if client.is_market_open().await? {
//!     let trades = client.live_market().await?;
//!     println!("{} securities trading", trades.len());
//! }
//! # Ok::<(), nepse_scraper::Error>(())
//! # });
//! ```

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::Settings,
    endpoints,
    error::ValidationError,
    oracle::{SaltOracle, WasmOracle},
    session::ApiSessionGeneric,
    types::{BrokerQuery, MarketStatus, PayloadCategory, TopListCategory},
};

/// Convenience type alias for NepseClient backed by the wasm oracle
pub type NepseClient = NepseClientGeneric<WasmOracle>;

/// High-level client over the NEPSE web API
#[derive(Debug)]
pub struct NepseClientGeneric<O: SaltOracle = WasmOracle> {
    /// Authenticated session the wrappers delegate to
    session: ApiSessionGeneric<O>,
    /// Symbol to security id map, built once from the company list
    security_map: Mutex<Option<HashMap<String, i64>>>,
}

impl NepseClientGeneric<WasmOracle> {
    /// Creates a client backed by the wasm oracle module named in the
    /// configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self::with_session(ApiSessionGeneric::new(settings)?))
    }
}

impl<O: SaltOracle> NepseClientGeneric<O> {
    /// Creates a client over an already-built session.
    pub fn with_session(session: ApiSessionGeneric<O>) -> Self {
        Self {
            session,
            security_map: Mutex::new(None),
        }
    }

    /// The underlying session, for callers that need the raw `get`/`post`
    /// primitives or cache control.
    pub fn session(&self) -> &ApiSessionGeneric<O> {
        &self.session
    }

    /// Current market-open status.
    pub async fn market_status(&self) -> Result<MarketStatus> {
        self.session.market_status().await
    }

    /// Whether the exchange reports the market as open right now.
    pub async fn is_market_open(&self) -> Result<bool> {
        Ok(self.session.market_status().await?.open())
    }

    /// Whether today is a trading day.
    ///
    /// The status timestamp carries today's date on trading days even after
    /// the closing bell, so this stays true until midnight exchange time.
    pub async fn is_trading_day(&self) -> Result<bool> {
        let status = self.session.market_status().await?;
        match status.as_of_date()? {
            Some(date) => Ok(date == Local::now().date_naive()),
            None => Ok(false),
        }
    }

    /// Price sheet for the latest trading day, or for `business_date` when
    /// given.
    pub async fn today_price(&self, business_date: Option<NaiveDate>) -> Result<Vec<Value>> {
        let params = page_params(business_date);
        let body: Value = self
            .session
            .post(
                endpoints::TODAY_PRICE,
                &params,
                None,
                PayloadCategory::Default,
            )
            .await?;
        Ok(unwrap_field(body, "content"))
    }

    /// Live per-security trades.
    ///
    /// Returns an empty list without calling the live endpoint when the
    /// market is closed; the endpoint serves stale rows in that state.
    pub async fn live_market(&self) -> Result<Vec<Value>> {
        if !self.is_market_open().await? {
            warn!("market is closed, skipping live market call");
            return Ok(Vec::new());
        }
        self.session
            .post(endpoints::LIVE_MARKET, &[], None, PayloadCategory::StockLive)
            .await
    }

    /// Market capitalisation by date.
    pub async fn market_cap(&self) -> Result<Value> {
        self.session.get(endpoints::MARKET_CAP_BY_DATE, &[]).await
    }

    /// Per-security trading averages over a trailing window of `n_days`
    /// (1 through 180).
    pub async fn trading_average(&self, n_days: u32) -> Result<Value> {
        if !(1..=180).contains(&n_days) {
            return Err(ValidationError::DayWindowOutOfRange {
                value: n_days,
                min: 1,
                max: 180,
            }
            .into());
        }
        let params = [("nDays", n_days.to_string())];
        self.session.get(endpoints::TRADING_AVERAGE, &params).await
    }

    /// Today's market summary block.
    pub async fn market_summary(&self) -> Result<Value> {
        self.session.get(endpoints::MARKET_SUMMARY, &[]).await
    }

    /// Day-by-day market summary history.
    pub async fn market_summary_history(&self) -> Result<Value> {
        self.session
            .get(endpoints::MARKET_SUMMARY_HISTORY, &[])
            .await
    }

    /// Turnover and volume aggregated per sector.
    pub async fn sectorwise_summary(&self) -> Result<Value> {
        self.session.get(endpoints::SECTORWISE_SUMMARY, &[]).await
    }

    /// Every listed security.
    pub async fn securities(&self) -> Result<Vec<Value>> {
        self.session.get(endpoints::COMPANY_LIST, &[]).await
    }

    /// Latest company news and announcements.
    pub async fn company_disclosures(&self) -> Result<Vec<Value>> {
        let body: Value = self
            .session
            .get(endpoints::COMPANY_DISCLOSURES, &[])
            .await?;
        Ok(unwrap_field(body, "news"))
    }

    /// Full detail block for one security symbol.
    pub async fn security_detail(&self, symbol: &str) -> Result<Value> {
        let id = self.security_id(symbol).await?;
        let path = format!("{}/{id}", endpoints::SECURITY_DETAIL);
        self.session
            .post(&path, &[], None, PayloadCategory::StockLive)
            .await
    }

    /// Daily price history for one security symbol over a date range.
    pub async fn security_price_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Value> {
        let id = self.security_id(symbol).await?;
        let params = [
            ("securityId", id.to_string()),
            ("startDate", format_date(start_date)),
            ("endDate", format_date(end_date)),
            ("page", "0".to_string()),
            ("size", "500".to_string()),
        ];
        self.session
            .get(endpoints::SECURITY_PRICE_HISTORY, &params)
            .await
    }

    /// All sectors listed on the exchange.
    pub async fn sectors(&self) -> Result<Vec<Value>> {
        self.session.get(endpoints::SECTORS, &[]).await
    }

    /// Index information for every sector.
    pub async fn sector_indices(&self) -> Result<Vec<Value>> {
        self.session.get(endpoints::SECTOR_INDICES, &[]).await
    }

    /// Historical values for one index over a date range.
    pub async fn index_history(
        &self,
        index_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Value> {
        let path = format!("{}/{index_id}", endpoints::INDEX_HISTORY);
        let params = [
            ("startDate", format_date(start_date)),
            ("endDate", format_date(end_date)),
        ];
        self.session.get(&path, &params).await
    }

    /// Intraday graph points for one index.
    ///
    /// Index ids run 51 through 67; 58 is the NEPSE index. Outside trading
    /// hours the exchange serves the last trading day's points.
    pub async fn live_index_graph(&self, index_id: i64) -> Result<Vec<Value>> {
        if !(51..=67).contains(&index_id) {
            return Err(ValidationError::IndexIdOutOfRange {
                value: index_id,
                min: 51,
                max: 67,
            }
            .into());
        }
        let path = format!("{}/{index_id}", endpoints::INDEX_GRAPH);
        self.session
            .post(&path, &[], None, PayloadCategory::SectorLive)
            .await
    }

    /// One of the five top-ten boards.
    pub async fn top_list(&self, category: TopListCategory) -> Result<Vec<Value>> {
        self.session.get(category.path(), &[]).await
    }

    /// Broker member directory, filtered by the given query. An empty
    /// [`BrokerQuery`] lists every member.
    pub async fn brokers(&self, query: &BrokerQuery) -> Result<Value> {
        let params = page_params(None);
        let body = serde_json::to_value(query)?;
        self.session
            .post(
                endpoints::BROKER_MEMBERS,
                &params,
                Some(body),
                PayloadCategory::Default,
            )
            .await
    }

    /// Resolves a ticker symbol to its security id via the cached map.
    async fn security_id(&self, symbol: &str) -> Result<i64> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol.into());
        }
        let upper = trimmed.to_uppercase();

        let mut slot = self.security_map.lock().await;
        if slot.is_none() {
            info!("building symbol map from the company list");
            let securities: Vec<Value> = self.session.get(endpoints::COMPANY_LIST, &[]).await?;
            let mut map = HashMap::with_capacity(securities.len());
            for security in &securities {
                if let Some(sym) = security.get("symbol").and_then(Value::as_str)
                    && let Some(id) = security.get("id").and_then(Value::as_i64)
                {
                    map.insert(sym.to_uppercase(), id);
                }
            }
            debug!(securities = map.len(), "symbol map cached");
            *slot = Some(map);
        }

        slot.as_ref()
            .and_then(|map| map.get(&upper).copied())
            .ok_or_else(|| ValidationError::UnknownSymbol { symbol: upper }.into())
    }
}

/// Standard paging querystring the exchange expects on paginated endpoints.
fn page_params(business_date: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", "0".to_string()), ("size", "500".to_string())];
    if let Some(date) = business_date {
        params.push(("businessDate", format_date(date)));
    }
    params
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Some answers nest their rows under a named field; absent or misshapen
/// bodies flatten to an empty list.
fn unwrap_field(body: Value, field: &str) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        Value::Array(rows) => rows,
        _ => Vec::new(),
    }
}
