//! Endpoint path catalogue for the exchange's REST API.
//!
//! Paths that address a single resource (`/{id}`) are built by the caller
//! with [`format!`] on top of these prefixes.

/// Token issuance, the only unauthenticated call
pub const AUTHENTICATE: &str = "/api/authenticate/prove";

/// Market-open status; also the source of the payload seed
pub const MARKET_OPEN: &str = "/api/nots/nepse-data/market-open";

/// Today's price list (POST, computed body)
pub const TODAY_PRICE: &str = "/api/nots/nepse-data/today-price";

/// Live market feed (POST, computed body)
pub const LIVE_MARKET: &str = "/api/nots/nepse-data/live-market";

/// Market capitalisation by date
pub const MARKET_CAP_BY_DATE: &str = "/api/nots/nepse-data/marcapbydate";

/// N-day trading average
pub const TRADING_AVERAGE: &str = "/api/nots/nepse-data/trading-average";

/// Market summary of the day
pub const MARKET_SUMMARY: &str = "/api/nots/market-summary";

/// Historical market summaries
pub const MARKET_SUMMARY_HISTORY: &str = "/api/nots/market-summary-history";

/// Sector-wise turnover summary
pub const SECTORWISE_SUMMARY: &str = "/api/nots/sectorwise";

/// Full security list
pub const COMPANY_LIST: &str = "/api/nots/company/list";

/// Company disclosure news
pub const COMPANY_DISCLOSURES: &str = "/api/nots/news/companies/disclosure";

/// Security detail (`/{security_id}`, POST, computed body)
pub const SECURITY_DETAIL: &str = "/api/nots/security";

/// Daily price history of one security
pub const SECURITY_PRICE_HISTORY: &str = "/api/nots/market/history/security";

/// Sector catalogue
pub const SECTORS: &str = "/api/nots/sector";

/// Sector index catalogue
pub const SECTOR_INDICES: &str = "/api/nots/index";

/// Historical values of one index (`/{index_id}`)
pub const INDEX_HISTORY: &str = "/api/nots/index/history";

/// Intraday graph of one sector index (`/{index_id}`, POST, computed body)
pub const INDEX_GRAPH: &str = "/api/nots/graph/index";

/// Broker member search (POST, explicit body)
pub const BROKER_MEMBERS: &str = "/api/nots/member";

pub const TOP_GAINERS: &str = "/api/nots/top-ten/top-gainer";
pub const TOP_LOSERS: &str = "/api/nots/top-ten/top-loser";
pub const TOP_TURNOVER: &str = "/api/nots/top-ten/turnover";
pub const TOP_TRADE_QUANTITY: &str = "/api/nots/top-ten/trade";
pub const TOP_TRANSACTIONS: &str = "/api/nots/top-ten/transaction";
