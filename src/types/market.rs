//! Market data types
//!
//! Structures for the market-open status endpoint and the closed enums used
//! to select payload categories and top-ten boards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::endpoints;
use crate::error::Result;

/// Market-open status, also the source of the payload seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    /// `"OPEN"` or `"CLOSE"` as reported by the exchange; treated as closed
    /// when the field is missing
    #[serde(default)]
    pub is_open: String,

    /// Exchange-local timestamp the status applies to, e.g.
    /// `"2023-08-24T10:59:59"`
    pub as_of: Option<String>,

    /// Seed integer indexing the payload lookup table
    pub id: i64,
}

impl MarketStatus {
    /// Whether the exchange reports the market as open
    pub fn open(&self) -> bool {
        self.is_open == "OPEN"
    }

    /// The calendar date of `as_of`, if present
    pub fn as_of_date(&self) -> Result<Option<NaiveDate>> {
        match &self.as_of {
            None => Ok(None),
            Some(raw) => {
                let prefix = raw.split('T').next().unwrap_or(raw);
                Ok(Some(NaiveDate::parse_from_str(prefix, "%Y-%m-%d")?))
            }
        }
    }
}

/// Selects which branch of the payload identifier formula applies to a POST
/// endpoint that takes a computed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadCategory {
    /// Live per-security market data
    StockLive,
    /// Live sector index graphs
    SectorLive,
    /// Every other computed-body endpoint
    Default,
}

impl std::fmt::Display for PayloadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StockLive => "stock-live",
            Self::SectorLive => "sector-live",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

/// The five "top ten" boards published by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopListCategory {
    /// Largest price gains of the day
    Gainers,
    /// Largest price losses of the day
    Losers,
    /// Highest traded value
    Turnover,
    /// Highest traded share quantity
    TradeQuantity,
    /// Highest transaction count
    TransactionCount,
}

impl TopListCategory {
    /// Endpoint path serving this board
    pub fn path(self) -> &'static str {
        match self {
            Self::Gainers => endpoints::TOP_GAINERS,
            Self::Losers => endpoints::TOP_LOSERS,
            Self::Turnover => endpoints::TOP_TURNOVER,
            Self::TradeQuantity => endpoints::TOP_TRADE_QUANTITY,
            Self::TransactionCount => endpoints::TOP_TRANSACTIONS,
        }
    }
}

/// Search filter for the broker-member endpoint.
///
/// The defaults match every broker, mirroring the upstream form's empty
/// submission (empty strings and zero region ids).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerQuery {
    pub member_name: String,
    pub contact_person: String,
    pub contact_number: String,
    pub member_code: String,
    pub province_id: i64,
    pub district_id: i64,
    pub municipality_id: i64,
}

impl BrokerQuery {
    /// Match-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by broker member name
    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = name.into();
        self
    }

    /// Filter by broker member code
    pub fn with_member_code(mut self, code: impl Into<String>) -> Self {
        self.member_code = code.into();
        self
    }

    /// Filter by province id
    pub fn with_province(mut self, province_id: i64) -> Self {
        self.province_id = province_id;
        self
    }

    /// Filter by district id
    pub fn with_district(mut self, district_id: i64) -> Self {
        self.district_id = district_id;
        self
    }

    /// Filter by municipality id
    pub fn with_municipality(mut self, municipality_id: i64) -> Self {
        self.municipality_id = municipality_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_market_status_open() {
        let status: MarketStatus = serde_json::from_value(json!({
            "isOpen": "OPEN",
            "asOf": "2023-08-24T10:59:59",
            "id": 79
        }))
        .unwrap();

        assert!(status.open());
        assert_eq!(status.id, 79);
        assert_eq!(
            status.as_of_date().unwrap(),
            Some(NaiveDate::from_ymd_opt(2023, 8, 24).unwrap())
        );
    }

    #[test]
    fn test_market_status_closed() {
        let status: MarketStatus = serde_json::from_value(json!({
            "isOpen": "CLOSE",
            "id": 12
        }))
        .unwrap();

        assert!(!status.open());
        assert_eq!(status.as_of_date().unwrap(), None);
    }

    #[test]
    fn test_market_status_missing_is_open_reads_closed() {
        let status: MarketStatus = serde_json::from_value(json!({"id": 12})).unwrap();
        assert!(!status.open());
    }

    #[test]
    fn test_market_status_bad_date() {
        let status: MarketStatus = serde_json::from_value(json!({
            "isOpen": "CLOSE",
            "asOf": "someday",
            "id": 12
        }))
        .unwrap();

        assert!(status.as_of_date().is_err());
    }

    #[test]
    fn test_payload_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&PayloadCategory::StockLive).unwrap(),
            "\"stock-live\""
        );
        assert_eq!(
            serde_json::to_string(&PayloadCategory::SectorLive).unwrap(),
            "\"sector-live\""
        );
        assert_eq!(
            serde_json::to_string(&PayloadCategory::Default).unwrap(),
            "\"default\""
        );
        assert_eq!(PayloadCategory::StockLive.to_string(), "stock-live");
    }

    #[test]
    fn test_top_list_paths() {
        assert_eq!(TopListCategory::Gainers.path(), "/api/nots/top-ten/top-gainer");
        assert_eq!(TopListCategory::Losers.path(), "/api/nots/top-ten/top-loser");
        assert_eq!(TopListCategory::Turnover.path(), "/api/nots/top-ten/turnover");
        assert_eq!(TopListCategory::TradeQuantity.path(), "/api/nots/top-ten/trade");
        assert_eq!(
            TopListCategory::TransactionCount.path(),
            "/api/nots/top-ten/transaction"
        );
    }

    #[test]
    fn test_broker_query_serialization() {
        let query = BrokerQuery::new()
            .with_member_name("agrawal")
            .with_province(3);

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "memberName": "agrawal",
                "contactPerson": "",
                "contactNumber": "",
                "memberCode": "",
                "provinceId": 3,
                "districtId": 0,
                "municipalityId": 0
            })
        );
    }
}
