//! Core data types for the pricewatch signal engine.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single observed price with its capture time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Capture time in epoch milliseconds
    pub timestamp: i64,
    /// Observed price
    pub value: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Capture time as a UTC datetime, if the timestamp is representable.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Discrete trading signal emitted by the decider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Indicators not yet computable
    #[default]
    Warmup,
    Hold,
    Buy,
    Sell,
}

impl Signal {
    /// Upper-case label used by the overlay.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Warmup => "WARMUP",
            Signal::Hold => "HOLD",
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single simulated trade record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    /// Buy or Sell
    #[serde(rename = "type")]
    pub side: TradeSide,
    /// Execution price
    pub price: f64,
    /// Execution time in epoch milliseconds
    pub timestamp: i64,
}

impl Trade {
    /// Create a new trade.
    pub fn new(side: TradeSide, price: f64, timestamp: i64) -> Self {
        Self {
            side,
            price,
            timestamp,
        }
    }
}

/// Portfolio valuation at a point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PortfolioPoint {
    pub timestamp: i64,
    /// balance + holdings * price
    pub value: f64,
}

/// API response wrapper used by the command-line host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_labels() {
        assert_eq!(Signal::default(), Signal::Warmup);
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_trade_serializes_type_field() {
        let trade = Trade::new(TradeSide::Buy, 100.0, 42);
        let json = serde_json::to_value(trade).unwrap();
        assert_eq!(json["type"], "BUY");
        assert_eq!(json["price"], 100.0);
        assert_eq!(json["timestamp"], 42);
    }

    #[test]
    fn test_price_point_time() {
        let point = PricePoint::new(1_700_000_000_000, 1.5);
        let time = point.time().unwrap();
        assert_eq!(time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
