// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw sample from the time-series store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub timestamp: i64, // epoch millis
    pub value: f64,
}

/// One aggregated 1-minute bar, rebuilt fresh every detection cycle.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: i64, // epoch millis
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// One geometry point of a matched pattern.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PatternPoint {
    pub timestamp: i64, // epoch millis
    pub price: f64,
}

/// A pattern reported by the matcher. `direction` is the matcher's own label
/// ("bullish gartley", "bearish bat", ...); we only inspect it for the
/// bullish/bearish substring when deriving the trade side.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub name: String,
    pub direction: String,
    pub points: Vec<PatternPoint>,
}

impl PatternMatch {
    /// Timestamp of the final geometry point, i.e. when the pattern completed.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.points.last().map(|p| p.timestamp)
    }

    /// The 3rd geometry point carries the take-profit price.
    pub fn take_profit_point(&self) -> Option<PatternPoint> {
        self.points.get(2).copied()
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TradeSide {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl TradeSide {
    /// Which side of the book we enter against: the offer for a buy, the bid
    /// for a sell.
    pub fn price_side(&self) -> &'static str {
        match self {
            TradeSide::Buy => "OFR",
            TradeSide::Sell => "BID",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Payload for the trading service's trade-creation endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub epic: String,
    pub position: TradeSide,
    #[serde(rename = "stopLoss")]
    pub stop_loss: f64,
    #[serde(rename = "takeProfit")]
    pub take_profit: f64,
}
