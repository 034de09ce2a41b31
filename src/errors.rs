// src/errors.rs
use thiserror::Error;

/// Frame construction gave us nothing the matcher can work with. This ends
/// the cycle early but is not treated as a failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("empty {0} series")]
    EmptySeries(&'static str),
    #[error(
        "series lengths not equal - open:{open} high:{high} low:{low} close:{close} volume:{volume}"
    )]
    LengthMismatch {
        open: usize,
        high: usize,
        low: usize,
        close: usize,
        volume: usize,
    },
}

/// Opaque failure surfaced by the pattern-matching capability. The cycle logs
/// it and ends; it never propagates further.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MatcherError(pub String);

/// Why a single confirmed match was not turned into a trade request. Each of
/// these skips one match only; sibling matches still get processed.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("unrecognised direction label '{0}'")]
    UnknownDirection(String),
    #[error("pattern has fewer than 3 geometry points")]
    MissingTakeProfitPoint,
    #[error("current price unavailable for key {0}")]
    PriceUnavailable(String),
    #[error("stop loss {stop_loss} not beyond current price {current}")]
    StopLossInvalid { stop_loss: f64, current: f64 },
    #[error("take profit {take_profit} not beyond current price {current}")]
    TakeProfitInvalid { take_profit: f64, current: f64 },
}
