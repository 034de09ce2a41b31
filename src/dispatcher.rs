// src/dispatcher.rs - turn a retained match into a trade request and post it
use log::{error, info, warn};
use reqwest::Client;

use crate::config::AppConfig;
use crate::errors::PlanError;
use crate::store::{latest_price_key, TimeSeriesStore};
use crate::types::{PatternMatch, TradeRequest, TradeSide};

/// The trading service quotes to 5 decimal places.
pub fn round_to_5_decimals(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// BUY on a bullish label, SELL on a bearish one; anything else is a
/// per-match error.
pub fn derive_side(direction: &str) -> Result<TradeSide, PlanError> {
    if direction.contains("bullish") {
        Ok(TradeSide::Buy)
    } else if direction.contains("bearish") {
        Ok(TradeSide::Sell)
    } else {
        Err(PlanError::UnknownDirection(direction.to_string()))
    }
}

/// Compute and validate the risk levels for one match against the current
/// best price. Stop loss mirrors the take-profit distance on the other side
/// of the entry, and both levels must sit on the correct side of the price.
pub fn plan_trade(
    instrument: &str,
    pattern: &PatternMatch,
    side: TradeSide,
    current_price: f64,
) -> Result<TradeRequest, PlanError> {
    let target = pattern
        .take_profit_point()
        .ok_or(PlanError::MissingTakeProfitPoint)?;
    let take_profit = round_to_5_decimals(target.price);

    let stop_loss = match side {
        TradeSide::Buy => {
            let stop_loss = current_price - (take_profit - current_price);
            if stop_loss >= current_price {
                return Err(PlanError::StopLossInvalid {
                    stop_loss,
                    current: current_price,
                });
            }
            if take_profit <= current_price {
                return Err(PlanError::TakeProfitInvalid {
                    take_profit,
                    current: current_price,
                });
            }
            stop_loss
        }
        TradeSide::Sell => {
            let stop_loss = current_price + (current_price - take_profit);
            if stop_loss <= current_price {
                return Err(PlanError::StopLossInvalid {
                    stop_loss,
                    current: current_price,
                });
            }
            if take_profit >= current_price {
                return Err(PlanError::TakeProfitInvalid {
                    take_profit,
                    current: current_price,
                });
            }
            stop_loss
        }
    };

    Ok(TradeRequest {
        epic: instrument.to_string(),
        position: side,
        stop_loss: round_to_5_decimals(stop_loss),
        take_profit,
    })
}

/// Posts trade-creation requests to the external trading service.
pub struct TradeDispatcher {
    http: Client,
    trader_url: String,
}

impl TradeDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            trader_url: config.trader_url.clone(),
        }
    }

    /// Fire-and-forget dispatch for one retained match. Every reject path
    /// logs and returns; sibling matches are unaffected, and a transport
    /// failure is logged but never retried.
    pub async fn dispatch(&self, store: &TimeSeriesStore, instrument: &str, pattern: &PatternMatch) {
        let side = match derive_side(&pattern.direction) {
            Ok(side) => side,
            Err(e) => {
                warn!(
                    "[DISPATCH] {} skipping {} pattern: {}",
                    instrument, pattern.name, e
                );
                return;
            }
        };

        let price_key = latest_price_key(instrument, side.price_side());
        let current_price = match store.latest(&price_key).await {
            Ok(Some(point)) if !point.value.is_nan() => point.value,
            Ok(_) => {
                warn!(
                    "[DISPATCH] {} skipping {} pattern: {}",
                    instrument,
                    pattern.name,
                    PlanError::PriceUnavailable(price_key)
                );
                return;
            }
            Err(e) => {
                error!(
                    "[DISPATCH] {} price lookup failed on {}: {}",
                    instrument, price_key, e
                );
                return;
            }
        };

        let request = match plan_trade(instrument, pattern, side, current_price) {
            Ok(request) => request,
            Err(e) => {
                warn!(
                    "[DISPATCH] {} trade levels miscalculated for {} {} ({}): {} - current price {}",
                    instrument, side, pattern.name, pattern.direction, e, current_price
                );
                return;
            }
        };

        info!(
            "[DISPATCH] Sending trade create {} {} stopLoss:{} takeProfit:{} - current price {}",
            request.epic, request.position, request.stop_loss, request.take_profit, current_price
        );
        match self.http.post(&self.trader_url).json(&request).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                info!("[DISPATCH] Trade response for {}: {} {}", instrument, status, body);
            }
            Err(e) => {
                error!("[DISPATCH] Trade request for {} failed: {}", instrument, e);
            }
        }
    }
}
