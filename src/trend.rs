// src/trend.rs - secondary trend slope, diagnostic only
use crate::store::{series_key, BarField, TimeSeriesStore};

pub const SMA_PERIOD: usize = 30;
const LOOKBACK_MS: i64 = 24 * 60 * 60 * 1000;

/// Simple moving average; only the fully-formed windows are returned, i.e.
/// the leading undefined values are already discarded.
pub fn simple_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Ordinary-least-squares slope of `values` against a 1-based index. Returns
/// 0.0 when the fit is degenerate (too few points or an undefined slope).
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x = (i + 1) as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denom = n_f * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return 0.0;
    }
    let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

/// Slope of the 30-period SMA of the close series over a 1-day lookback.
/// Logged next to any dispatched trade; it never gates dispatch.
pub async fn confirm_trend(
    store: &TimeSeriesStore,
    instrument: &str,
    now_ms: i64,
) -> Result<f64, redis::RedisError> {
    let key = series_key(instrument, BarField::Last);
    let points = store.range(&key, now_ms - LOOKBACK_MS, now_ms).await?;
    if points.is_empty() {
        return Ok(0.0);
    }
    let closes: Vec<f64> = points.iter().map(|p| p.value).collect();
    let sma = simple_moving_average(&closes, SMA_PERIOD);
    Ok(ols_slope(&sma))
}
