// src/aggregator.rs - rebuild the OHLCV frame from the five per-field series
use log::debug;

use crate::errors::FrameError;
use crate::store::{series_key, BarField, TimeSeriesStore};
use crate::types::{OhlcvBar, TimeSeriesPoint};

/// Live detection looks back one day of 1-minute bars.
pub const LOOKBACK_MS: i64 = 24 * 60 * 60 * 1000;

/// Query the five field series for `[now - 1d, now]` and zip them into a
/// frame. A store error propagates; an unusable result (empty or misaligned
/// series) comes back as `Ok(Err(FrameError))` so the cycle can end quietly.
pub async fn fetch_frame(
    store: &TimeSeriesStore,
    instrument: &str,
    now_ms: i64,
) -> Result<Result<Vec<OhlcvBar>, FrameError>, redis::RedisError> {
    let from_ms = now_ms - LOOKBACK_MS;
    let open_key = series_key(instrument, BarField::First);
    let high_key = series_key(instrument, BarField::Max);
    let low_key = series_key(instrument, BarField::Min);
    let close_key = series_key(instrument, BarField::Last);
    let volume_key = series_key(instrument, BarField::Count);
    let (open, high, low, close, volume) = tokio::try_join!(
        store.range(&open_key, from_ms, now_ms),
        store.range(&high_key, from_ms, now_ms),
        store.range(&low_key, from_ms, now_ms),
        store.range(&close_key, from_ms, now_ms),
        store.range(&volume_key, from_ms, now_ms),
    )?;
    debug!(
        "[AGGREGATOR] {} fetched series - open:{} high:{} low:{} close:{} volume:{}",
        instrument,
        open.len(),
        high.len(),
        low.len(),
        close.len(),
        volume.len()
    );
    Ok(zip_series(&open, &high, &low, &close, &volume))
}

/// Combine the five series positionally, taking bar timestamps from the open
/// series. The store writes all five fields of a bucket together, so equal
/// length and ordering is expected; anything else is rejected rather than
/// silently zipped out of alignment. Rows with any NaN field are dropped.
pub fn zip_series(
    open: &[TimeSeriesPoint],
    high: &[TimeSeriesPoint],
    low: &[TimeSeriesPoint],
    close: &[TimeSeriesPoint],
    volume: &[TimeSeriesPoint],
) -> Result<Vec<OhlcvBar>, FrameError> {
    if open.is_empty() {
        return Err(FrameError::EmptySeries("open"));
    }
    if high.is_empty() {
        return Err(FrameError::EmptySeries("high"));
    }
    if low.is_empty() {
        return Err(FrameError::EmptySeries("low"));
    }
    if close.is_empty() {
        return Err(FrameError::EmptySeries("close"));
    }
    if volume.is_empty() {
        return Err(FrameError::EmptySeries("volume"));
    }

    let len = open.len();
    if high.len() != len || low.len() != len || close.len() != len || volume.len() != len {
        return Err(FrameError::LengthMismatch {
            open: open.len(),
            high: high.len(),
            low: low.len(),
            close: close.len(),
            volume: volume.len(),
        });
    }

    let mut bars = Vec::with_capacity(len);
    for i in 0..len {
        let row = [
            open[i].value,
            high[i].value,
            low[i].value,
            close[i].value,
            volume[i].value,
        ];
        if row.iter().any(|v| v.is_nan()) {
            continue;
        }
        bars.push(OhlcvBar {
            timestamp: open[i].timestamp,
            open: open[i].value,
            high: high[i].value,
            low: low[i].value,
            close: close[i].value,
            volume: volume[i].value as i64,
        });
    }
    Ok(bars)
}
