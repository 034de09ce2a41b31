// src/cycle.rs - one detection cycle, notification to dispatch
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};

use crate::aggregator;
use crate::dispatcher::TradeDispatcher;
use crate::patterns::{MatcherParams, PatternMatcher};
use crate::signal_filter;
use crate::store::TimeSeriesStore;
use crate::trend;

/// Everything a detection worker needs. Shared read-mostly across workers;
/// the store connection and HTTP client both tolerate concurrent callers.
pub struct PipelineContext {
    pub store: TimeSeriesStore,
    pub dispatcher: TradeDispatcher,
    pub matcher: Arc<dyn PatternMatcher>,
    pub params: MatcherParams,
}

/// Run one full cycle for an instrument. Nothing here is allowed to escape:
/// every failure mode logs and ends the cycle, and no state outlives it.
pub async fn run_detection_cycle(ctx: &PipelineContext, instrument: &str) {
    let started = std::time::Instant::now();
    let now_ms = Utc::now().timestamp_millis();

    // Aggregating
    let frame = match aggregator::fetch_frame(&ctx.store, instrument, now_ms).await {
        Ok(Ok(frame)) => frame,
        Ok(Err(e)) => {
            info!("[CYCLE] {} no usable frame: {}", instrument, e);
            return;
        }
        Err(e) => {
            error!("[CYCLE] {} store query failed: {}", instrument, e);
            return;
        }
    };
    if frame.is_empty() {
        info!("[CYCLE] {} frame empty after dropping incomplete rows", instrument);
        return;
    }

    // Matching
    let matches = match ctx.matcher.search_patterns(&frame, &ctx.params) {
        Ok(matches) => matches,
        Err(e) => {
            error!(
                "[CYCLE] {} matcher failed over {} bars: {}",
                instrument,
                frame.len(),
                e
            );
            return;
        }
    };
    debug!(
        "[CYCLE] {} matcher returned {} confirmed / {} predicted over {} bars",
        instrument,
        matches.confirmed.len(),
        matches.predicted.len(),
        frame.len()
    );

    // Filtering
    let recent = signal_filter::retain_recent(matches.confirmed, now_ms);
    if recent.is_empty() {
        debug!("[CYCLE] {} no confirmed match within freshness window", instrument);
        return;
    }

    // Trend slope is informational only; a failed lookup must not block dispatch.
    let slope = match trend::confirm_trend(&ctx.store, instrument, now_ms).await {
        Ok(slope) => slope,
        Err(e) => {
            error!("[CYCLE] {} trend regression failed: {}", instrument, e);
            0.0
        }
    };
    info!(
        "[CYCLE] Run for {} with slope {} - {} recent confirmed pattern(s)",
        instrument,
        slope,
        recent.len()
    );
    if !matches.predicted.is_empty() {
        info!(
            "[CYCLE] {} {} predict pattern(s) found",
            instrument,
            matches.predicted.len()
        );
    }

    // PerMatchDispatch - each match succeeds or skips on its own
    for pattern in &recent {
        info!(
            "[CYCLE] Confirmed {} pattern {} for {}: {:?}",
            pattern.direction, pattern.name, instrument, pattern.points
        );
        ctx.dispatcher.dispatch(&ctx.store, instrument, pattern).await;
    }

    info!(
        "[CYCLE] {} cycle finished in {:.3}s",
        instrument,
        started.elapsed().as_secs_f64()
    );
}
