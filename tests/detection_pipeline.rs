// tests/detection_pipeline.rs
//
// Drives the detection pipeline stage by stage on frozen inputs: series zip,
// pattern matching through the capability trait, freshness filtering and
// trade planning. Store and trading-service traffic is the only part left
// out; everything up to the outbound request is exercised.

use harmonic_trader::aggregator::zip_series;
use harmonic_trader::dispatcher::{derive_side, plan_trade};
use harmonic_trader::errors::{FrameError, MatcherError, PlanError};
use harmonic_trader::patterns::{MatcherParams, MatchSet, PatternMatcher};
use harmonic_trader::signal_filter::{retain_recent, FRESHNESS_WINDOW_MS};
use harmonic_trader::store::instrument_from_channel;
use harmonic_trader::types::{OhlcvBar, PatternMatch, PatternPoint, TimeSeriesPoint, TradeSide};

const NOW_MS: i64 = 1_700_000_000_000;

/// Matcher scripted to return a fixed result, standing in for the external
/// geometry engine.
struct ScriptedMatcher {
    result: MatchSet,
}

impl PatternMatcher for ScriptedMatcher {
    fn search_patterns(
        &self,
        frame: &[OhlcvBar],
        _params: &MatcherParams,
    ) -> Result<MatchSet, MatcherError> {
        assert!(!frame.is_empty(), "matcher must never see an empty frame");
        Ok(self.result.clone())
    }
}

fn minute_series(base: f64, count: usize) -> Vec<TimeSeriesPoint> {
    (0..count)
        .map(|i| TimeSeriesPoint {
            timestamp: NOW_MS - 60_000 * (count - i) as i64,
            value: base + i as f64 * 0.0001,
        })
        .collect()
}

fn frame(count: usize) -> Vec<OhlcvBar> {
    let open = minute_series(1.1000, count);
    let high = minute_series(1.1005, count);
    let low = minute_series(1.0995, count);
    let close = minute_series(1.1002, count);
    let volume = minute_series(25.0, count);
    zip_series(&open, &high, &low, &close, &volume).unwrap()
}

fn confirmed(direction: &str, third_price: f64, end_ts: i64) -> PatternMatch {
    PatternMatch {
        name: "X".to_string(),
        direction: direction.to_string(),
        points: vec![
            PatternPoint { timestamp: end_ts - 180_000, price: 1.10100 },
            PatternPoint { timestamp: end_ts - 120_000, price: 1.10300 },
            PatternPoint { timestamp: end_ts - 60_000, price: third_price },
            PatternPoint { timestamp: end_ts, price: 1.10200 },
        ],
    }
}

#[test]
fn scenario_a_bullish_match_plans_a_buy() {
    let bars = frame(60);
    let matcher = ScriptedMatcher {
        result: MatchSet {
            confirmed: vec![confirmed("bullish X", 1.10500, NOW_MS - 30_000)],
            predicted: Vec::new(),
        },
    };

    let matches = matcher
        .search_patterns(&bars, &MatcherParams::default())
        .unwrap();
    let recent = retain_recent(matches.confirmed, NOW_MS);
    assert_eq!(recent.len(), 1);

    let side = derive_side(&recent[0].direction).unwrap();
    assert_eq!(side, TradeSide::Buy);
    // ask quote, since we are buying
    let request = plan_trade("EUR.USD", &recent[0], side, 1.10000).unwrap();

    assert_eq!(request.epic, "EUR.USD");
    assert_eq!(request.position, TradeSide::Buy);
    assert_eq!(request.stop_loss, 1.09500);
    assert_eq!(request.take_profit, 1.10500);
    assert_eq!(
        serde_json::to_string(&request).unwrap(),
        r#"{"epic":"EUR.USD","position":"BUY","stopLoss":1.095,"takeProfit":1.105}"#
    );
}

#[test]
fn scenario_b_bearish_match_plans_a_sell() {
    let pat = confirmed("bearish X", 1.09000, NOW_MS - 30_000);
    let recent = retain_recent(vec![pat], NOW_MS);
    assert_eq!(recent.len(), 1);

    let side = derive_side(&recent[0].direction).unwrap();
    assert_eq!(side, TradeSide::Sell);
    // bid quote, since we are selling
    let request = plan_trade("EUR.USD", &recent[0], side, 1.10000).unwrap();

    assert_eq!(request.position, TradeSide::Sell);
    assert_eq!(request.stop_loss, 1.11000);
    assert_eq!(request.take_profit, 1.09000);
}

#[test]
fn scenario_c_undecodable_channel_starts_no_cycle() {
    // A channel outside the naming convention decodes to nothing, so the
    // subscriber logs it and moves on without queueing a cycle.
    assert_eq!(instrument_from_channel("__keyspace@0__:ts.add"), None);
    assert_eq!(
        instrument_from_channel("__keyevent@0__:EUR.USD:BID:1_MIN:LAST"),
        None
    );
    assert_eq!(
        instrument_from_channel("EUR.USD:BID:1_MIN:LAST"),
        None
    );
}

#[test]
fn scenario_d_empty_series_ends_cycle_before_matching() {
    let filled = minute_series(1.1, 10);
    let empty: Vec<TimeSeriesPoint> = Vec::new();
    let result = zip_series(&filled, &empty, &filled, &filled, &filled);
    // The cycle ends on this error without ever invoking the matcher.
    assert_eq!(result, Err(FrameError::EmptySeries("high")));
}

#[test]
fn stale_matches_never_reach_planning() {
    let stale = confirmed("bullish X", 1.10500, NOW_MS - FRESHNESS_WINDOW_MS - 60_000);
    assert!(retain_recent(vec![stale], NOW_MS).is_empty());
}

#[test]
fn sibling_matches_survive_one_bad_direction_label() {
    let bad = confirmed("consolidating", 1.10500, NOW_MS - 30_000);
    let good = confirmed("bullish X", 1.10500, NOW_MS - 30_000);
    let recent = retain_recent(vec![bad, good], NOW_MS);
    assert_eq!(recent.len(), 2);

    assert_eq!(
        derive_side(&recent[0].direction),
        Err(PlanError::UnknownDirection("consolidating".to_string()))
    );
    // the second match still plans cleanly
    let side = derive_side(&recent[1].direction).unwrap();
    assert!(plan_trade("EUR.USD", &recent[1], side, 1.10000).is_ok());
}

#[test]
fn identical_frozen_inputs_yield_bit_identical_payloads() {
    let pat = confirmed("bullish X", 1.10512, NOW_MS - 30_000);
    let side = derive_side(&pat.direction).unwrap();

    let first = plan_trade("EUR.USD", &pat, side, 1.10003).unwrap();
    let second = plan_trade("EUR.USD", &pat, side, 1.10003).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.stop_loss.to_bits(), second.stop_loss.to_bits());
    assert_eq!(first.take_profit.to_bits(), second.take_profit.to_bits());
}

#[test]
fn matcher_failures_are_catchable_by_the_cycle() {
    struct BrokenMatcher;
    impl PatternMatcher for BrokenMatcher {
        fn search_patterns(
            &self,
            _frame: &[OhlcvBar],
            _params: &MatcherParams,
        ) -> Result<MatchSet, MatcherError> {
            Err(MatcherError("divide by zero in leg ratio".to_string()))
        }
    }

    let err = BrokenMatcher
        .search_patterns(&frame(40), &MatcherParams::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "divide by zero in leg ratio");
}
