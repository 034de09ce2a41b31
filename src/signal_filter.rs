// src/signal_filter.rs
use crate::types::PatternMatch;

/// A confirmed pattern is actionable for five minutes after its final point.
pub const FRESHNESS_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Keep only matches that completed within the freshness window. Detection
/// re-scans a sliding window every cycle, so without this cut the same
/// already-acted-upon pattern would be rediscovered and re-dispatched on
/// every notification.
pub fn retain_recent(matches: Vec<PatternMatch>, now_ms: i64) -> Vec<PatternMatch> {
    let threshold = now_ms - FRESHNESS_WINDOW_MS;
    matches
        .into_iter()
        .filter(|pat| pat.last_timestamp().map_or(false, |ts| ts >= threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternPoint;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn pattern_ending_at(ts: i64) -> PatternMatch {
        PatternMatch {
            name: "gartley".to_string(),
            direction: "bullish gartley".to_string(),
            points: vec![
                PatternPoint { timestamp: ts - 120_000, price: 1.0 },
                PatternPoint { timestamp: ts - 60_000, price: 1.1 },
                PatternPoint { timestamp: ts, price: 1.05 },
            ],
        }
    }

    #[test]
    fn retains_match_inside_window() {
        let fresh = pattern_ending_at(NOW_MS - 60_000);
        let kept = retain_recent(vec![fresh.clone()], NOW_MS);
        assert_eq!(kept, vec![fresh]);
    }

    #[test]
    fn retains_match_exactly_on_threshold() {
        let boundary = pattern_ending_at(NOW_MS - FRESHNESS_WINDOW_MS);
        assert_eq!(retain_recent(vec![boundary], NOW_MS).len(), 1);
    }

    #[test]
    fn drops_stale_match() {
        let stale = pattern_ending_at(NOW_MS - FRESHNESS_WINDOW_MS - 1);
        assert!(retain_recent(vec![stale], NOW_MS).is_empty());
    }

    #[test]
    fn drops_match_without_geometry() {
        let empty = PatternMatch {
            name: "bat".to_string(),
            direction: "bearish bat".to_string(),
            points: Vec::new(),
        };
        assert!(retain_recent(vec![empty], NOW_MS).is_empty());
    }
}
