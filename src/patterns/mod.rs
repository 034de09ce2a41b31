// src/patterns/mod.rs
use log::warn;

use crate::errors::MatcherError;
use crate::types::{OhlcvBar, PatternMatch};

/// Tuning knobs passed straight through to the matcher implementation.
#[derive(Debug, Clone, Copy)]
pub struct MatcherParams {
    /// Allowed deviation from the ideal ratio of each pattern leg.
    pub error_allowed: f64,
    pub strict: bool,
    /// Only report the pattern ending at the most recent swing.
    pub only_last: bool,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            error_allowed: 0.5,
            strict: false,
            only_last: true,
        }
    }
}

/// Matcher output: patterns whose geometry already completed, and in-progress
/// ones projected to complete. Only confirmed matches are ever traded;
/// predicted ones are counted in logs.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    pub confirmed: Vec<PatternMatch>,
    pub predicted: Vec<PatternMatch>,
}

/// Capability boundary around the harmonic-geometry engine. The pipeline only
/// depends on this one operation; the geometry itself lives elsewhere and is
/// free to fail however it likes - the caller catches and logs.
pub trait PatternMatcher: Send + Sync {
    fn search_patterns(
        &self,
        frame: &[OhlcvBar],
        params: &MatcherParams,
    ) -> Result<MatchSet, MatcherError>;
}

/// Stand-in used until a geometry engine is wired in. Keeps the whole
/// pipeline runnable end to end; it just never finds anything.
pub struct DisabledMatcher;

impl DisabledMatcher {
    pub fn new() -> Self {
        warn!("Pattern matcher disabled - no geometry engine configured, no trades will fire");
        Self
    }
}

impl Default for DisabledMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher for DisabledMatcher {
    fn search_patterns(
        &self,
        _frame: &[OhlcvBar],
        _params: &MatcherParams,
    ) -> Result<MatchSet, MatcherError> {
        Ok(MatchSet::default())
    }
}
