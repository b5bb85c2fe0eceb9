//! Solve configuration.

use serde::{Deserialize, Serialize};

/// Wall-clock budget used when the caller does not pick one.
pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 30.0;
/// Multiplier on the instructor session-count range.
pub const DEFAULT_EQUALITY_WEIGHT: i64 = 100;
/// Overlap priority given to participants that do not set one.
pub const DEFAULT_OVERLAP_PRIORITY: u8 = 50;
/// Highest accepted overlap priority.
pub const MAX_OVERLAP_PRIORITY: u8 = 100;

/// Knobs for a single solve attempt.
///
/// Every field has a default, so a partial JSON/TOML document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    /// Wall-clock budget for the search. When it runs out the best incumbent is
    /// returned as non-optimal, or no schedule if none was found yet.
    pub time_limit_seconds: f64,
    /// Weight of `max_sessions - min_sessions` in the objective.
    pub equality_weight: i64,
    /// CP-SAT worker threads. Only read by `CpSatEngine`; `MicroLpEngine` is single-threaded.
    pub num_search_workers: i32,
    /// CP-SAT search seed. Only read by `CpSatEngine`.
    pub random_seed: i32,
    /// Let CP-SAT print its search log. Only read by `CpSatEngine`.
    pub log_search_progress: bool,
    /// Only let instructors teach parts they belong to.
    pub restrict_to_declared_parts: bool,
    /// Hard cap on the spread between the busiest and idlest instructor.
    pub max_session_spread: Option<i64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            equality_weight: DEFAULT_EQUALITY_WEIGHT,
            num_search_workers: 8,
            random_seed: 42,
            log_search_progress: false,
            restrict_to_declared_parts: false,
            max_session_spread: None,
        }
    }
}

impl SolveConfig {
    /// Default configuration with the two knobs exposed by [`crate::solve`].
    pub fn new(time_limit_seconds: f64, equality_weight: i64) -> Self {
        Self {
            time_limit_seconds,
            equality_weight,
            ..Self::default()
        }
    }

    pub fn with_spread_cap(mut self, cap: i64) -> Self {
        self.max_session_spread = Some(cap);
        self
    }

    pub fn restricted_to_declared_parts(mut self) -> Self {
        self.restrict_to_declared_parts = true;
        self
    }
}
