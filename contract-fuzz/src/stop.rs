// contract-fuzz/src/stop.rs
//! Threshold-based termination of the random fuzzing loop

use std::time::Duration;

use crate::constants::DEFAULT_MAX_TESTS;

/// Snapshot of the loop counters, taken once per iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopState {
    pub errors: u64,
    pub tests: u64,
    pub elapsed: Duration,
}

/// Independently optional stop thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopConditions {
    pub max_duration: Option<Duration>,
    pub max_errors: Option<u64>,
    pub max_tests: Option<u64>,
}

impl StopConditions {
    pub fn after_tests(max_tests: u64) -> Self {
        Self {
            max_tests: Some(max_tests),
            ..Self::default()
        }
    }

    /// No threshold configured at all
    pub fn is_unbounded(&self) -> bool {
        self.max_duration.is_none() && self.max_errors.is_none() && self.max_tests.is_none()
    }

    /// Conditions actually enforced: an unbounded set falls back to
    /// `DEFAULT_MAX_TESTS` so the loop always terminates.
    pub fn effective(&self) -> Self {
        if self.is_unbounded() {
            Self::after_tests(DEFAULT_MAX_TESTS)
        } else {
            *self
        }
    }

    /// True once any configured threshold is reached
    pub fn should_stop(&self, state: &StopState) -> bool {
        let conditions = self.effective();

        conditions.max_duration.map_or(false, |max| state.elapsed >= max)
            || conditions.max_errors.map_or(false, |max| state.errors >= max)
            || conditions.max_tests.map_or(false, |max| state.tests >= max)
    }
}
