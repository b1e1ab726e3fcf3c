// contract-fuzz/src/contract.rs
//! Contract-level checks that need no request to the service

use std::collections::HashSet;
use std::sync::Mutex;

use contract_fuzz_types::{FuzzingData, ResponseCodeFamily};
use log::{debug, info};
use regex::Regex;

use crate::execution::{Expectation, Outcome, Target, TestCase};
use crate::reporters::{TestCaseListener, TestCaseRecord};

pub const PATH_VERSION_CHECK: &str = "PathVersionCheck";

/// Flags contract paths carrying versioning information
/// (`/v1/`, `/version1.3/`, `/{version}/`). Each path is checked once.
pub struct PathVersionCheck {
    pattern: Regex,
    checked: Mutex<HashSet<String>>,
}

impl PathVersionCheck {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"(?i)^(v\d+(\.\d+)*|version\d*(\.\d+)*|\{version\})$")?,
            checked: Mutex::new(HashSet::new()),
        })
    }

    pub fn has_version(&self, path: &str) -> bool {
        path.split('/').any(|segment| self.pattern.is_match(segment))
    }

    /// Record the outcome for the path. Returns `None` when the path was
    /// already checked.
    pub fn check(&self, data: &FuzzingData, listener: &dyn TestCaseListener) -> Option<Outcome> {
        let first_time = self
            .checked
            .lock()
            .map(|mut checked| checked.insert(data.path.clone()))
            .unwrap_or(false);
        if !first_time {
            debug!("{} already checked {}", PATH_VERSION_CHECK, data.path);
            return None;
        }

        let outcome = if self.has_version(&data.path) {
            Outcome::Fail("Path contains versioning information".to_string())
        } else {
            Outcome::Pass
        };
        info!("{} {}: {}", PATH_VERSION_CHECK, data.path, outcome);

        let case = TestCase {
            fuzzer: PATH_VERSION_CHECK.to_string(),
            scenario: "Check if the contract path contains versioning information".to_string(),
            path: data.path.clone(),
            method: data.method,
            target: Target::Path,
            payload: data.payload.clone(),
            headers: data.headers.clone(),
            expectation: Expectation::Family(ResponseCodeFamily::TwoXX),
        };
        listener.record(TestCaseRecord::new(&case, None, outcome.clone()));
        Some(outcome)
    }
}
