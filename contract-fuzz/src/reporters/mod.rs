// contract-fuzz/src/reporters/mod.rs
//! Collecting and reporting test case outcomes

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use contract_fuzz_types::HttpMethod;
use log::warn;

use crate::execution::{Outcome, Target, TestCase};

/// Record of a single test case, handed to the reporting collaborator
#[derive(Debug, Clone)]
pub struct TestCaseRecord {
    pub fuzzer: String,
    pub scenario: String,
    pub path: String,
    pub method: HttpMethod,
    pub target: Target,
    pub response_code: Option<u16>,
    pub outcome: Outcome,
}

impl TestCaseRecord {
    pub fn new(case: &TestCase, response_code: Option<u16>, outcome: Outcome) -> Self {
        Self {
            fuzzer: case.fuzzer.clone(),
            scenario: case.scenario.clone(),
            path: case.path.clone(),
            method: case.method,
            target: case.target.clone(),
            response_code,
            outcome,
        }
    }
}

/// Receives outcomes. The engine never writes reports itself.
pub trait TestCaseListener: Send + Sync {
    fn record(&self, record: TestCaseRecord);

    /// Configuration problems found while generating cases
    fn record_error(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Running counters, safe to share between concurrent executors
#[derive(Debug, Default)]
pub struct RunStatistics {
    executed: AtomicU64,
    passed: AtomicU64,
    failed: AtomicU64,
    errors: AtomicU64,
    skipped: AtomicU64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::Pass => &self.passed,
            Outcome::Fail(_) => &self.failed,
            Outcome::Error(_) => &self.errors,
            Outcome::Skip(_) => &self.skipped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.executed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }

    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Cases that never got a response
    pub fn transport_errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    /// Failures plus transport errors
    pub fn errors(&self) -> u64 {
        self.failed() + self.transport_errors()
    }
}

/// In-memory listener keeping every record plus aggregate counters
#[derive(Debug, Default)]
pub struct RecordingListener {
    records: Mutex<Vec<TestCaseRecord>>,
    config_errors: Mutex<Vec<String>>,
    stats: RunStatistics,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TestCaseRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn config_errors(&self) -> Vec<String> {
        self.config_errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Print a summary of the run
    pub fn print_summary(&self) {
        let records = self.records();
        let mut per_fuzzer: HashMap<String, usize> = HashMap::new();
        for record in &records {
            *per_fuzzer.entry(record.fuzzer.clone()).or_insert(0) += 1;
        }

        println!("\n=== Contract Fuzzing Results ===");
        println!("Total test cases: {}", self.stats.executed());
        println!("  passed:  {}", self.stats.passed());
        println!("  failed:  {}", self.stats.failed());
        println!("  errors:  {}", self.stats.transport_errors());
        println!("  skipped: {}", self.stats.skipped());

        if !per_fuzzer.is_empty() {
            println!("\nTest cases per fuzzer:");
            let mut fuzzers: Vec<_> = per_fuzzer.into_iter().collect();
            fuzzers.sort();
            for (fuzzer, count) in fuzzers {
                println!("  {}: {}", fuzzer, count);
            }
        }

        let failures: Vec<_> = records.iter().filter(|r| r.outcome.is_error()).collect();
        if !failures.is_empty() {
            println!("\nFailures:");
            for record in failures {
                println!(
                    "  {} {} {} [{}]: {}",
                    record.fuzzer, record.method, record.path, record.target, record.outcome
                );
            }
        }

        let config_errors = self.config_errors();
        if !config_errors.is_empty() {
            println!("\nConfiguration errors:");
            for message in config_errors {
                println!("  {}", message);
            }
        }
    }
}

impl TestCaseListener for RecordingListener {
    fn record(&self, record: TestCaseRecord) {
        self.stats.observe(&record.outcome);
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    fn record_error(&self, message: &str) {
        warn!("{}", message);
        if let Ok(mut errors) = self.config_errors.lock() {
            errors.push(message.to_string());
        }
    }
}
