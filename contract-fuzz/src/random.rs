// contract-fuzz/src/random.rs
//! Continuous random fuzzing: pick a field and a mutator at random, send the
//! mutated payload and keep going until a stop threshold is reached.

use std::time::{Duration, Instant};

use contract_fuzz_types::FuzzingData;
use log::{debug, info, warn};
use rand::{Rng, RngCore};

use crate::execution::{self, Executor, Expectation, MatchRule, Target, TestCase};
use crate::mutators::Mutator;
use crate::payload;
use crate::reporters::TestCaseListener;
use crate::stop::{StopConditions, StopState};

pub const RANDOM_FUZZER: &str = "RandomFuzzer";

/// Result of one random campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomRunSummary {
    pub tests: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

pub struct RandomFuzzer {
    mutators: Vec<Box<dyn Mutator>>,
    stop: StopConditions,
    match_rule: MatchRule,
}

impl RandomFuzzer {
    pub fn new(mutators: Vec<Box<dyn Mutator>>, stop: StopConditions, match_rule: MatchRule) -> Self {
        Self {
            mutators,
            stop,
            match_rule,
        }
    }

    pub fn mutators(&self) -> &[Box<dyn Mutator>] {
        &self.mutators
    }

    /// Run the campaign for one operation. Returns immediately when there is
    /// nothing to mutate or no mutator to mutate with.
    pub async fn fuzz<R: RngCore + Send>(
        &self,
        data: &FuzzingData,
        executor: &dyn Executor,
        listener: &dyn TestCaseListener,
        rng: &mut R,
    ) -> RandomRunSummary {
        if payload::is_empty_payload(&data.payload) {
            info!("Skipping {} for {} {}: payload is empty", RANDOM_FUZZER, data.method, data.path);
            return RandomRunSummary::default();
        }
        if self.mutators.is_empty() {
            info!("Skipping {} for {} {}: no mutators available", RANDOM_FUZZER, data.method, data.path);
            return RandomRunSummary::default();
        }
        let fields: Vec<&String> = data.all_fields.iter().collect();
        if fields.is_empty() {
            info!("Skipping {} for {} {}: no fields to mutate", RANDOM_FUZZER, data.method, data.path);
            return RandomRunSummary::default();
        }

        let conditions = self.stop.effective();
        if self.match_rule.is_empty() {
            warn!("No response match rule configured, every {} case is inconclusive", RANDOM_FUZZER);
        }
        if self.stop.is_unbounded() {
            info!("No stop condition configured, stopping after {:?} tests", conditions.max_tests);
        }

        let started = Instant::now();
        let mut state = StopState::default();

        while !conditions.should_stop(&state) {
            let field = fields[rng.gen_range(0..fields.len())];
            let mutator = &self.mutators[rng.gen_range(0..self.mutators.len())];
            let mutated = mutator.mutate(&data.payload, field, rng);

            let case = TestCase {
                fuzzer: RANDOM_FUZZER.to_string(),
                scenario: format!(
                    "Send a random payload mutating field [{}] with [{}] mutator",
                    field,
                    mutator.name()
                ),
                path: data.path.clone(),
                method: data.method,
                target: Target::Field(field.clone()),
                payload: mutated,
                headers: data.headers.clone(),
                expectation: Expectation::Matching(self.match_rule.clone()),
            };

            let outcome = execution::dispatch(executor, listener, case).await;
            state.tests += 1;
            if outcome.is_error() {
                state.errors += 1;
            }
            state.elapsed = started.elapsed();
        }
        debug!("{} stopping with {:?}", RANDOM_FUZZER, state);

        info!(
            "{} finished {} {}: {} tests, {} errors in {}",
            RANDOM_FUZZER,
            data.method,
            data.path,
            state.tests,
            state.errors,
            humantime::format_duration(state.elapsed)
        );

        RandomRunSummary {
            tests: state.tests,
            errors: state.errors,
            elapsed: state.elapsed,
        }
    }
}
