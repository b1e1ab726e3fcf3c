// contract-fuzz/src/unit.rs
//! Generic fuzzer unit: catalog group x placement x target selection x
//! expected outcome. Each concrete fuzzer is a data entry, see `registry`.

use contract_fuzz_types::{FuzzingData, HeaderSpec, ResponseCodeFamily};
use serde_json::Value;

use crate::catalog::CatalogGroup;
use crate::execution::{self, Executor, Expectation, Outcome, Target, TestCase};
use crate::payload;
use crate::reporters::TestCaseListener;
use crate::strategy::{splice_midpoint, FuzzingStrategy};
use crate::targets::{TargetSelection, TargetUniverse};

/// Where the anomalous value is placed relative to the original value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Leading,
    Trailing,
    /// The anomalous value replaces the original
    Only,
    /// The anomalous value is spliced into the middle of the original
    Within,
}

impl Placement {
    /// Strategy for one catalog entry
    pub fn strategy(&self, original: &str, value: &str) -> FuzzingStrategy {
        match self {
            Placement::Leading => FuzzingStrategy::prefix(value),
            Placement::Trailing => FuzzingStrategy::trail(value),
            Placement::Only => FuzzingStrategy::replace(value),
            Placement::Within => FuzzingStrategy::replace(splice_midpoint(original, value)),
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            Placement::Leading => "values prefixed with",
            Placement::Trailing => "values trailed with",
            Placement::Only => "values made only of",
            Placement::Within => "values containing",
        }
    }
}

/// Expected response family, possibly different for required targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedOutcome {
    pub when_required: ResponseCodeFamily,
    pub when_optional: ResponseCodeFamily,
}

impl ExpectedOutcome {
    pub fn uniform(family: ResponseCodeFamily) -> Self {
        Self {
            when_required: family,
            when_optional: family,
        }
    }

    pub fn for_target(&self, required: bool) -> ResponseCodeFamily {
        if required {
            self.when_required
        } else {
            self.when_optional
        }
    }
}

/// A generated case together with the strategy that produced it
#[derive(Debug, Clone)]
pub struct PlannedCase {
    pub strategy: FuzzingStrategy,
    pub case: TestCase,
}

/// Counts of one unit run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitReport {
    pub executed: usize,
    pub skipped: usize,
}

/// One runnable fuzzer definition
#[derive(Debug, Clone)]
pub struct FuzzerUnit {
    pub id: String,
    pub group: CatalogGroup,
    pub placement: Placement,
    pub selection: TargetSelection,
    pub expected: ExpectedOutcome,
}

impl FuzzerUnit {
    pub fn new(
        id: &str,
        group: CatalogGroup,
        placement: Placement,
        selection: TargetSelection,
        expected: ExpectedOutcome,
    ) -> Self {
        Self {
            id: id.to_string(),
            group,
            placement,
            selection,
            expected,
        }
    }

    pub fn description(&self) -> String {
        format!("{} {}", self.placement.phrase(), self.group.description())
    }

    /// Generate every case for the operation: one per (target x catalog entry),
    /// or a single SKIP case for a target the unit cannot apply to.
    pub fn cases(&self, data: &FuzzingData) -> Vec<PlannedCase> {
        self.selection
            .resolve(data)
            .iter()
            .flat_map(|target| match self.selection.universe {
                TargetUniverse::Fields(_) => self.field_cases(data, target),
                TargetUniverse::Headers => self.header_cases(data, target),
            })
            .collect()
    }

    fn field_cases(&self, data: &FuzzingData, field: &str) -> Vec<PlannedCase> {
        let target = Target::Field(field.to_string());
        let family = self.expected.for_target(data.is_required(field));

        if !self.selection.is_applicable(data.method) {
            let reason = format!("{} requests carry no body", data.method);
            return vec![self.skipped(data, target, family, reason)];
        }

        let original = match payload::get_field(&data.payload, field) {
            Some(value) => value,
            None => {
                let reason = format!("field [{}] is not present in the payload", field);
                return vec![self.skipped(data, target, family, reason)];
            }
        };

        let string_like = data.schema(field).map(|s| s.is_string_like()).unwrap_or(true);
        if !string_like {
            let reason = format!("field [{}] is not a string", field);
            return vec![self.skipped(data, target, family, reason)];
        }

        let original = payload::value_to_text(original);
        self.group
            .values()
            .iter()
            .map(|value| {
                let strategy = self.placement.strategy(&original, value);
                let mutated = strategy.apply(&original);
                let case = self.case(
                    data,
                    target.clone(),
                    family,
                    payload::replace_field(&data.payload, field, Value::String(mutated)),
                    data.headers.clone(),
                );
                PlannedCase { strategy, case }
            })
            .collect()
    }

    fn header_cases(&self, data: &FuzzingData, name: &str) -> Vec<PlannedCase> {
        let target = Target::Header(name.to_string());
        let Some(header) = data.header(name) else {
            return Vec::new();
        };
        let family = self.expected.for_target(header.required);

        if !self.selection.is_applicable(data.method) {
            let reason = format!("{} fuzzer does not apply to {}", self.id, data.method);
            return vec![self.skipped(data, target, family, reason)];
        }

        self.group
            .values()
            .iter()
            .map(|value| {
                let strategy = self.placement.strategy(&header.value, value);
                let mutated = strategy.apply(&header.value);
                let headers = data
                    .headers
                    .iter()
                    .map(|h| {
                        if h.name == header.name {
                            HeaderSpec::new(&h.name, &mutated, h.required)
                        } else {
                            h.clone()
                        }
                    })
                    .collect();
                let case = self.case(data, target.clone(), family, data.payload.clone(), headers);
                PlannedCase { strategy, case }
            })
            .collect()
    }

    fn skipped(
        &self,
        data: &FuzzingData,
        target: Target,
        family: ResponseCodeFamily,
        reason: String,
    ) -> PlannedCase {
        PlannedCase {
            strategy: FuzzingStrategy::skip(reason),
            case: self.case(data, target, family, data.payload.clone(), data.headers.clone()),
        }
    }

    fn case(
        &self,
        data: &FuzzingData,
        target: Target,
        family: ResponseCodeFamily,
        payload: Value,
        headers: Vec<HeaderSpec>,
    ) -> TestCase {
        TestCase {
            fuzzer: self.id.clone(),
            scenario: format!("Send {} in {}", self.description(), target),
            path: data.path.clone(),
            method: data.method,
            target,
            payload,
            headers,
            expectation: Expectation::Family(family),
        }
    }

    /// Generate the cases and hand each one to the execution boundary
    pub async fn run(
        &self,
        data: &FuzzingData,
        executor: &dyn Executor,
        listener: &dyn TestCaseListener,
    ) -> UnitReport {
        let planned = self.cases(data);
        let mut report = UnitReport::default();

        if planned.is_empty() {
            let target = match self.selection.universe {
                TargetUniverse::Fields(_) => Target::Body,
                TargetUniverse::Headers => Target::AllHeaders,
            };
            let family = self.expected.for_target(false);
            let case = self.case(data, target, family, data.payload.clone(), data.headers.clone());
            let reason = format!("nothing to fuzz for {} {}", data.method, data.path);
            execution::skip(listener, case, &reason);
            report.skipped += 1;
            return report;
        }

        for PlannedCase { strategy, case } in planned {
            let outcome = if strategy.is_skip() {
                execution::skip(listener, case, strategy.operand())
            } else {
                execution::dispatch(executor, listener, case).await
            };
            match outcome {
                Outcome::Skip(_) => report.skipped += 1,
                _ => report.executed += 1,
            }
        }

        report
    }
}
