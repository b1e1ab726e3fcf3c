// contract-fuzz/src/registry.rs
//! Built-in fuzzer units and the enabled/disabled registry

use std::collections::HashMap;

use contract_fuzz_types::{FuzzingData, ResponseCodeFamily};
use log::{info, warn};

use crate::catalog::CatalogGroup;
use crate::config::{EdgeSpacesStrategy, SanitizationStrategy};
use crate::execution::Executor;
use crate::reporters::TestCaseListener;
use crate::targets::TargetSelection;
use crate::unit::{ExpectedOutcome, FuzzerUnit, Placement, UnitReport};

use ResponseCodeFamily::{FourXX, TwoXX};

/// Field fuzzers: (id, group, placement)
const FIELD_FUZZERS: &[(&str, CatalogGroup, Placement)] = &[
    ("LeadingControlCharsInFields", CatalogGroup::ControlCharsFields, Placement::Leading),
    ("LeadingSingleCodePointEmojisInFields", CatalogGroup::SingleCodePointEmojis, Placement::Leading),
    ("LeadingMultiCodePointEmojisInFields", CatalogGroup::MultiCodePointEmojis, Placement::Leading),
    ("TrailingControlCharsInFields", CatalogGroup::ControlCharsFields, Placement::Trailing),
    ("TrailingSingleCodePointEmojisInFields", CatalogGroup::SingleCodePointEmojis, Placement::Trailing),
    ("TrailingMultiCodePointEmojisInFields", CatalogGroup::MultiCodePointEmojis, Placement::Trailing),
    ("WithinControlCharsInFields", CatalogGroup::ControlCharsFields, Placement::Within),
    ("WithinSingleCodePointEmojisInFields", CatalogGroup::SingleCodePointEmojis, Placement::Within),
    ("WithinMultiCodePointEmojisInFields", CatalogGroup::MultiCodePointEmojis, Placement::Within),
    ("InvisibleCharsOnlyInFields", CatalogGroup::InvisibleChars, Placement::Only),
    ("ControlCharsOnlyInFields", CatalogGroup::ControlCharsFields, Placement::Only),
];

/// Header fuzzers: (id, group, placement, expected when required, expected when optional)
const HEADER_FUZZERS: &[(&str, CatalogGroup, Placement, ResponseCodeFamily, ResponseCodeFamily)] = &[
    ("ControlCharsOnlyInHeaders", CatalogGroup::ControlCharsHeaders, Placement::Only, FourXX, TwoXX),
    ("LeadingControlCharsInHeaders", CatalogGroup::ControlCharsHeaders, Placement::Leading, FourXX, FourXX),
    ("TrailingControlCharsInHeaders", CatalogGroup::ControlCharsHeaders, Placement::Trailing, FourXX, FourXX),
    ("LeadingSpacesInHeaders", CatalogGroup::Whitespace, Placement::Leading, TwoXX, TwoXX),
    ("TrailingSpacesInHeaders", CatalogGroup::Whitespace, Placement::Trailing, TwoXX, TwoXX),
];

/// Registry of fuzzer units with an enabled flag per id
pub struct FuzzerRegistry {
    units: Vec<FuzzerUnit>,
    enabled: HashMap<String, bool>,
}

impl FuzzerRegistry {
    pub fn new(units: Vec<FuzzerUnit>) -> Self {
        Self {
            units,
            enabled: HashMap::new(),
        }
    }

    /// Every built-in unit, expectations derived from the service's strategies
    pub fn builtin(edge: EdgeSpacesStrategy, sanitization: SanitizationStrategy) -> Self {
        let edge_family = match edge {
            EdgeSpacesStrategy::TrimAndValidate => TwoXX,
            EdgeSpacesStrategy::ValidateAndTrim => FourXX,
        };
        let within_family = match sanitization {
            SanitizationStrategy::SanitizeAndValidate => TwoXX,
            SanitizationStrategy::ValidateAndSanitize => FourXX,
        };

        let fields = FIELD_FUZZERS.iter().map(|(id, group, placement)| {
            let expected = match placement {
                Placement::Leading | Placement::Trailing => ExpectedOutcome::uniform(edge_family),
                Placement::Within => ExpectedOutcome::uniform(within_family),
                Placement::Only => ExpectedOutcome {
                    when_required: FourXX,
                    when_optional: TwoXX,
                },
            };
            FuzzerUnit::new(id, *group, *placement, TargetSelection::body_fields(), expected)
        });

        let headers = HEADER_FUZZERS.iter().map(|(id, group, placement, required, optional)| {
            let expected = ExpectedOutcome {
                when_required: *required,
                when_optional: *optional,
            };
            FuzzerUnit::new(id, *group, *placement, TargetSelection::headers(), expected)
        });

        Self::new(fields.chain(headers).collect())
    }

    /// Apply enable/disable flags; unknown ids are reported and ignored
    pub fn with_flags(mut self, flags: &HashMap<String, bool>) -> Self {
        for (id, enabled) in flags {
            if self.unit(id).is_none() {
                warn!("Ignoring flag for unknown fuzzer {}", id);
                continue;
            }
            self.set_enabled(id, *enabled);
        }
        self
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        self.enabled.insert(id.to_string(), enabled);
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.get(id).copied().unwrap_or(true)
    }

    pub fn unit(&self, id: &str) -> Option<&FuzzerUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn units(&self) -> &[FuzzerUnit] {
        &self.units
    }

    pub fn enabled_units(&self) -> impl Iterator<Item = &FuzzerUnit> {
        self.units.iter().filter(|unit| self.is_enabled(&unit.id))
    }

    /// Run every enabled unit against one operation
    pub async fn run_all(
        &self,
        data: &FuzzingData,
        executor: &dyn Executor,
        listener: &dyn TestCaseListener,
    ) -> UnitReport {
        let mut total = UnitReport::default();
        for unit in self.enabled_units() {
            let report = unit.run(data, executor, listener).await;
            info!(
                "{}: {} executed, {} skipped for {} {}",
                unit.id, report.executed, report.skipped, data.method, data.path
            );
            total.executed += report.executed;
            total.skipped += report.skipped;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::RecordingListener;
    use crate::strategy::StrategyKind;
    use crate::testing::StaticExecutor;
    use contract_fuzz_types::{HeaderSpec, HttpMethod};
    use serde_json::json;

    fn registry() -> FuzzerRegistry {
        FuzzerRegistry::builtin(EdgeSpacesStrategy::default(), SanitizationStrategy::default())
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let registry = registry();
        let mut ids: Vec<_> = registry.units().iter().map(|u| u.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), FIELD_FUZZERS.len() + HEADER_FUZZERS.len());
    }

    #[test]
    fn test_trailing_spaces_in_headers_first_strategy() {
        let registry = registry();
        let unit = registry.unit("TrailingSpacesInHeaders").unwrap();
        let data = FuzzingData::new("/users", HttpMethod::Get, json!({}))
            .with_header(HeaderSpec::new("X-Trace", "abc", false));

        let cases = unit.cases(&data);
        assert_eq!(cases[0].strategy.kind(), StrategyKind::Trail);
        assert_eq!(cases[0].strategy.operand(), " ");
        assert_eq!(cases[0].case.headers[0].value, "abc ");
    }

    #[test]
    fn test_edge_strategy_changes_expectation() {
        let lenient = registry();
        let strict = FuzzerRegistry::builtin(
            EdgeSpacesStrategy::ValidateAndTrim,
            SanitizationStrategy::ValidateAndSanitize,
        );

        let id = "LeadingControlCharsInFields";
        assert_eq!(lenient.unit(id).unwrap().expected, ExpectedOutcome::uniform(TwoXX));
        assert_eq!(strict.unit(id).unwrap().expected, ExpectedOutcome::uniform(FourXX));

        let within = "WithinMultiCodePointEmojisInFields";
        assert_eq!(strict.unit(within).unwrap().expected, ExpectedOutcome::uniform(FourXX));
    }

    #[test]
    fn test_flags_disable_units() {
        let mut flags = HashMap::new();
        flags.insert("TrailingSpacesInHeaders".to_string(), false);
        flags.insert("NoSuchFuzzer".to_string(), false);

        let registry = registry().with_flags(&flags);
        assert!(!registry.is_enabled("TrailingSpacesInHeaders"));
        assert!(registry.is_enabled("LeadingSpacesInHeaders"));
        assert_eq!(registry.enabled_units().count(), registry.units().len() - 1);
    }

    #[tokio::test]
    async fn test_run_all_only_enabled() {
        let mut registry = FuzzerRegistry::builtin(EdgeSpacesStrategy::default(), SanitizationStrategy::default());
        for unit_id in registry.units().iter().map(|u| u.id.clone()).collect::<Vec<_>>() {
            registry.set_enabled(&unit_id, unit_id == "TrailingSpacesInHeaders");
        }

        let data = FuzzingData::new("/users", HttpMethod::Get, json!({}))
            .with_header(HeaderSpec::new("X-Trace", "abc", false));
        let listener = RecordingListener::new();
        let report = registry.run_all(&data, &StaticExecutor::new(200), &listener).await;

        assert_eq!(report.executed, CatalogGroup::Whitespace.values().len());
        assert!(listener.records().iter().all(|r| r.fuzzer == "TrailingSpacesInHeaders"));
    }
}
