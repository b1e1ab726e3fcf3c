// contract-fuzz/src/lib.rs
//! Contract fuzzing engine: generates anomalous requests from an API
//! operation description, sends them through an `Executor` and classifies
//! the responses.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod execution;
pub mod http;
pub mod mutators;
pub mod payload;
pub mod random;
pub mod registry;
pub mod reporters;
pub mod security;
pub mod stop;
pub mod strategy;
pub mod targets;
pub mod unit;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use catalog::{load_strings_file, CatalogGroup};
pub use config::{EdgeSpacesStrategy, FuzzConfig, SanitizationStrategy};
pub use contract::PathVersionCheck;
pub use error::{ConfigError, ExecutionError};
pub use execution::{classify, Executor, Expectation, MatchRule, Outcome, Target, TestCase};
pub use http::HttpExecutor;
pub use mutators::{resolve_mutators, Mutator};
pub use random::{RandomFuzzer, RandomRunSummary};
pub use registry::FuzzerRegistry;
pub use reporters::{RecordingListener, RunStatistics, TestCaseListener, TestCaseRecord};
pub use security::{CustomFuzzerExecutor, DerivedTestCase, DictionaryRunner, SecurityConfig, SecurityFuzzer, SecurityReport};
pub use stop::{StopConditions, StopState};
pub use strategy::{FuzzingStrategy, StrategyKind};
pub use unit::{FuzzerUnit, Placement, UnitReport};

/// Initialize logging.
///
/// Honours `RUST_LOG` and defaults to `info`. Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
