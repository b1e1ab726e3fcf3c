// contract-fuzz/src/security.rs
//! Security DSL interpreter.
//!
//! The DSL file maps a contract path (or `all`) to named entries:
//!
//! ```yaml
//! /users:
//!   xss in names:
//!     expected_response_code: 400
//!     description: Send XSS payloads
//!     http_method: POST
//!     strings_file: xss.txt
//!     target_field_types: [string]
//! ```
//!
//! Every entry matching the operation is expanded into one `DerivedTestCase`
//! per resolved target field, each carrying the full strings dictionary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use contract_fuzz_types::{FuzzingData, HeaderSpec, HttpMethod};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::load_strings_file;
use crate::config::{scalar_to_string, StringList};
use crate::constants::dsl;
use crate::error::ConfigError;
use crate::execution::{self, Executor, Expectation, Outcome, Target, TestCase};
use crate::payload;
use crate::reporters::TestCaseListener;
use crate::unit::UnitReport;

pub const SECURITY_FUZZER: &str = "SecurityFuzzer";

/// One named entry of the DSL, as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityEntry {
    pub expected_response_code: Option<serde_yaml::Value>,
    pub description: Option<String>,
    pub http_method: Option<String>,
    pub strings_file: Option<PathBuf>,
    pub target_fields: Option<StringList>,
    pub target_field_types: Option<StringList>,
    /// Free-form keys carried to the derived cases
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SecurityEntry {
    /// Names of the mandatory keys this entry lacks
    pub fn missing_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.expected_response_code.is_none() {
            missing.push(dsl::EXPECTED_RESPONSE_CODE.to_string());
        }
        if self.description.is_none() {
            missing.push(dsl::DESCRIPTION.to_string());
        }
        if self.http_method.is_none() {
            missing.push(dsl::HTTP_METHOD.to_string());
        }
        if self.strings_file.is_none() {
            missing.push(dsl::STRINGS_FILE.to_string());
        }
        if self.target_fields.is_none() && self.target_field_types.is_none() {
            missing.push(format!("{} or {}", dsl::TARGET_FIELDS, dsl::TARGET_FIELD_TYPES));
        }
        missing
    }

    /// Whether the entry applies to `method`. Entries without a method are
    /// kept so the missing key gets reported.
    fn applies_to(&self, method: HttpMethod) -> bool {
        match self.http_method.as_deref() {
            Some(raw) => HttpMethod::parse(raw) == Some(method),
            None => true,
        }
    }

    fn expected_code(&self) -> Option<String> {
        self.expected_response_code.as_ref().and_then(scalar_to_string)
    }
}

/// A whole DSL file
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    paths: BTreeMap<String, BTreeMap<String, SecurityEntry>>,
    /// Relative strings files resolve against this folder
    base_dir: Option<PathBuf>,
}

impl SecurityConfig {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            paths: serde_yaml::from_str(content)?,
            base_dir: None,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Entries for `path`, falling back to the `all` wildcard when the path
    /// has no entry or an empty one
    pub fn entries_for(&self, path: &str) -> Option<&BTreeMap<String, SecurityEntry>> {
        self.paths
            .get(path)
            .filter(|entries| !entries.is_empty())
            .or_else(|| self.paths.get(dsl::ALL))
    }

    fn strings_path(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        }
    }
}

/// Entry expanded for a single target field
#[derive(Debug, Clone)]
pub struct DerivedTestCase {
    pub path: String,
    pub name: String,
    pub description: String,
    pub http_method: HttpMethod,
    pub expected_response_code: String,
    /// Field name, or one of the `http_headers` / `http_body` tokens
    pub field: String,
    /// The whole dictionary; every value is sent for `field`
    pub values: Vec<String>,
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl DerivedTestCase {
    pub fn expectation(&self) -> Option<Expectation> {
        Expectation::parse(&self.expected_response_code)
    }

    pub fn target(&self) -> Target {
        match self.field.as_str() {
            dsl::HTTP_HEADERS => Target::AllHeaders,
            dsl::HTTP_BODY => Target::Body,
            field => Target::Field(field.to_string()),
        }
    }
}

/// Runs derived test cases against the service
#[async_trait]
pub trait CustomFuzzerExecutor: Send + Sync {
    async fn execute(
        &self,
        case: &DerivedTestCase,
        data: &FuzzingData,
        listener: &dyn TestCaseListener,
    ) -> UnitReport;
}

/// Sends one request per dictionary value
pub struct DictionaryRunner {
    executor: Arc<dyn Executor>,
}

impl DictionaryRunner {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn test_case(&self, derived: &DerivedTestCase, data: &FuzzingData, value: &str, expectation: Expectation) -> TestCase {
        let target = derived.target();
        let (payload, headers) = match &target {
            Target::AllHeaders => (
                data.payload.clone(),
                data.headers
                    .iter()
                    .map(|h| HeaderSpec::new(&h.name, value, h.required))
                    .collect(),
            ),
            Target::Body => (
                serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string())),
                data.headers.clone(),
            ),
            Target::Field(field) | Target::Header(field) => (
                payload::replace_field(&data.payload, field, Value::String(value.to_string())),
                data.headers.clone(),
            ),
            Target::Path => (data.payload.clone(), data.headers.clone()),
        };

        TestCase {
            fuzzer: SECURITY_FUZZER.to_string(),
            scenario: derived.description.clone(),
            path: data.path.clone(),
            method: data.method,
            target,
            payload,
            headers,
            expectation,
        }
    }
}

#[async_trait]
impl CustomFuzzerExecutor for DictionaryRunner {
    async fn execute(
        &self,
        derived: &DerivedTestCase,
        data: &FuzzingData,
        listener: &dyn TestCaseListener,
    ) -> UnitReport {
        let mut report = UnitReport::default();
        let Some(expectation) = derived.expectation() else {
            listener.record_error(&format!(
                "Path [{}] entry [{}] has an invalid {}: {}",
                derived.path,
                derived.name,
                dsl::EXPECTED_RESPONSE_CODE,
                derived.expected_response_code
            ));
            return report;
        };

        for value in &derived.values {
            let case = self.test_case(derived, data, value, expectation.clone());
            match execution::dispatch(self.executor.as_ref(), listener, case).await {
                Outcome::Skip(_) => report.skipped += 1,
                _ => report.executed += 1,
            }
        }
        report
    }
}

/// Summary of one interpreter call
#[derive(Debug, Clone, Default)]
pub struct SecurityReport {
    pub derived: Vec<DerivedTestCase>,
    pub errors: Vec<String>,
    pub cases: UnitReport,
}

pub struct SecurityFuzzer {
    config: SecurityConfig,
}

impl SecurityFuzzer {
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    /// Expand the entries matching the operation. Configuration problems are
    /// reported to the listener and collected in the report.
    pub fn derive(&self, data: &FuzzingData, listener: &dyn TestCaseListener) -> SecurityReport {
        let mut report = SecurityReport::default();

        let Some(entries) = self.config.entries_for(&data.path) else {
            debug!("No security entries for {}, skipping", data.path);
            return report;
        };

        let matching: Vec<_> = entries
            .iter()
            .filter(|(_, entry)| entry.applies_to(data.method))
            .collect();
        if matching.is_empty() {
            info!("No security entries for {} {}, skipping", data.method, data.path);
            return report;
        }

        for (name, entry) in matching {
            match self.expand(data, name, entry) {
                Ok(derived) => report.derived.extend(derived),
                Err(message) => {
                    listener.record_error(&message);
                    report.errors.push(message);
                }
            }
        }
        report
    }

    fn expand(&self, data: &FuzzingData, name: &str, entry: &SecurityEntry) -> Result<Vec<DerivedTestCase>, String> {
        let missing = entry.missing_keys();
        if !missing.is_empty() {
            return Err(format!(
                "Path [{}] is missing the following mandatory entries: [{}]",
                data.path,
                missing.join(", ")
            ));
        }

        let strings_file = entry.strings_file.as_deref().unwrap_or(Path::new(""));
        let values = load_strings_file(self.config.strings_path(strings_file)).map_err(|err| {
            let message = format!("Error processing path [{}] entry [{}]: {}", data.path, name, err);
            error!("{}", message);
            message
        })?;

        let description = entry.description.clone().unwrap_or_default();
        let expected_response_code = entry.expected_code().unwrap_or_default();

        let derived = resolve_targets(entry, data)
            .into_iter()
            .map(|field| DerivedTestCase {
                path: data.path.clone(),
                name: name.to_string(),
                description: format!("{}, field [{}]", description, field),
                http_method: data.method,
                expected_response_code: expected_response_code.clone(),
                field,
                values: values.clone(),
                extra: entry.extra.clone(),
            })
            .collect::<Vec<_>>();

        if derived.is_empty() {
            info!("Entry [{}] resolves no target fields for {} {}", name, data.method, data.path);
        }
        Ok(derived)
    }

    /// Expand and execute every derived case through `runner`
    pub async fn fuzz(
        &self,
        data: &FuzzingData,
        runner: &dyn CustomFuzzerExecutor,
        listener: &dyn TestCaseListener,
    ) -> SecurityReport {
        let mut report = self.derive(data, listener);
        for derived in &report.derived {
            let unit = runner.execute(derived, data, listener).await;
            report.cases.executed += unit.executed;
            report.cases.skipped += unit.skipped;
        }
        report
    }
}

/// Fields selected by an entry: type or format matches that are set in the
/// payload, the reserved whole-request tokens, then explicit names.
fn resolve_targets(entry: &SecurityEntry, data: &FuzzingData) -> Vec<String> {
    let types: Vec<String> = entry
        .target_field_types
        .clone()
        .map(StringList::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();

    let matches_type = |field: &str| {
        data.schema(field).map_or(false, |schema| {
            let lowered = |v: &Option<String>| v.as_deref().map(str::to_lowercase);
            [lowered(&schema.schema_type), lowered(&schema.format)]
                .iter()
                .flatten()
                .any(|kind| types.contains(kind))
        })
    };

    let mut targets: Vec<String> = data
        .all_fields
        .iter()
        .filter(|field| matches_type(field) && payload::is_field_set(&data.payload, field))
        .cloned()
        .collect();

    for token in [dsl::HTTP_HEADERS, dsl::HTTP_BODY] {
        if types.iter().any(|t| t == token) {
            targets.push(token.to_string());
        }
    }

    let explicit = entry.target_fields.clone().map(StringList::into_vec).unwrap_or_default();
    for field in explicit {
        if !targets.contains(&field) {
            targets.push(field);
        }
    }
    targets
}
