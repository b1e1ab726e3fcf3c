// contract-fuzz/src/config.rs
//! Engine configuration loaded from YAML with environment overrides

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;
use crate::execution::MatchRule;
use crate::stop::StopConditions;

/// How the service treats leading/trailing anomalies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSpacesStrategy {
    /// Values are trimmed before validation, so requests should succeed
    #[default]
    TrimAndValidate,
    /// Values are validated as sent, so requests should be rejected
    ValidateAndTrim,
}

/// How the service treats anomalies inside values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizationStrategy {
    #[default]
    SanitizeAndValidate,
    ValidateAndSanitize,
}

/// Stop thresholds for random fuzzing, durations in humantime form ("30s", "5m")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StopSettings {
    pub max_duration: Option<String>,
    pub max_errors: Option<u64>,
    pub max_tests: Option<u64>,
}

/// Response match rule for random fuzzing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub codes: Vec<u16>,
    pub body_regex: Option<String>,
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzConfig {
    pub stop: StopSettings,
    pub mutators_folder: Option<PathBuf>,
    pub security_fuzzer_file: Option<PathBuf>,
    pub edge_spaces_strategy: EdgeSpacesStrategy,
    pub sanitization_strategy: SanitizationStrategy,
    /// Fuzzer id to enabled flag; unlisted fuzzers are enabled
    pub fuzzers: HashMap<String, bool>,
    pub match_response: MatchSettings,
    pub seed: Option<u64>,
    pub request_timeout: Option<String>,
}

impl FuzzConfig {
    /// Load from a YAML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `CONTRACT_FUZZ_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(max_tests) = env_parse::<u64>(constants::env::MAX_TESTS) {
            self.stop.max_tests = Some(max_tests);
        }
        if let Some(max_errors) = env_parse::<u64>(constants::env::MAX_ERRORS) {
            self.stop.max_errors = Some(max_errors);
        }
        if let Ok(duration) = env::var(constants::env::MAX_DURATION) {
            self.stop.max_duration = Some(duration);
        }
        if let Some(seed) = env_parse::<u64>(constants::env::SEED) {
            self.seed = Some(seed);
        }
        if let Ok(folder) = env::var(constants::env::MUTATORS_FOLDER) {
            self.mutators_folder = Some(PathBuf::from(folder));
        }
        self
    }

    pub fn stop_conditions(&self) -> Result<StopConditions, ConfigError> {
        let max_duration = self
            .stop
            .max_duration
            .as_deref()
            .map(|raw| parse_duration("stop.max_duration", raw))
            .transpose()?;

        Ok(StopConditions {
            max_duration,
            max_errors: self.stop.max_errors,
            max_tests: self.stop.max_tests,
        })
    }

    pub fn match_rule(&self) -> Result<MatchRule, ConfigError> {
        let body_regex = self
            .match_response
            .body_regex
            .as_deref()
            .map(|raw| {
                Regex::new(raw).map_err(|err| ConfigError::InvalidValue {
                    key: "match_response.body_regex".to_string(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(MatchRule::new(self.match_response.codes.clone(), body_regex))
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self.request_timeout.as_deref() {
            Some(raw) => parse_duration("request_timeout", raw),
            None => Ok(Duration::from_millis(constants::DEFAULT_TIMEOUT_MS)),
        }
    }
}

/// List-valued entry of a declarative file: either a YAML sequence or a
/// bracket string such as `[a, b, c]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    Items(Vec<serde_yaml::Value>),
    Bracketed(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringList::Items(items) => items.iter().filter_map(scalar_to_string).collect(),
            StringList::Bracketed(raw) => parse_bracket_list(&raw),
        }
    }
}

/// Split `[a, b, c]` into its trimmed, non-empty tokens. Brackets are optional.
pub fn parse_bracket_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(raw);

    inner
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_duration(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).map_err(|err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}: cannot parse {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = FuzzConfig::load("/definitely/not/a/config.yml").unwrap();
        assert_eq!(config.edge_spaces_strategy, EdgeSpacesStrategy::TrimAndValidate);
        assert!(config.mutators_folder.is_none());
        assert!(config.stop_conditions().unwrap().is_unbounded());
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
stop:
  max_duration: 90s
  max_tests: 500
edge_spaces_strategy: validate_and_trim
fuzzers:
  TrailingSpacesInHeaders: false
match_response:
  codes: [500, 502]
  body_regex: "(?i)exception"
seed: 7
request_timeout: 2s
"#
        )
        .unwrap();

        let config = FuzzConfig::load(file.path()).unwrap();
        let stop = config.stop_conditions().unwrap();
        assert_eq!(stop.max_duration, Some(Duration::from_secs(90)));
        assert_eq!(stop.max_tests, Some(500));
        assert_eq!(stop.max_errors, None);
        assert_eq!(config.edge_spaces_strategy, EdgeSpacesStrategy::ValidateAndTrim);
        assert_eq!(config.fuzzers.get("TrailingSpacesInHeaders"), Some(&false));
        assert_eq!(config.match_rule().unwrap().codes, vec![500, 502]);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let mut config = FuzzConfig::default();
        config.stop.max_duration = Some("soon".to_string());
        assert!(matches!(config.stop_conditions(), Err(ConfigError::InvalidValue { .. })));

        config.match_response.body_regex = Some("(".to_string());
        assert!(matches!(config.match_rule(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_string_list_forms() {
        assert_eq!(parse_bracket_list("[a, b ,c]"), vec!["a", "b", "c"]);
        assert_eq!(parse_bracket_list("single"), vec!["single"]);
        assert!(parse_bracket_list("[]").is_empty());

        let list: StringList = serde_yaml::from_str("[x, 2, true]").unwrap();
        assert_eq!(list.into_vec(), vec!["x", "2", "true"]);
        let list: StringList = serde_yaml::from_str("\"[x, y]\"").unwrap();
        assert_eq!(list.into_vec(), vec!["x", "y"]);
    }

    #[test]
    fn test_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "stop: [unclosed").unwrap();
        assert!(matches!(FuzzConfig::load(file.path()), Err(ConfigError::Yaml { .. })));
    }
}
