// contract-fuzz/src/mutators/custom.rs
//! Mutators defined by files in an operator-supplied folder.
//!
//! Each file is a flat YAML mapping:
//!
//! ```yaml
//! name: sql injection
//! type: replace
//! values: ["' OR 1=1 --", "\"; DROP TABLE users; --"]
//! ```
//!
//! `values` may also be written as a bracket string (`"[a, b, c]"`).

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use rand::{Rng, RngCore};
use serde::Deserialize;
use serde_json::Value;

use crate::config::StringList;
use crate::constants::mutator_keys;
use crate::error::ConfigError;
use crate::mutators::Mutator;
use crate::payload;

/// What a custom mutator does with a drawn candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomMutatorKind {
    /// Append the candidate to the current value
    Trail,
    /// Insert the candidate at a random interior position
    Insert,
    /// Prepend the candidate to the current value
    Prefix,
    /// Substitute the value with the candidate
    Replace,
    /// Replace the whole payload with the candidate
    ReplaceBody,
    /// Add the candidate as new keys next to the field
    InBody,
}

impl CustomMutatorKind {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trail" => Ok(CustomMutatorKind::Trail),
            "insert" => Ok(CustomMutatorKind::Insert),
            "prefix" => Ok(CustomMutatorKind::Prefix),
            "replace" => Ok(CustomMutatorKind::Replace),
            "replace_body" => Ok(CustomMutatorKind::ReplaceBody),
            "in_body" => Ok(CustomMutatorKind::InBody),
            other => Err(ConfigError::UnknownMutatorType(other.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMutatorFile {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    values: Option<StringList>,
}

/// Validated content of one mutator file
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMutatorConfig {
    pub name: String,
    pub kind: CustomMutatorKind,
    pub values: Vec<String>,
}

impl CustomMutatorConfig {
    /// Parse one mutator file
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let raw: RawMutatorFile = serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut missing = Vec::new();
        if raw.name.is_none() {
            missing.push(mutator_keys::NAME.to_string());
        }
        if raw.kind.is_none() {
            missing.push(mutator_keys::TYPE.to_string());
        }
        if raw.values.is_none() {
            missing.push(mutator_keys::VALUES.to_string());
        }

        match (raw.name, raw.kind, raw.values) {
            (Some(name), Some(kind), Some(values)) => Ok(Self {
                name,
                kind: CustomMutatorKind::parse(&kind)?,
                values: values.into_vec(),
            }),
            _ => Err(ConfigError::MissingKeys(missing)),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }
}

/// A mutator backed by a `CustomMutatorConfig`
#[derive(Debug, Clone)]
pub struct CustomMutator {
    config: CustomMutatorConfig,
}

impl CustomMutator {
    /// Fails when the config has no candidate values
    pub fn new(config: CustomMutatorConfig) -> Result<Self, ConfigError> {
        if config.values.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: mutator_keys::VALUES.to_string(),
                reason: format!("mutator [{}] has no candidate values", config.name),
            });
        }
        Ok(Self { config })
    }

    fn candidate(&self, rng: &mut dyn RngCore) -> &str {
        let values = &self.config.values;
        &values[rng.gen_range(0..values.len())]
    }
}

impl Mutator for CustomMutator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value {
        let candidate = self.candidate(rng).to_string();
        let current = payload::get_field(payload, field)
            .map(payload::value_to_text)
            .unwrap_or_default();

        match self.config.kind {
            CustomMutatorKind::Replace => {
                payload::replace_field(payload, field, Value::String(candidate))
            }
            CustomMutatorKind::Trail => {
                payload::replace_field(payload, field, Value::String(current + &candidate))
            }
            CustomMutatorKind::Prefix => {
                payload::replace_field(payload, field, Value::String(candidate + &current))
            }
            CustomMutatorKind::Insert => {
                let chars: Vec<char> = current.chars().collect();
                let position = if chars.len() > 1 {
                    rng.gen_range(1..chars.len())
                } else {
                    chars.len()
                };
                let mut value: String = chars[..position].iter().collect();
                value.push_str(&candidate);
                value.extend(&chars[position..]);
                payload::replace_field(payload, field, Value::String(value))
            }
            CustomMutatorKind::ReplaceBody => {
                serde_json::from_str(&candidate).unwrap_or(Value::String(candidate))
            }
            CustomMutatorKind::InBody => match serde_json::from_str::<Value>(&candidate) {
                Ok(Value::Object(entries)) => entries.into_iter().fold(payload.clone(), |acc, (key, value)| {
                    payload::insert_next_to(&acc, field, &key, value)
                }),
                _ => payload::insert_next_to(payload, field, &self.config.name, Value::String(candidate)),
            },
        }
    }
}

/// Load every valid mutator file of `folder`, in file name order.
///
/// Invalid files are skipped with a diagnostic. A folder that cannot be listed
/// yields an empty set.
pub fn load_custom_mutators(folder: &Path) -> Vec<CustomMutator> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) => {
            error!("Cannot list custom mutators folder {}: {}", folder.display(), err);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    files
        .iter()
        .filter_map(|path| match CustomMutatorConfig::load(path).and_then(CustomMutator::new) {
            Ok(mutator) => {
                debug!("Loaded custom mutator {} from {}", mutator.name(), path.display());
                Some(mutator)
            }
            Err(err) => {
                warn!("Skipping custom mutator file {}: {}", path.display(), err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn mutator(kind: CustomMutatorKind, values: &[&str]) -> CustomMutator {
        CustomMutator::new(CustomMutatorConfig {
            name: "custom".to_string(),
            kind,
            values: values.iter().map(|v| v.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_parse_valid_file() {
        let config = CustomMutatorConfig::from_yaml(
            Path::new("m.yml"),
            "name: quotes\ntype: trail\nvalues: \"[', \\\"]\"\n",
        )
        .unwrap();
        assert_eq!(config.name, "quotes");
        assert_eq!(config.kind, CustomMutatorKind::Trail);
        assert_eq!(config.values, vec!["'", "\""]);
    }

    #[test]
    fn test_parse_reports_missing_keys() {
        let err = CustomMutatorConfig::from_yaml(Path::new("m.yml"), "name: broken\n").unwrap_err();
        match err {
            ConfigError::MissingKeys(keys) => assert_eq!(keys, vec!["type", "values"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = CustomMutatorConfig::from_yaml(
            Path::new("m.yml"),
            "name: x\ntype: shuffle\nvalues: [a]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMutatorType(t) if t == "shuffle"));
    }

    #[test]
    fn test_empty_values_are_rejected() {
        let config = CustomMutatorConfig {
            name: "nothing".to_string(),
            kind: CustomMutatorKind::Replace,
            values: Vec::new(),
        };
        assert!(matches!(
            CustomMutator::new(config),
            Err(ConfigError::InvalidValue { reason, .. }) if reason.contains("nothing")
        ));

        let parsed = CustomMutatorConfig::from_yaml(Path::new("m.yml"), "name: x\ntype: trail\nvalues: \"[]\"\n").unwrap();
        assert!(CustomMutator::new(parsed).is_err());
    }

    #[test]
    fn test_kinds() {
        let payload = json!({"name": "ok", "age": 3});
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(
            mutator(CustomMutatorKind::Replace, &["x"]).mutate(&payload, "name", &mut rng),
            json!({"name": "x", "age": 3})
        );
        assert_eq!(
            mutator(CustomMutatorKind::Trail, &["x"]).mutate(&payload, "name", &mut rng),
            json!({"name": "okx", "age": 3})
        );
        assert_eq!(
            mutator(CustomMutatorKind::Prefix, &["x"]).mutate(&payload, "name", &mut rng),
            json!({"name": "xok", "age": 3})
        );
        assert_eq!(
            mutator(CustomMutatorKind::Insert, &["x"]).mutate(&payload, "name", &mut rng),
            json!({"name": "oxk", "age": 3})
        );
        assert_eq!(
            mutator(CustomMutatorKind::ReplaceBody, &["[1, 2]"]).mutate(&payload, "name", &mut rng),
            json!([1, 2])
        );
        assert_eq!(
            mutator(CustomMutatorKind::ReplaceBody, &["not json"]).mutate(&payload, "name", &mut rng),
            json!("not json")
        );
        assert_eq!(
            mutator(CustomMutatorKind::InBody, &["{\"admin\": true}"]).mutate(&payload, "name", &mut rng),
            json!({"name": "ok", "age": 3, "admin": true})
        );
    }

    #[test]
    fn test_load_skips_bad_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("e.yml"), "name: empty\ntype: trail\nvalues: []\n").unwrap();
        fs::write(dir.path().join("b.yml"), "name: second\ntype: prefix\nvalues: [p]\n").unwrap();
        fs::write(dir.path().join("a.yml"), "name: first\ntype: replace\nvalues: [r]\n").unwrap();
        fs::write(dir.path().join("c.yml"), "name: [unclosed").unwrap();
        fs::write(dir.path().join("d.yml"), "type: trail\nvalues: [t]\n").unwrap();

        let loaded = load_custom_mutators(dir.path());
        let names: Vec<_> = loaded.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_load_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_custom_mutators(&dir.path().join("nope")).is_empty());
    }
}
