// contract-fuzz/src/targets.rs
//! Target selection: which fields or headers a fuzzer unit mutates

use contract_fuzz_types::{FuzzingData, HttpMethod};

/// Which part of the request a fuzzer unit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetUniverse {
    Fields(FieldScope),
    Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    RequiredOnly,
    All,
}

/// Declarative target rule: universe plus applicability filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelection {
    pub universe: TargetUniverse,
    /// Methods for which the unit is structurally inapplicable
    pub skip_for: Vec<HttpMethod>,
}

impl TargetSelection {
    /// All fields, skipping methods that carry no body
    pub fn body_fields() -> Self {
        Self {
            universe: TargetUniverse::Fields(FieldScope::All),
            skip_for: vec![HttpMethod::Get, HttpMethod::Delete],
        }
    }

    pub fn required_body_fields() -> Self {
        Self {
            universe: TargetUniverse::Fields(FieldScope::RequiredOnly),
            skip_for: vec![HttpMethod::Get, HttpMethod::Delete],
        }
    }

    pub fn headers() -> Self {
        Self {
            universe: TargetUniverse::Headers,
            skip_for: Vec::new(),
        }
    }

    pub fn is_applicable(&self, method: HttpMethod) -> bool {
        !self.skip_for.contains(&method)
    }

    /// Concrete target names for an operation, in stable order
    pub fn resolve(&self, data: &FuzzingData) -> Vec<String> {
        match self.universe {
            TargetUniverse::Fields(FieldScope::All) => data.all_fields.iter().cloned().collect(),
            TargetUniverse::Fields(FieldScope::RequiredOnly) => data
                .all_fields
                .iter()
                .filter(|field| data.is_required(field))
                .cloned()
                .collect(),
            TargetUniverse::Headers => data.headers.iter().map(|h| h.name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_fuzz_types::{FieldSchema, HeaderSpec};
    use serde_json::json;

    fn data() -> FuzzingData {
        FuzzingData::new("/users", HttpMethod::Post, json!({"name": "ok", "nick": "n"}))
            .with_required_field("name", FieldSchema::new("string"))
            .with_field("nick", FieldSchema::new("string"))
            .with_header(HeaderSpec::new("X-Request-Id", "1", true))
    }

    #[test]
    fn test_resolve_fields() {
        assert_eq!(TargetSelection::body_fields().resolve(&data()), vec!["name", "nick"]);
        assert_eq!(TargetSelection::required_body_fields().resolve(&data()), vec!["name"]);
    }

    #[test]
    fn test_resolve_headers() {
        assert_eq!(TargetSelection::headers().resolve(&data()), vec!["X-Request-Id"]);

        let no_headers = FuzzingData::new("/users", HttpMethod::Post, json!({}));
        assert!(TargetSelection::headers().resolve(&no_headers).is_empty());
    }

    #[test]
    fn test_applicability() {
        let selection = TargetSelection::body_fields();
        assert!(!selection.is_applicable(HttpMethod::Get));
        assert!(!selection.is_applicable(HttpMethod::Delete));
        assert!(selection.is_applicable(HttpMethod::Put));
        assert!(TargetSelection::headers().is_applicable(HttpMethod::Get));
    }
}
