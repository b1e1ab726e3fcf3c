use std::collections::{BTreeMap, BTreeSet};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of a contract operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[display(fmt = "GET")]
    Get,
    #[display(fmt = "POST")]
    Post,
    #[display(fmt = "PUT")]
    Put,
    #[display(fmt = "PATCH")]
    Patch,
    #[display(fmt = "DELETE")]
    Delete,
    #[display(fmt = "HEAD")]
    Head,
    #[display(fmt = "OPTIONS")]
    Options,
    #[display(fmt = "TRACE")]
    Trace,
}

impl HttpMethod {
    /// Parse a method name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Whether requests with this method normally carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

/// Schema information for a single request field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Schema type (string, integer, number, boolean, object, array)
    #[serde(rename = "type", default)]
    pub schema_type: Option<String>,
    /// Schema format (email, uuid, date-time, ...)
    #[serde(default)]
    pub format: Option<String>,
}

impl FieldSchema {
    pub fn new(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: None,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// True when the schema is a string or carries no type at all
    pub fn is_string_like(&self) -> bool {
        self.schema_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("string"))
            .unwrap_or(true)
    }
}

/// A header declared by the contract for an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSpec {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub required: bool,
}

impl HeaderSpec {
    pub fn new(name: &str, value: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            required,
        }
    }
}

/// Immutable fuzzing context for one (path, method) contract operation.
///
/// Built once per operation by the contract provider. Fuzzers never modify it;
/// every mutation produces a fresh payload value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzingData {
    /// Contract path, e.g. `/users/{id}`
    pub path: String,
    pub method: HttpMethod,
    /// Current JSON payload
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub headers: Vec<HeaderSpec>,
    /// Field name to schema, nested names joined with `#`
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,
    #[serde(default)]
    pub required_fields: BTreeSet<String>,
    /// All field names reachable for the current method
    #[serde(default)]
    pub all_fields: BTreeSet<String>,
}

impl FuzzingData {
    pub fn new(path: &str, method: HttpMethod, payload: Value) -> Self {
        Self {
            path: path.to_string(),
            method,
            payload,
            headers: Vec::new(),
            fields: BTreeMap::new(),
            required_fields: BTreeSet::new(),
            all_fields: BTreeSet::new(),
        }
    }

    pub fn with_field(mut self, name: &str, schema: FieldSchema) -> Self {
        self.fields.insert(name.to_string(), schema);
        self.all_fields.insert(name.to_string());
        self
    }

    pub fn with_required_field(mut self, name: &str, schema: FieldSchema) -> Self {
        self.required_fields.insert(name.to_string());
        self.with_field(name, schema)
    }

    pub fn with_header(mut self, header: HeaderSpec) -> Self {
        self.headers.push(header);
        self
    }

    pub fn schema(&self, field: &str) -> Option<&FieldSchema> {
        self.fields.get(field)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.contains(field)
    }

    pub fn header(&self, name: &str) -> Option<&HeaderSpec> {
        self.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name))
    }
}
