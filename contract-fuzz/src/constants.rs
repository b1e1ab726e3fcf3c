// contract-fuzz/src/constants.rs
//! Shared constants for the fuzzing engine

/// Maximum number of tests for a random fuzzing run when no stop threshold is configured
pub const DEFAULT_MAX_TESTS: u64 = 10_000;

/// Default timeout for a single HTTP dispatch (in milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Separator joining object keys of nested field names
pub const FIELD_SEPARATOR: char = '#';

/// Prefix of comment lines in strings files
pub const COMMENT_PREFIX: &str = "# ";

/// Keywords of the security DSL
pub mod dsl {
    /// Wildcard path entry applied when a path has no entry of its own
    pub const ALL: &str = "all";
    pub const EXPECTED_RESPONSE_CODE: &str = "expected_response_code";
    pub const DESCRIPTION: &str = "description";
    pub const HTTP_METHOD: &str = "http_method";
    pub const STRINGS_FILE: &str = "strings_file";
    pub const TARGET_FIELDS: &str = "target_fields";
    pub const TARGET_FIELD_TYPES: &str = "target_field_types";
    /// Reserved type token selecting every header
    pub const HTTP_HEADERS: &str = "http_headers";
    /// Reserved type token selecting the whole body
    pub const HTTP_BODY: &str = "http_body";
}

/// Keys of custom mutator files
pub mod mutator_keys {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const VALUES: &str = "values";
}

/// Environment variables overriding file configuration
pub mod env {
    pub const MAX_TESTS: &str = "CONTRACT_FUZZ_MAX_TESTS";
    pub const MAX_ERRORS: &str = "CONTRACT_FUZZ_MAX_ERRORS";
    pub const MAX_DURATION: &str = "CONTRACT_FUZZ_MAX_DURATION";
    pub const SEED: &str = "CONTRACT_FUZZ_SEED";
    pub const MUTATORS_FOLDER: &str = "CONTRACT_FUZZ_MUTATORS_FOLDER";
}
