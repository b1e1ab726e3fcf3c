// contract-fuzz/src/catalog.rs
//! Catalog of anomalous values used by the placement fuzzers

use std::fs;
use std::path::Path;

use log::debug;

use crate::constants::COMMENT_PREFIX;
use crate::error::ConfigError;

/// Control characters accepted in body field values
const CONTROL_CHARS_FIELDS: &[&str] = &[
    "\r\n", "\u{0000}", "\u{0007}", "\u{0008}", "\n", "\u{000B}", "\u{000C}", "\r",
    "\u{001B}", "\u{001F}", "\u{007F}", "\u{0080}", "\u{0085}", "\u{009F}", "\u{200B}",
    "\u{200C}", "\u{200D}", "\u{200E}", "\u{200F}", "\u{202A}", "\u{202B}", "\u{202C}",
    "\u{202D}", "\u{202E}", "\u{2060}", "\u{2061}", "\u{2062}", "\u{2063}", "\u{2064}",
    "\u{206D}", "\u{FEFF}",
];

/// Control characters for header values. Line breaks and NUL are left out
/// since they break header framing before the request leaves the client.
const CONTROL_CHARS_HEADERS: &[&str] = &[
    "\u{0007}", "\u{0008}", "\u{000B}", "\u{000C}", "\u{001B}", "\u{001F}", "\u{007F}",
    "\u{0080}", "\u{0085}", "\u{009F}", "\u{200B}", "\u{200C}", "\u{200D}", "\u{200E}",
    "\u{200F}", "\u{202A}", "\u{202B}", "\u{202C}", "\u{202D}", "\u{202E}", "\u{2060}",
    "\u{2061}", "\u{2062}", "\u{2063}", "\u{2064}", "\u{206D}", "\u{FEFF}",
];

const INVISIBLE_CHARS: &[&str] = &[
    "\u{00AD}", "\u{180E}", "\u{200B}", "\u{200C}", "\u{200D}", "\u{2060}", "\u{2063}",
    "\u{FEFF}", "\u{034F}", "\u{115F}", "\u{3164}",
];

const SINGLE_CODE_POINT_EMOJIS: &[&str] = &[
    "\u{1F92A}", "\u{1F64B}", "\u{1F44D}", "\u{1F496}", "\u{1F60E}", "\u{1F4A9}",
    "\u{1F525}", "\u{1F680}", "\u{1F9D9}", "\u{1F47E}",
];

const MULTI_CODE_POINT_EMOJIS: &[&str] = &[
    "\u{1F469}\u{1F3FE}",
    "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}",
    "\u{1F3F3}\u{FE0F}\u{200D}\u{1F308}",
    "\u{1F1F7}\u{1F1F4}",
    "\u{1F469}\u{200D}\u{1F680}",
    "\u{1F9D1}\u{1F3FD}\u{200D}\u{1F4BB}",
    "\u{2764}\u{FE0F}\u{200D}\u{1F525}",
];

const WHITESPACE: &[&str] = &[
    " ", "\u{00A0}", "\u{2000}", "\u{2003}", "\u{2007}", "\u{202F}", "\u{205F}", "\u{3000}",
    "\t",
];

/// Semantic groups of anomalous values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogGroup {
    ControlCharsFields,
    ControlCharsHeaders,
    InvisibleChars,
    SingleCodePointEmojis,
    MultiCodePointEmojis,
    Whitespace,
}

impl CatalogGroup {
    /// Ordered values of the group. The order is stable across runs.
    pub fn values(&self) -> &'static [&'static str] {
        match self {
            Self::ControlCharsFields => CONTROL_CHARS_FIELDS,
            Self::ControlCharsHeaders => CONTROL_CHARS_HEADERS,
            Self::InvisibleChars => INVISIBLE_CHARS,
            Self::SingleCodePointEmojis => SINGLE_CODE_POINT_EMOJIS,
            Self::MultiCodePointEmojis => MULTI_CODE_POINT_EMOJIS,
            Self::Whitespace => WHITESPACE,
        }
    }

    /// Human readable name used in scenario descriptions
    pub fn description(&self) -> &'static str {
        match self {
            Self::ControlCharsFields | Self::ControlCharsHeaders => "unicode control chars",
            Self::InvisibleChars => "unicode invisible chars",
            Self::SingleCodePointEmojis => "single code point emojis",
            Self::MultiCodePointEmojis => "multi code point emojis",
            Self::Whitespace => "spaces",
        }
    }
}

/// Load a nasty strings dictionary.
///
/// One entry per non-blank line; lines starting with `# ` are comments.
/// File order is preserved.
pub fn load_strings_file(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let strings = parse_strings(&content);
    debug!("Loaded {} entries from {}", strings.len(), path.display());
    Ok(strings)
}

pub(crate) fn parse_strings(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.starts_with(COMMENT_PREFIX))
        .map(str::to_string)
        .collect()
}
