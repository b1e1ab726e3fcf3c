// contract-fuzz/src/strategy.rs
//! Deterministic text transformations applied to a single value

use std::fmt;

/// Kind of transformation a strategy performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Leave the value unchanged
    None,
    /// Replace the value with the operand
    Replace,
    /// Append the operand
    Trail,
    /// Prepend the operand
    Prefix,
    /// Do not send a request for this case at all
    Skip,
}

/// One transformation plus its operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzingStrategy {
    kind: StrategyKind,
    operand: String,
}

impl FuzzingStrategy {
    pub fn none() -> Self {
        Self::with(StrategyKind::None, "")
    }

    pub fn replace(operand: impl Into<String>) -> Self {
        Self::with(StrategyKind::Replace, operand)
    }

    pub fn trail(operand: impl Into<String>) -> Self {
        Self::with(StrategyKind::Trail, operand)
    }

    pub fn prefix(operand: impl Into<String>) -> Self {
        Self::with(StrategyKind::Prefix, operand)
    }

    /// A skip carries the reason as its operand
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::with(StrategyKind::Skip, reason)
    }

    fn with(kind: StrategyKind, operand: impl Into<String>) -> Self {
        Self {
            kind,
            operand: operand.into(),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub fn is_skip(&self) -> bool {
        self.kind == StrategyKind::Skip
    }

    /// Apply the transformation. `Skip` returns the original untouched;
    /// callers must check [`is_skip`](Self::is_skip) before dispatching.
    pub fn apply(&self, original: &str) -> String {
        match self.kind {
            StrategyKind::None | StrategyKind::Skip => original.to_string(),
            StrategyKind::Replace => self.operand.clone(),
            StrategyKind::Trail => format!("{}{}", original, self.operand),
            StrategyKind::Prefix => format!("{}{}", self.operand, original),
        }
    }
}

impl fmt::Display for FuzzingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            StrategyKind::None => "NOOP",
            StrategyKind::Replace => "REPLACE",
            StrategyKind::Trail => "TRAIL",
            StrategyKind::Prefix => "PREFIX",
            StrategyKind::Skip => "SKIP",
        };
        write!(f, "{} with {:?}", name, self.operand)
    }
}

/// Insert `value` at the character midpoint of `original`.
///
/// The split falls on a char boundary.
pub fn splice_midpoint(original: &str, value: &str) -> String {
    let middle = original.chars().count() / 2;
    let byte_index = original
        .char_indices()
        .nth(middle)
        .map(|(index, _)| index)
        .unwrap_or(original.len());

    let mut spliced = String::with_capacity(original.len() + value.len());
    spliced.push_str(&original[..byte_index]);
    spliced.push_str(value);
    spliced.push_str(&original[byte_index..]);
    spliced
}
