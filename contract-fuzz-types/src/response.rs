use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Response returned by the target service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: u16,
    #[serde(default)]
    pub body: String,
}

impl Response {
    pub fn new(code: u16, body: &str) -> Self {
        Self {
            code,
            body: body.to_string(),
        }
    }
}

/// Status code family used by expected-outcome policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ResponseCodeFamily {
    #[display(fmt = "1XX")]
    OneXX,
    #[display(fmt = "2XX")]
    TwoXX,
    #[display(fmt = "3XX")]
    ThreeXX,
    #[display(fmt = "4XX")]
    FourXX,
    #[display(fmt = "5XX")]
    FiveXX,
}

impl ResponseCodeFamily {
    /// Family a concrete status code belongs to
    pub fn of(code: u16) -> Option<Self> {
        match code {
            100..=199 => Some(Self::OneXX),
            200..=299 => Some(Self::TwoXX),
            300..=399 => Some(Self::ThreeXX),
            400..=499 => Some(Self::FourXX),
            500..=599 => Some(Self::FiveXX),
            _ => None,
        }
    }

    pub fn matches(&self, code: u16) -> bool {
        Self::of(code) == Some(*self)
    }
}

impl FromStr for ResponseCodeFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1XX" => Ok(Self::OneXX),
            "2XX" => Ok(Self::TwoXX),
            "3XX" => Ok(Self::ThreeXX),
            "4XX" => Ok(Self::FourXX),
            "5XX" => Ok(Self::FiveXX),
            other => Err(format!("unknown response code family: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of_code() {
        assert_eq!(ResponseCodeFamily::of(200), Some(ResponseCodeFamily::TwoXX));
        assert_eq!(ResponseCodeFamily::of(422), Some(ResponseCodeFamily::FourXX));
        assert_eq!(ResponseCodeFamily::of(999), None);
        assert!(ResponseCodeFamily::FourXX.matches(400));
        assert!(!ResponseCodeFamily::FourXX.matches(200));
    }

    #[test]
    fn test_family_parse_and_display() {
        assert_eq!("4xx".parse::<ResponseCodeFamily>(), Ok(ResponseCodeFamily::FourXX));
        assert!("4YY".parse::<ResponseCodeFamily>().is_err());
        assert_eq!(ResponseCodeFamily::TwoXX.to_string(), "2XX");
    }
}
