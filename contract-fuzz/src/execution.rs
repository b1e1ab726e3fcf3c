// contract-fuzz/src/execution.rs
//! Execution boundary: test case description, dispatch to the transport and
//! classification of the response against the expected outcome.

use std::fmt;

use async_trait::async_trait;
use contract_fuzz_types::{HeaderSpec, HttpMethod, Response, ResponseCodeFamily};
use log::{debug, info};
use regex::Regex;
use serde_json::Value;

use crate::error::ExecutionError;
use crate::reporters::{TestCaseListener, TestCaseRecord};

/// Location within the request a test case mutates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Field(String),
    Header(String),
    /// Every header at once
    AllHeaders,
    /// The whole body
    Body,
    /// The contract path itself
    Path,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Field(name) => write!(f, "field [{}]", name),
            Target::Header(name) => write!(f, "header [{}]", name),
            Target::AllHeaders => write!(f, "all headers"),
            Target::Body => write!(f, "whole body"),
            Target::Path => write!(f, "contract path"),
        }
    }
}

/// Rule flagging a response as interesting in random fuzzing
#[derive(Debug, Clone, Default)]
pub struct MatchRule {
    pub codes: Vec<u16>,
    pub body_regex: Option<Regex>,
}

impl MatchRule {
    pub fn new(codes: Vec<u16>, body_regex: Option<Regex>) -> Self {
        Self { codes, body_regex }
    }

    /// True when any configured criterion matches
    pub fn is_match(&self, response: &Response) -> bool {
        self.codes.contains(&response.code)
            || self
                .body_regex
                .as_ref()
                .map(|regex| regex.is_match(&response.body))
                .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.body_regex.is_none()
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "codes {:?}", self.codes)?;
        if let Some(regex) = &self.body_regex {
            write!(f, ", body /{}/", regex.as_str())?;
        }
        Ok(())
    }
}

/// Expected-outcome policy attached to a test case
#[derive(Debug, Clone)]
pub enum Expectation {
    Family(ResponseCodeFamily),
    Exact(u16),
    /// Fail when the response matches the rule, otherwise inconclusive
    Matching(MatchRule),
}

impl Expectation {
    /// Parse `"400"` as an exact code and `"4XX"` as a family
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(code) = value.parse::<u16>() {
            return Some(Expectation::Exact(code));
        }
        value.parse::<ResponseCodeFamily>().ok().map(Expectation::Family)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Family(family) => write!(f, "{}", family),
            Expectation::Exact(code) => write!(f, "{}", code),
            Expectation::Matching(rule) => write!(f, "a response not matching {}", rule),
        }
    }
}

/// Fully described request produced by a fuzzer
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Name of the fuzzer that produced the case
    pub fuzzer: String,
    pub scenario: String,
    pub path: String,
    pub method: HttpMethod,
    pub target: Target,
    pub payload: Value,
    pub headers: Vec<HeaderSpec>,
    pub expectation: Expectation,
}

/// Classification of one executed case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
    Skip(String),
    Error(String),
}

impl Outcome {
    /// Failures and transport errors both count against error thresholds
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Fail(_) | Outcome::Error(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail(reason) => write!(f, "FAIL: {}", reason),
            Outcome::Skip(reason) => write!(f, "SKIP: {}", reason),
            Outcome::Error(reason) => write!(f, "ERROR: {}", reason),
        }
    }
}

/// Transport used to send a test case to the service under test
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, case: &TestCase) -> Result<Response, ExecutionError>;
}

/// Classify a transport result against an expectation
pub fn classify(result: Result<&Response, &ExecutionError>, expectation: &Expectation) -> Outcome {
    let response = match result {
        Ok(response) => response,
        Err(err) => return Outcome::Error(err.to_string()),
    };

    match expectation {
        Expectation::Family(family) if family.matches(response.code) => Outcome::Pass,
        Expectation::Exact(code) if *code == response.code => Outcome::Pass,
        Expectation::Matching(rule) if rule.is_match(response) => {
            Outcome::Fail(format!("Response matches {}", rule))
        }
        Expectation::Matching(_) => {
            Outcome::Skip("Response does not match given matchers".to_string())
        }
        expected => Outcome::Fail(format!(
            "Unexpected response code {}, expected {}",
            response.code, expected
        )),
    }
}

/// Send one case through the executor, classify the response and record it
pub async fn dispatch(
    executor: &dyn Executor,
    listener: &dyn TestCaseListener,
    case: TestCase,
) -> Outcome {
    debug!("{}: {} {} {}", case.fuzzer, case.method, case.path, case.scenario);

    let result = executor.execute(&case).await;
    let outcome = classify(result.as_ref(), &case.expectation);
    let code = result.as_ref().ok().map(|response| response.code);

    debug!("{}: {} -> {}", case.fuzzer, case.target, outcome);
    listener.record(TestCaseRecord::new(&case, code, outcome.clone()));
    outcome
}

/// Record a case as skipped without sending it
pub fn skip(listener: &dyn TestCaseListener, case: TestCase, reason: &str) -> Outcome {
    info!("Skipping {} for {}: {}", case.target, case.fuzzer, reason);
    let outcome = Outcome::Skip(reason.to_string());
    listener.record(TestCaseRecord::new(&case, None, outcome.clone()));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_family() {
        let expectation = Expectation::Family(ResponseCodeFamily::FourXX);
        assert_eq!(classify(Ok(&Response::new(400, "")), &expectation), Outcome::Pass);
        assert!(matches!(
            classify(Ok(&Response::new(200, "")), &expectation),
            Outcome::Fail(reason) if reason.contains("expected 4XX")
        ));
    }

    #[test]
    fn test_classify_exact_and_transport_error() {
        let expectation = Expectation::Exact(201);
        assert_eq!(classify(Ok(&Response::new(201, "")), &expectation), Outcome::Pass);
        assert!(classify(Ok(&Response::new(200, "")), &expectation).is_error());

        let err = ExecutionError::Transport("refused".to_string());
        assert_eq!(
            classify(Err(&err), &expectation),
            Outcome::Error("Transport error: refused".to_string())
        );
    }

    #[test]
    fn test_classify_matching_rule() {
        let rule = MatchRule::new(vec![500], Some(Regex::new("(?i)stack ?trace").unwrap()));
        let expectation = Expectation::Matching(rule);

        assert!(matches!(classify(Ok(&Response::new(500, "")), &expectation), Outcome::Fail(_)));
        assert!(matches!(
            classify(Ok(&Response::new(200, "java StackTrace")), &expectation),
            Outcome::Fail(_)
        ));
        assert!(matches!(classify(Ok(&Response::new(200, "ok")), &expectation), Outcome::Skip(_)));
    }

    #[test]
    fn test_expectation_parse() {
        assert!(matches!(Expectation::parse("400"), Some(Expectation::Exact(400))));
        assert!(matches!(
            Expectation::parse("2xx"),
            Some(Expectation::Family(ResponseCodeFamily::TwoXX))
        ));
        assert!(Expectation::parse("sometimes").is_none());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::Field("name".to_string()).to_string(), "field [name]");
        assert_eq!(Target::Body.to_string(), "whole body");
    }
}
