// contract-fuzz/src/testing.rs
//! In-memory executors for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use contract_fuzz_types::Response;

use crate::error::ExecutionError;
use crate::execution::{Executor, TestCase};

/// Answers every request with the same status code
pub struct StaticExecutor {
    code: u16,
}

impl StaticExecutor {
    pub fn new(code: u16) -> Self {
        Self { code }
    }
}

#[async_trait]
impl Executor for StaticExecutor {
    async fn execute(&self, _case: &TestCase) -> Result<Response, ExecutionError> {
        Ok(Response::new(self.code, ""))
    }
}

/// Like `StaticExecutor`, but keeps every case it receives
pub struct RecordingExecutor {
    code: u16,
    cases: Mutex<Vec<TestCase>>,
}

impl RecordingExecutor {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            cases: Mutex::new(Vec::new()),
        }
    }

    pub fn cases(&self) -> Vec<TestCase> {
        self.cases.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, case: &TestCase) -> Result<Response, ExecutionError> {
        self.cases.lock().unwrap().push(case.clone());
        Ok(Response::new(self.code, ""))
    }
}

/// Fails every request at the transport level
pub struct FailingExecutor;

#[async_trait]
impl Executor for FailingExecutor {
    async fn execute(&self, _case: &TestCase) -> Result<Response, ExecutionError> {
        Err(ExecutionError::Transport("connection refused".to_string()))
    }
}
