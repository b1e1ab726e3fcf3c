// contract-fuzz/src/http.rs
//! HTTP transport for test cases

use std::time::Duration;

use async_trait::async_trait;
use contract_fuzz_types::Response;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};

use crate::error::ExecutionError;
use crate::execution::{Executor, TestCase};

/// Sends test cases to a base URL. No retries.
pub struct HttpExecutor {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpExecutor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn headers(case: &TestCase) -> Result<HeaderMap, ExecutionError> {
        let mut headers = HeaderMap::new();
        for header in &case.headers {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|e| ExecutionError::InvalidRequest(format!("header {}: {}", header.name, e)))?;
            let value = HeaderValue::from_bytes(header.value.as_bytes())
                .map_err(|e| ExecutionError::InvalidRequest(format!("header {}: {}", header.name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, case: &TestCase) -> Result<Response, ExecutionError> {
        let method = Method::from_bytes(case.method.to_string().as_bytes())
            .map_err(|e| ExecutionError::InvalidRequest(e.to_string()))?;
        let url = self.url(&case.path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url).headers(Self::headers(case)?);
        if case.method.has_body() {
            request = request.json(&case.payload);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecutionError::Timeout(self.timeout)
            } else {
                ExecutionError::Transport(e.to_string())
            }
        })?;

        let code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;
        Ok(Response { code, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{Expectation, Target};
    use contract_fuzz_types::{HeaderSpec, HttpMethod, ResponseCodeFamily};
    use serde_json::json;

    fn case(header_value: &str) -> TestCase {
        TestCase {
            fuzzer: "TestFuzzer".to_string(),
            scenario: "scenario".to_string(),
            path: "/users".to_string(),
            method: HttpMethod::Post,
            target: Target::Header("X-Trace".to_string()),
            payload: json!({"name": "ok"}),
            headers: vec![HeaderSpec::new("X-Trace", header_value, false)],
            expectation: Expectation::Family(ResponseCodeFamily::TwoXX),
        }
    }

    #[test]
    fn test_url_joining() {
        let executor = HttpExecutor::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(executor.url("/users"), "http://localhost:8080/users");
        assert_eq!(executor.url("users"), "http://localhost:8080/users");
    }

    #[test]
    fn test_unsendable_header_is_invalid_request() {
        assert!(HttpExecutor::headers(&case("abc ")).is_ok());
        assert!(matches!(
            HttpExecutor::headers(&case("a\nb")),
            Err(ExecutionError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let executor = HttpExecutor::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = executor.execute(&case("abc")).await;
        assert!(matches!(
            result,
            Err(ExecutionError::Transport(_)) | Err(ExecutionError::Timeout(_))
        ));
    }
}
