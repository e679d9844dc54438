// crates/milady-config-cli/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Result helpers and a stub backend for settings CLI tests.
// ============================================================================
//! ## Overview
//! Shared test helpers: Result-based assertions plus a `tiny_http` server that
//! replays canned responses and records what the client sent.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;
use std::thread::JoinHandle;
use std::time::Duration;

use milady_config_cli::BackendClient;
use milady_config_cli::BackendClientConfig;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across settings CLI integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl TestError {
    /// Creates a new test error with the provided message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError::new(message))) }
}

// ========================================================================
// Stub Backend
// ========================================================================

/// Request observed by the stub backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Request body.
    pub body: String,
    /// Authorization header, if sent.
    pub authorization: Option<String>,
}

/// Canned response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl StubResponse {
    /// JSON response with the given status.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    /// Raw text response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Local server answering one request per canned response.
pub struct StubBackend {
    /// Base URL of the server.
    pub base_url: String,
    /// Server thread returning recorded requests.
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl StubBackend {
    /// Starts the server.
    pub fn serve(responses: Vec<StubResponse>) -> TestResult<Self> {
        let server = Server::http("127.0.0.1:0").map_err(|err| err.to_string())?;
        let base_url = format!("http://{}", server.server_addr());
        let handle = std::thread::spawn(move || {
            let mut recorded = Vec::new();
            for canned in responses {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let authorization = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.as_str().to_string());
                recorded.push(RecordedRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    body,
                    authorization,
                });
                let mut response =
                    Response::from_string(canned.body).with_status_code(canned.status);
                if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
                    response = response.with_header(header);
                }
                for (name, value) in &canned.headers {
                    if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                        response = response.with_header(header);
                    }
                }
                let _ = request.respond(response);
            }
            recorded
        });
        Ok(Self {
            base_url,
            handle,
        })
    }

    /// Client pointed at this server.
    pub fn client(
        &self,
        token: Option<&str>,
        max_response_bytes: usize,
    ) -> TestResult<BackendClient> {
        let config = BackendClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
            bearer_token: token.map(str::to_string),
            max_response_bytes,
        };
        Ok(BackendClient::new(config)?)
    }

    /// Stops waiting and returns what the server saw.
    pub fn finish(self) -> TestResult<Vec<RecordedRequest>> {
        self.handle.join().map_err(|_| "stub backend thread panicked".into())
    }
}
