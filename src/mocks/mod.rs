//! Mock implementations for testing.
//!
//! Provides a scripted transport so the full client stack can be
//! exercised without network access. Enable the `mocks` feature to use
//! it from downstream crates.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A scripted response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a 200 response with a JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    /// Creates a response with the given status and JSON body.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

enum Scripted {
    Response(MockResponse),
    Error(TransportError),
}

/// Mock HTTP transport driven by a scripted queue.
///
/// Responses are served in queue order; once the queue is empty the
/// default response applies. Every request is recorded for inspection.
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

impl MockTransport {
    /// Creates a transport with an empty script.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Response(response));
    }

    /// Queues a response with the given status and body.
    pub fn queue_status(&self, status: u16, body: &str) {
        self.queue(MockResponse::with_status(status, body));
    }

    /// Queues a transport failure.
    pub fn queue_error(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Scripted::Error(error));
    }

    /// Sets the response served once the queue is empty.
    pub fn set_default(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Returns every recorded request.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the most recent recorded request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests sent through this transport.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_scripted(&self) -> Scripted {
        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        Scripted::Response(
            self.default_response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| {
                    MockResponse::with_status(500, r#"{"error":"No mock response configured"}"#)
                }),
        )
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        match self.next_scripted() {
            Scripted::Response(response) => Ok(HttpResponse {
                status: response.status,
                headers: response.headers,
                body: response.body,
            }),
            Scripted::Error(error) => Err(error),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Fixtures for common validation responses.
pub mod fixtures {
    use super::MockResponse;

    /// Body returned by a passing verification.
    pub const VERIFICATION_SUCCESS: &str = r#"{"verification":{"code":1002}}"#;

    /// 200 response with a passing verification body.
    pub fn verification_success() -> MockResponse {
        MockResponse::json(VERIFICATION_SUCCESS)
    }

    /// 503 response in the API's error shape.
    pub fn service_unavailable() -> MockResponse {
        MockResponse::with_status(503, r#"{"error":{"message":"Service unavailable"}}"#)
    }

    /// 404 response in the API's error shape.
    pub fn not_found() -> MockResponse {
        MockResponse::with_status(404, r#"{"error":{"message":"Resource not found"}}"#)
    }
}
