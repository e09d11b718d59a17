//! Request-scoped context.

use std::any::Any;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

/// Per-request state threaded through the middleware chain.
///
/// Middleware stash values here between `on_request` and `on_response`
/// (the access log keeps the request line), and the server shell copies
/// `response_headers` onto whatever response comes back.
pub struct Context {
    pub client_ip: IpAddr,
    /// Propagated from `x-request-id` or generated.
    pub request_id: String,
    pub started_at: Instant,
    response_headers: HashMap<String, String>,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new(client_ip: IpAddr) -> Self {
        Self::with_request_id(client_ip, generate_request_id())
    }

    pub fn with_request_id(client_ip: IpAddr, request_id: impl Into<String>) -> Self {
        Self {
            client_ip,
            request_id: request_id.into(),
            started_at: Instant::now(),
            response_headers: HashMap::new(),
            values: HashMap::new(),
        }
    }

    pub fn set<T: Send + Sync + 'static>(&mut self, key: &str, value: T) {
        self.values.insert(key.to_string(), Box::new(value));
    }

    /// `None` when the key is missing or holds another type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Queue a header for the final response.
    pub fn set_response_header(&mut self, name: impl Into<String>, value: impl ToString) {
        self.response_headers.insert(name.into(), value.to_string());
    }

    pub fn response_headers(&self) -> &HashMap<String, String> {
        &self.response_headers
    }

    /// Milliseconds since the request was accepted.
    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }
}

/// Twelve hex characters from a v4 UUID.
fn generate_request_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
