//! Responses as handlers and middleware see them.

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

static TEXT_HTML: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
static APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");
static OCTET_STREAM: HeaderValue = HeaderValue::from_static("application/octet-stream");

/// Sent when a payload refuses to serialize.
static SERIALIZE_FAILED: Bytes =
    Bytes::from_static(br#"{"error":"Internal server error","success":false,"code":"internal"}"#);

/// A fully buffered response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Serialize `payload` as the JSON body.
    ///
    /// A serialization failure is logged and turned into a 500 carrying the
    /// `internal` failure envelope.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        let (status, body) = match serde_json::to_vec(payload) {
            Ok(body) => (status, Bytes::from(body)),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response payload");
                (StatusCode::INTERNAL_SERVER_ERROR, SERIALIZE_FAILED.clone())
            }
        };
        Self::builder().status(status).json().body(body).build()
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::builder().status(status).build()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Header value as text; missing or non-ASCII values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Set or replace a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        insert_parsed(&mut self.headers, name.as_ref(), value.as_ref());
        self
    }

    /// Drop the body but keep status and headers, as a HEAD answer needs.
    pub fn without_body(mut self) -> Self {
        self.body = Bytes::new();
        self
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(res: Response) -> Self {
        let mut out = http::Response::new(res.body);
        *out.status_mut() = res.status;
        *out.headers_mut() = res.headers;
        out
    }
}

fn insert_parsed(headers: &mut HeaderMap, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        headers.insert(name, value);
    }
}

/// Builds a [`Response`]; status defaults to 200 and the body to empty.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl ResponseBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        insert_parsed(&mut self.headers, name.as_ref(), value.as_ref());
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE, content_type)
    }

    pub fn html(self) -> Self {
        self.header_value(CONTENT_TYPE, TEXT_HTML.clone())
    }

    pub fn json(self) -> Self {
        self.header_value(CONTENT_TYPE, APPLICATION_JSON.clone())
    }

    pub fn octet_stream(self) -> Self {
        self.header_value(CONTENT_TYPE, OCTET_STREAM.clone())
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}
