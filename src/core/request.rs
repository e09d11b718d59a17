//! Request type seen by middleware and handlers.

use std::borrow::Cow;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Inbound request with its body already collected.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Undecoded query string, without the `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Collected body; the diagnostics routes ignore it.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of `name` in the query, percent-decoded with `+` as space.
    /// A bare `flag` reads as an empty value.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key) == name).then(|| decode_component(value).into_owned())
        })
    }

    /// Header value as text, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn header_by_name(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header_by_name(&header::USER_AGENT)
    }

    pub fn origin(&self) -> Option<&str> {
        self.header_by_name(&header::ORIGIN)
    }

    /// Caller-supplied `x-request-id`, before validation.
    pub fn request_id(&self) -> Option<&str> {
        self.header_by_name(&X_REQUEST_ID)
    }
}

/// Percent-decode one query component, treating `+` as space.
fn decode_component(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        Cow::Owned(
            percent_encoding::percent_decode_str(&spaced)
                .decode_utf8_lossy()
                .into_owned(),
        )
    } else {
        percent_encoding::percent_decode_str(raw).decode_utf8_lossy()
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
        }
    }
}
