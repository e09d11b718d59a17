//! Per-connection HTTP handling.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::debug;

use crate::api::{ApiError, Diagnostics};
use crate::core::{Context, Request, Response};
use crate::middleware::MiddlewareChain;

const MAX_REQUEST_ID_LEN: usize = 64;

/// Shared state every connection task works against.
pub(crate) struct ConnectionContext {
    pub diagnostics: Diagnostics,
    pub chain: MiddlewareChain,
    pub active_connections: Arc<AtomicUsize>,
}

/// Decrements the open connection count when the task ends.
struct ConnectionGuard(Arc<AtomicUsize>);

impl ConnectionGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(counter))
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl ConnectionContext {
    /// Serve one TCP connection until the peer closes it or shutdown is signalled.
    ///
    /// On shutdown the connection finishes its in-flight request and then
    /// closes instead of waiting for the next keep-alive request.
    pub async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let _guard = ConnectionGuard::new(&self.active_connections);
        let _ = stream.set_nodelay(true);

        let ctx = Arc::clone(&self);
        let service = service_fn(move |req| {
            let ctx = Arc::clone(&ctx);
            async move { Ok::<_, Infallible>(ctx.handle_request(req, remote_addr).await) }
        });

        let conn = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        let mut draining = *shutdown_rx.borrow();
        if draining {
            conn.as_mut().graceful_shutdown();
        }

        let result = loop {
            tokio::select! {
                res = conn.as_mut() => break res,
                _ = shutdown_rx.changed(), if !draining => {
                    draining = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        };

        if let Err(err) = result {
            let err_str = err.to_string();
            if !is_connection_error(&err_str) {
                debug!(remote = %remote_addr, error = %err_str, "connection error");
            }
        }
    }

    /// Run one request through the middleware chain and the diagnostics router.
    async fn handle_request(
        &self,
        req: http::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> http::Response<Full<Bytes>> {
        let (parts, body) = req.into_parts();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(remote = %remote_addr, error = %e, "failed to read request body");
                return into_hyper(
                    ApiError::invalid_input("Failed to read request body").into_response(),
                    false,
                );
            }
        };

        let request = Request::from(http::Request::from_parts(parts, body));
        let is_head = *request.method() == Method::HEAD;

        let mut ctx = match request.request_id().filter(|id| is_valid_request_id(id)) {
            Some(id) => Context::with_request_id(remote_addr.ip(), id),
            None => Context::new(remote_addr.ip()),
        };
        let request_id = ctx.request_id.clone();
        ctx.set_response_header("x-request-id", request_id);

        let response = self
            .chain
            .process(request, &mut ctx, |req| self.diagnostics.handle(req))
            .await;

        into_hyper(apply_context_headers(response, &ctx), is_head)
    }
}

fn apply_context_headers(response: Response, ctx: &Context) -> Response {
    ctx.response_headers()
        .iter()
        .fold(response, |res, (name, value)| res.with_header(name, value))
}

fn into_hyper(response: Response, is_head: bool) -> http::Response<Full<Bytes>> {
    let response = if is_head {
        response.without_body()
    } else {
        response
    };
    http::Response::<Bytes>::from(response).map(Full::new)
}

/// Upstream request IDs are reused only when short and token-safe.
fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Peer hang-ups and idle timeouts are routine, not worth logging.
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("Connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
        || err_str.contains("HeaderTimeout")
}
