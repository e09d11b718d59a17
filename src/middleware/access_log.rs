//! One `access` line per answered request.

use crate::core::{Context, Request, Response};

use super::{Middleware, MiddlewareResult};

/// Request line captured on the way in, logged on the way out.
struct RequestLine {
    method: String,
    path: String,
    query: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
}

const REQUEST_LINE_KEY: &str = "access_log.request";

/// Writes an INFO event on target `access` once the response is final,
/// including answers produced by other middleware.
pub struct AccessLogMiddleware {
    enabled: bool,
}

impl AccessLogMiddleware {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn priority(&self) -> i32 {
        -90
    }

    fn on_request(&self, req: Request, ctx: &mut Context) -> MiddlewareResult {
        if self.enabled {
            ctx.set(
                REQUEST_LINE_KEY,
                RequestLine {
                    method: req.method().to_string(),
                    path: req.path().to_string(),
                    query: req.query().map(String::from),
                    user_agent: req.user_agent().map(String::from),
                    referer: req.header("referer").map(String::from),
                },
            );
        }

        MiddlewareResult::Next(req)
    }

    fn on_response(&self, res: Response, ctx: &Context) -> Response {
        if !self.enabled {
            return res;
        }
        let Some(line) = ctx.get::<RequestLine>(REQUEST_LINE_KEY) else {
            return res;
        };

        tracing::info!(
            target: "access",
            method = %line.method,
            path = %line.path,
            query = line.query.as_deref(),
            status = res.status().as_u16(),
            bytes = res.body_len() as u64,
            duration_ms = ctx.elapsed_ms(),
            ip = %ctx.client_ip,
            ua = line.user_agent.as_deref(),
            referer = line.referer.as_deref(),
            request_id = %ctx.request_id,
            "{} {} {}",
            line.method,
            line.path,
            res.status().as_u16()
        );

        res
    }
}
