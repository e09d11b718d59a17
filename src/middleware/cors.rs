//! Cross-origin resource sharing.
//!
//! Preflight (`OPTIONS`) requests are answered here with `204 No Content`;
//! every other response gets `Access-Control-Allow-Origin` when the
//! request's origin is allowed.

use http::{Method, StatusCode};

use crate::core::{Context, Request, Response};

use super::{Middleware, MiddlewareResult};

const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, Accept";
const MAX_AGE: &str = "86400";

const ORIGIN_KEY: &str = "cors.origin";

/// CORS middleware.
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
    allow_any: bool,
}

impl CorsMiddleware {
    /// Allow the given origins; `*` allows any.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        let allow_any = allowed_origins.iter().any(|o| o == "*");
        Self {
            allowed_origins,
            allow_any,
        }
    }

    /// Value for `Access-Control-Allow-Origin`, if the origin is allowed.
    fn allow_origin_value<'a>(&self, origin: Option<&'a str>) -> Option<&'a str> {
        if self.allow_any {
            return Some("*");
        }
        origin.filter(|o| {
            let o = o.trim_end_matches('/');
            self.allowed_origins.iter().any(|allowed| allowed == o)
        })
    }
}

impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn on_request(&self, req: Request, ctx: &mut Context) -> MiddlewareResult {
        if let Some(origin) = req.origin() {
            ctx.set(ORIGIN_KEY, origin.to_string());
        }

        if req.method() == Method::OPTIONS {
            return MiddlewareResult::Stop(
                Response::empty(StatusCode::NO_CONTENT)
                    .with_header("access-control-allow-methods", ALLOW_METHODS)
                    .with_header("access-control-allow-headers", ALLOW_HEADERS)
                    .with_header("access-control-max-age", MAX_AGE),
            );
        }

        MiddlewareResult::Next(req)
    }

    fn on_response(&self, res: Response, ctx: &Context) -> Response {
        let origin = ctx.get::<String>(ORIGIN_KEY).map(String::as_str);

        match self.allow_origin_value(origin) {
            Some("*") => res.with_header("access-control-allow-origin", "*"),
            Some(origin) => res
                .with_header("access-control-allow-origin", origin)
                .with_header("vary", "Origin"),
            None => res,
        }
    }
}
