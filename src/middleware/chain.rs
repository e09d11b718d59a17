//! Priority-ordered middleware chain.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::{Middleware, MiddlewareResult};
use crate::core::{Context, Request, Response};

/// Middleware sorted by priority; request hooks run in order, response
/// hooks in reverse.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `middleware` at its priority position.
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self.middlewares.sort_by_key(|m| m.priority());
        self
    }

    /// Names in request order.
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Run one request through the chain and `handler`.
    ///
    /// When a request hook answers early the handler is skipped, but the
    /// response hooks still see the answer so it is logged and decorated
    /// like any other.
    pub async fn process<F, Fut>(&self, req: Request, ctx: &mut Context, handler: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        let res = match self.run_request_hooks(req, ctx) {
            MiddlewareResult::Next(req) => handler(req).await,
            MiddlewareResult::Stop(res) => res,
        };

        let ctx: &Context = ctx;
        self.middlewares
            .iter()
            .rev()
            .fold(res, |res, mw| mw.on_response(res, ctx))
    }

    fn run_request_hooks(&self, mut req: Request, ctx: &mut Context) -> MiddlewareResult {
        for mw in &self.middlewares {
            match mw.on_request(req, ctx) {
                MiddlewareResult::Next(next) => req = next,
                MiddlewareResult::Stop(res) => {
                    debug!(
                        middleware = mw.name(),
                        status = %res.status(),
                        "request answered by middleware"
                    );
                    return MiddlewareResult::Stop(res);
                }
            }
        }
        MiddlewareResult::Next(req)
    }
}
