//! Request/response middleware around the diagnostics router.
//!
//! Two middleware ship with the server, built from [`MiddlewareConfig`] by
//! [`default_chain`]:
//!
//! | Middleware | Priority | Role |
//! |------------|----------|------|
//! | [`AccessLogMiddleware`] | -90 | one `access` log line per response |
//! | [`CorsMiddleware`] | -50 | answers preflights, stamps allow-origin |
//!
//! ```text
//! Request → access_log → cors → Diagnostics::handle
//!                                      ↓
//! Response ← access_log ← cors ←───────┘
//! ```

mod chain;

pub mod access_log;
pub mod cors;

pub use access_log::AccessLogMiddleware;
pub use chain::MiddlewareChain;
pub use cors::CorsMiddleware;

use crate::config::MiddlewareConfig;
use crate::core::{Context, Request, Response};

/// Outcome of [`Middleware::on_request`].
#[derive(Debug)]
pub enum MiddlewareResult {
    /// Hand the request on.
    Next(Request),
    /// Answer now; the router is skipped but response middleware still runs.
    Stop(Response),
}

/// A request/response hook in the chain.
///
/// Lower `priority` runs earlier on the way in and later on the way out.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn on_request(&self, req: Request, _ctx: &mut Context) -> MiddlewareResult {
        MiddlewareResult::Next(req)
    }

    fn on_response(&self, res: Response, _ctx: &Context) -> Response {
        res
    }
}

/// Build the standard chain from configuration.
pub fn default_chain(config: &MiddlewareConfig) -> MiddlewareChain {
    MiddlewareChain::new()
        .add(AccessLogMiddleware::new(config.access_log))
        .add(CorsMiddleware::new(config.cors_origins.clone()))
}
