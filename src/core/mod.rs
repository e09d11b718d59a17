//! Request, response and per-request context shared by the middleware
//! chain and the endpoint handlers.

mod context;
mod request;
mod response;
mod timestamp;

pub use context::Context;
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use timestamp::Iso8601Timestamp;
