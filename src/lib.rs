//! netdiag - network diagnostics over HTTP, powered by Rust and Tokio.
//!
//! The server answers a handful of JSON endpoints that report the caller's
//! public IP, resolve DNS records, ping hosts, describe the host machine and
//! hand out random payloads for download speed tests. Two static pages in
//! `STATIC_DIR` provide a browser front end.
//!
//! # Architecture
//!
//! Every external facility sits behind a trait so handlers can be exercised
//! with fakes:
//!
//! - [`dns::DnsResolver`] - system resolver plus per-type record queries
//! - [`probe::PingProbe`] - the `ping` executable, or canned output
//! - [`system::HostMetrics`] - platform, CPU, memory and disk figures
//! - [`upstream::PublicIpClient`] - IP-echo and geolocation services
//!
//! # Example
//!
//! ```rust,ignore
//! use netdiag::api::{Adapters, Diagnostics, Settings};
//! use netdiag::{middleware, Config, Server};
//!
//! let config = Config::from_env()?;
//! let diagnostics = Diagnostics::new(Adapters::from_config(&config)?, Settings::from_config(&config));
//! let chain = middleware::default_chain(&config.middleware);
//! let server = Server::bind(config.server.listen_addr, diagnostics, chain).await?;
//! server.run().await;
//! ```

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod api;
pub mod config;
pub mod core;
pub mod dns;
pub mod logging;
pub mod middleware;
pub mod probe;
pub mod server;
pub mod system;
pub mod upstream;

// Re-exports for convenience
pub use config::Config;
pub use server::Server;
