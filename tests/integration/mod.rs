//! Integration tests for netdiag
//!
//! Each test starts the server in-process on an ephemeral port, backed by
//! counting fake adapters, and drives it over HTTP with reqwest.
//!
//! Run with: cargo test --test integration

mod helpers;

mod dns_lookup;
mod http_basic;
mod ping;
mod speed_test;
mod static_files;
