//! Proxy Check - HTTP/HTTPS and SOCKS4/SOCKS5 proxy checker
//!
//! Tests whether a proxy endpoint is reachable and functional by sending one
//! request through it to a probe endpoint and checking for a 200 response.

pub mod proxy;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
