//! Proxy module for checking a single proxy endpoint
//!
//! This module provides functionality for:
//! - Parsing proxy URLs (http, https, socks4, socks5) into endpoints
//! - Checking one proxy with a single probe request and a timeout
//! - Reporting the outcome as a structured result with an error kind

pub mod checker;
pub mod error;
pub mod models;
pub mod parser;
pub mod transport;

pub use checker::{
    check_proxy, CheckerConfig, ProxyChecker, DEFAULT_TEST_URL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{CheckError, CheckErrorKind};
pub use models::{CheckResult, ProxyAuth, ProxyEndpoint, ProxyType, UNKNOWN_TYPE};
pub use parser::ProxyParser;
pub use transport::{ProbeResponse, ProbeTransport, ReqwestTransport};
