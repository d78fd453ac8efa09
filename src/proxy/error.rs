//! Error types for proxy checks

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Messages produced by resolvers when a host name cannot be looked up
static DNS_FAILURE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)dns error|failed to lookup address|name or service not known|no such host")
        .expect("Invalid DNS failure regex")
});

/// The SOCKS connector reports an unreachable proxy without the underlying io error
static SOCKS_UNREACHABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)failed to create underlying connection")
        .expect("Invalid SOCKS unreachable regex")
});

/// Why a proxy check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("Proxy URL is empty")]
    EmptyUrl,

    #[error("Unknown proxy type: {0}")]
    UnknownType(String),

    #[error("Malformed proxy URL: {0}")]
    MalformedInput(String),

    #[error("SOCKS support not available. Rebuild with: cargo build --features socks")]
    SocksUnavailable,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("{0}")]
    Transport(String),
}

/// Discriminant of [`CheckError`], carried on every failed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckErrorKind {
    EmptyUrl,
    UnknownType,
    MalformedInput,
    SocksUnavailable,
    Timeout,
    Dns,
    ConnectionRefused,
    Status,
    Transport,
}

impl CheckError {
    pub fn kind(&self) -> CheckErrorKind {
        match self {
            CheckError::EmptyUrl => CheckErrorKind::EmptyUrl,
            CheckError::UnknownType(_) => CheckErrorKind::UnknownType,
            CheckError::MalformedInput(_) => CheckErrorKind::MalformedInput,
            CheckError::SocksUnavailable => CheckErrorKind::SocksUnavailable,
            CheckError::Timeout(_) => CheckErrorKind::Timeout,
            CheckError::Dns(_) => CheckErrorKind::Dns,
            CheckError::ConnectionRefused(_) => CheckErrorKind::ConnectionRefused,
            CheckError::Status(_) => CheckErrorKind::Status,
            CheckError::Transport(_) => CheckErrorKind::Transport,
        }
    }

    /// Map a client error onto the taxonomy, keeping its full cause chain as detail
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return CheckError::Timeout(timeout);
        }
        if err.is_builder() {
            return CheckError::MalformedInput(error_chain(err));
        }
        classify(err, timeout)
    }
}

/// Classify an arbitrary error by walking its source chain
pub fn classify(err: &(dyn StdError + 'static), timeout: Duration) -> CheckError {
    let detail = error_chain(err);

    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::TimedOut => return CheckError::Timeout(timeout),
                io::ErrorKind::ConnectionRefused => {
                    return CheckError::ConnectionRefused(detail)
                }
                _ => {}
            }
        }
        current = e.source();
    }

    if SOCKS_UNREACHABLE_REGEX.is_match(&detail) {
        CheckError::ConnectionRefused(detail)
    } else if DNS_FAILURE_REGEX.is_match(&detail) {
        CheckError::Dns(detail)
    } else {
        CheckError::Transport(detail)
    }
}

/// Render an error and its sources as `outer: inner: root`
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        // hyper and reqwest often repeat the inner message in the outer one
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}
