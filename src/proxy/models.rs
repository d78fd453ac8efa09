//! Proxy data models

use crate::proxy::error::{CheckError, CheckErrorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type string reported when the proxy type could not be resolved
pub const UNKNOWN_TYPE: &str = "unknown";

/// Proxy type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    pub const ALL: [ProxyType; 4] = [
        ProxyType::Http,
        ProxyType::Https,
        ProxyType::Socks4,
        ProxyType::Socks5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }

    /// Whether requests through this proxy are tunnelled below the HTTP layer
    pub fn is_socks(&self) -> bool {
        matches!(self, ProxyType::Socks4 | ProxyType::Socks5)
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyType {
    type Err = CheckError;

    /// Exact, case-insensitive match against the supported schemes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ProxyType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or(CheckError::UnknownType(lowered))
    }
}

/// Proxy authentication credentials, passed through to the client untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl ProxyAuth {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// A single proxy endpoint, parsed for the duration of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub proxy_type: ProxyType,
    pub auth: Option<ProxyAuth>,
}

impl ProxyEndpoint {
    /// Create a new endpoint without authentication
    pub fn new(host: String, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
            auth: None,
        }
    }

    /// Create a new endpoint with authentication
    pub fn with_auth(
        host: String,
        port: u16,
        proxy_type: ProxyType,
        username: String,
        password: String,
    ) -> Self {
        Self {
            host,
            port,
            proxy_type,
            auth: Some(ProxyAuth::new(username, password)),
        }
    }

    /// Get the proxy URL handed to the HTTP client
    pub fn url(&self) -> String {
        let auth_part = self.auth.as_ref().map_or(String::new(), |auth| {
            format!("{}:{}@", auth.username, auth.password)
        });

        format!("{}://{}{}:{}", self.proxy_type, auth_part, self.host, self.port)
    }

    /// Get the proxy URL with the password masked, for logs
    pub fn redacted(&self) -> String {
        let auth_part = self
            .auth
            .as_ref()
            .map_or(String::new(), |auth| format!("{}:***@", auth.username));

        format!("{}://{}{}:{}", self.proxy_type, auth_part, self.host, self.port)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

/// Outcome of a single `check_proxy` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub working: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub proxy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Origin address reported by the probe endpoint, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_ip: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    pub fn working(proxy_type: ProxyType, message: impl Into<String>) -> Self {
        Self {
            working: true,
            message: message.into(),
            proxy_type: proxy_type.to_string(),
            error: None,
            response_time_ms: None,
            exit_ip: None,
            checked_at: Utc::now(),
        }
    }

    pub fn failed(
        proxy_type: impl Into<String>,
        error: &CheckError,
        message: impl Into<String>,
    ) -> Self {
        Self {
            working: false,
            message: message.into(),
            proxy_type: proxy_type.into(),
            error: Some(error.kind()),
            response_time_ms: None,
            exit_ip: None,
            checked_at: Utc::now(),
        }
    }

    /// Failure for input that never resolved to a supported proxy type
    pub fn unresolved(error: &CheckError) -> Self {
        Self::failed(UNKNOWN_TYPE, error, error.to_string())
    }

    pub fn with_response_time(mut self, response_time_ms: u64) -> Self {
        self.response_time_ms = Some(response_time_ms);
        self
    }

    pub fn with_exit_ip(mut self, exit_ip: Option<String>) -> Self {
        self.exit_ip = exit_ip;
        self
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "working={} type={} message={:?}",
            self.working, self.proxy_type, self.message
        )?;
        if let Some(ms) = self.response_time_ms {
            write!(f, " time={}ms", ms)?;
        }
        if let Some(ip) = &self.exit_ip {
            write!(f, " exit_ip={}", ip)?;
        }
        Ok(())
    }
}
