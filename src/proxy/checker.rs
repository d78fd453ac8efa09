//! Proxy checker module for checking proxy validity

use crate::proxy::error::CheckError;
use crate::proxy::models::{CheckResult, ProxyEndpoint, ProxyType};
use crate::proxy::parser::ProxyParser;
use crate::proxy::transport::{ProbeTransport, ReqwestTransport};
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::time::{Duration, Instant};

/// Default timeout for proxy checks in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test proxies against
pub const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Default user agent for probe requests
const DEFAULT_USER_AGENT: &str = concat!("proxy-check/", env!("CARGO_PKG_VERSION"));

const HTTP_WORKING: &str = "HTTP/HTTPS proxy working";
const SOCKS_WORKING: &str = "SOCKS proxy working";
const DIRECT_WORKING: &str = "Probe endpoint reachable";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// URL to test proxies against
    pub test_url: String,
    /// User agent sent with probe requests
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_url: DEFAULT_TEST_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Successful probe
struct Probe {
    message: &'static str,
    exit_ip: Option<String>,
}

/// Proxy checker for validating proxies, one request per check
pub struct ProxyChecker<T = ReqwestTransport> {
    config: CheckerConfig,
    transport: T,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        let transport = ReqwestTransport::new(config.user_agent.clone());
        Self { config, transport }
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ProbeTransport> ProxyChecker<T> {
    /// Create a proxy checker sending its probes through `transport`
    pub fn with_transport(config: CheckerConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check a proxy, resolving its type from `proxy_type` or the URL scheme
    ///
    /// Never fails: every problem, including bad input, is reported in the
    /// returned [`CheckResult`]. Empty URLs and unknown types return without
    /// any network I/O.
    pub async fn check_proxy(&self, proxy_url: &str, proxy_type: Option<&str>) -> CheckResult {
        if proxy_url.trim().is_empty() {
            return CheckResult::unresolved(&CheckError::EmptyUrl);
        }

        let type_name = proxy_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| ProxyParser::scheme_of(proxy_url));

        let resolved = match type_name.parse::<ProxyType>() {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("Not checking {:?}: {}", proxy_url, e);
                return CheckResult::unresolved(&e);
            }
        };

        let endpoint = match ProxyParser::parse_endpoint(proxy_url, resolved) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                debug!("Not checking {:?}: {}", proxy_url, e);
                return CheckResult::failed(resolved.to_string(), &e, e.to_string());
            }
        };

        let start = Instant::now();
        let outcome = if resolved.is_socks() {
            self.probe_socks(&endpoint).await
        } else {
            self.probe_http(&endpoint).await
        };

        match outcome {
            Ok(probe) => {
                let elapsed = start.elapsed().as_millis() as u64;
                info!("{} working ({}ms)", endpoint, elapsed);
                CheckResult::working(resolved, probe.message)
                    .with_response_time(elapsed)
                    .with_exit_ip(probe.exit_ip)
            }
            Err(e) => {
                warn!("{} failed: {}", endpoint, e);
                CheckResult::failed(resolved.to_string(), &e, failure_message(resolved, &e))
            }
        }
    }

    /// Check an HTTP or HTTPS proxy; a URL without scheme is taken as HTTP
    pub async fn check_http_proxy(&self, proxy_url: &str) -> Result<String, CheckError> {
        let endpoint = endpoint_in_family(proxy_url, false)?;
        self.probe_http(&endpoint)
            .await
            .map(|probe| probe.message.to_string())
    }

    /// Check a SOCKS4 or SOCKS5 proxy; a URL without scheme is taken as SOCKS4
    pub async fn check_socks_proxy(&self, proxy_url: &str) -> Result<String, CheckError> {
        let endpoint = endpoint_in_family(proxy_url, true)?;
        self.probe_socks(&endpoint)
            .await
            .map(|probe| probe.message.to_string())
    }

    /// Request the probe endpoint without any proxy
    pub async fn check_direct(&self) -> Result<String, CheckError> {
        self.probe(None).await?;
        Ok(DIRECT_WORKING.to_string())
    }

    async fn probe_http(&self, endpoint: &ProxyEndpoint) -> Result<Probe, CheckError> {
        let exit_ip = self.probe(Some(endpoint)).await?;
        Ok(Probe {
            message: HTTP_WORKING,
            exit_ip,
        })
    }

    async fn probe_socks(&self, endpoint: &ProxyEndpoint) -> Result<Probe, CheckError> {
        if !self.transport.supports_socks() {
            return Err(CheckError::SocksUnavailable);
        }
        let exit_ip = self.probe(Some(endpoint)).await?;
        Ok(Probe {
            message: SOCKS_WORKING,
            exit_ip,
        })
    }

    /// One GET to the test URL; succeeds only on status 200
    async fn probe(&self, proxy: Option<&ProxyEndpoint>) -> Result<Option<String>, CheckError> {
        let timeout = self.config.timeout;

        let response = match tokio::time::timeout(
            timeout,
            self.transport.get(proxy, &self.config.test_url, timeout),
        )
        .await
        {
            Ok(response) => response?,
            Err(_) => return Err(CheckError::Timeout(timeout)),
        };

        if response.status != StatusCode::OK {
            return Err(CheckError::Status(response.status));
        }

        Ok(extract_origin(&response.body))
    }
}

/// Check a proxy with the default configuration and the given timeout
pub async fn check_proxy(
    proxy_url: &str,
    proxy_type: Option<&str>,
    timeout: Duration,
) -> CheckResult {
    ProxyChecker::with_config(CheckerConfig::new().with_timeout(timeout))
        .check_proxy(proxy_url, proxy_type)
        .await
}

fn endpoint_in_family(proxy_url: &str, socks: bool) -> Result<ProxyEndpoint, CheckError> {
    if proxy_url.trim().is_empty() {
        return Err(CheckError::EmptyUrl);
    }

    let proxy_type = if proxy_url.contains("://") {
        ProxyParser::scheme_of(proxy_url).parse::<ProxyType>()?
    } else if socks {
        ProxyType::Socks4
    } else {
        ProxyType::Http
    };

    if proxy_type.is_socks() != socks {
        let family = if socks { "SOCKS" } else { "HTTP/HTTPS" };
        return Err(CheckError::MalformedInput(format!(
            "{} is not a {} proxy",
            proxy_url.trim(),
            family
        )));
    }

    ProxyParser::parse_endpoint(proxy_url, proxy_type)
}

fn failure_message(proxy_type: ProxyType, error: &CheckError) -> String {
    match error {
        CheckError::SocksUnavailable => error.to_string(),
        _ if proxy_type.is_socks() => format!("SOCKS proxy failed: {}", error),
        _ => format!("HTTP/HTTPS proxy failed: {}", error),
    }
}

/// The `origin` field of an httpbin-style JSON body
fn extract_origin(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("origin")?.as_str().map(String::from)
}
