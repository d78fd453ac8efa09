//! Outbound probe requests
//!
//! Every request gets its own client configured with exactly one proxy (or
//! explicitly none), so a check never changes how any other request is routed.

use crate::proxy::error::{error_chain, CheckError};
use crate::proxy::models::ProxyEndpoint;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::Duration;

/// Response of a single probe request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues one GET request, optionally through a proxy
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn get(
        &self,
        proxy: Option<&ProxyEndpoint>,
        url: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse, CheckError>;

    /// Whether SOCKS4/SOCKS5 proxies can be used at all
    fn supports_socks(&self) -> bool {
        true
    }
}

/// Transport backed by a fresh `reqwest::Client` per request
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// Build a client routed through `proxy`, or with proxies disabled
    /// (including any from the environment) when `proxy` is `None`
    pub fn build_client(
        &self,
        proxy: Option<&ProxyEndpoint>,
        timeout: Duration,
    ) -> Result<Client, CheckError> {
        let builder = Client::builder()
            .timeout(timeout)
            .user_agent(&self.user_agent);

        let builder = match proxy {
            Some(endpoint) => {
                // Proxy::all routes both http and https targets through the endpoint
                let reqwest_proxy = ReqwestProxy::all(endpoint.url())
                    .map_err(|e| CheckError::MalformedInput(error_chain(&e)))?;
                builder.proxy(reqwest_proxy)
            }
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| CheckError::from_reqwest(&e, timeout))
    }
}

#[async_trait]
impl ProbeTransport for ReqwestTransport {
    async fn get(
        &self,
        proxy: Option<&ProxyEndpoint>,
        url: &str,
        timeout: Duration,
    ) -> Result<ProbeResponse, CheckError> {
        match proxy {
            Some(endpoint) => debug!("GET {} via {}", url, endpoint),
            None => debug!("GET {} direct", url),
        }

        let client = self.build_client(proxy, timeout)?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| CheckError::from_reqwest(&e, timeout))?;

        let status = response.status();
        // Only the status decides the outcome; a truncated body is not a failure
        let body = response.text().await.unwrap_or_default();

        Ok(ProbeResponse { status, body })
    }

    fn supports_socks(&self) -> bool {
        cfg!(feature = "socks")
    }
}
