//! HTTP report transport
//!
//! Each peer serves its resource report as JSON at a fixed path. One
//! `reqwest::Client` (and its connection pool) is shared by every peer client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use tracing::debug;

use super::{ReportClient, ReportClientPool, TransportError};
use crate::config::TransportConfig;
use crate::domain::{PeerAddress, ResourceReport};

/// Report client for one peer
pub struct HttpReportClient {
    http: Client,
    address: PeerAddress,
    url: String,
    timeout: Duration,
}

impl HttpReportClient {
    fn new(http: Client, address: PeerAddress, url: String, timeout: Duration) -> Self {
        Self {
            http,
            address,
            url,
            timeout,
        }
    }

    /// Full URL this client requests
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect {
                address: self.address.clone(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err)
        }
    }
}

#[async_trait]
impl ReportClient for HttpReportClient {
    async fn request_report(&self) -> Result<ResourceReport, TransportError> {
        debug!(url = %self.url, "HttpReportClient::request_report: called");
        let response = self.http.get(&self.url).send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "HttpReportClient::request_report: error status");
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<ResourceReport>().await.map_err(|e| self.classify(e))
    }
}

/// Pool of HTTP report clients keyed by peer address
pub struct HttpClientPool {
    http: Client,
    scheme: String,
    report_path: String,
    timeout: Duration,
    clients: DashMap<PeerAddress, Arc<HttpReportClient>>,
}

impl HttpClientPool {
    /// Create a pool from transport configuration
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        debug!(?config, "HttpClientPool::from_config: called");
        let timeout = config.timeout();

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            scheme: config.scheme.clone(),
            report_path: config.report_path.clone(),
            timeout,
            clients: DashMap::new(),
        })
    }

    /// Number of peers a client has been created for
    pub fn connected(&self) -> usize {
        self.clients.len()
    }

    /// Drop the cached client for a peer
    pub fn disconnect(&self, address: &PeerAddress) -> bool {
        self.clients.remove(address).is_some()
    }

    fn report_url(&self, address: &PeerAddress) -> String {
        let path = self.report_path.trim_start_matches('/');
        format!("{}://{}/{}", self.scheme, address, path)
    }
}

impl ReportClientPool for HttpClientPool {
    fn get_or_connect(&self, address: &PeerAddress) -> Result<Arc<dyn ReportClient>, TransportError> {
        if let Some(client) = self.clients.get(address) {
            let client: Arc<dyn ReportClient> = client.value().clone();
            return Ok(client);
        }

        if address.host().is_empty() {
            return Err(TransportError::Connect {
                address: address.clone(),
                message: "empty host".to_string(),
            });
        }

        debug!(%address, "HttpClientPool::get_or_connect: creating client");
        let entry = self.clients.entry(address.clone()).or_insert_with(|| {
            Arc::new(HttpReportClient::new(
                self.http.clone(),
                address.clone(),
                self.report_url(address),
                self.timeout,
            ))
        });
        let client: Arc<dyn ReportClient> = entry.value().clone();
        Ok(client)
    }
}
