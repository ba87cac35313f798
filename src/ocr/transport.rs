//! HTTP transport used by vendor bindings.
//!
//! Kept behind a trait so bindings can be exercised against an in-memory
//! transport in tests.

use reqwest::Client;
use tracing::debug;

use crate::error::Result;

/// Status and body of a vendor HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Issues one JSON POST and returns whatever the vendor answered.
///
/// Implementations only fail when no response was received; non-200 statuses
/// are returned for the caller to classify.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse>;
}

/// reqwest-backed transport.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse> {
        // The vendor expects the raw key, not a "Bearer" prefix.
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Transport: POST {} -> {} ({} bytes)", url, status, body.len());

        Ok(TransportResponse { status, body })
    }
}
