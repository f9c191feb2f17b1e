//! Remote advisor client
//!
//! The advisor is the external natural-language service. This module only
//! speaks its wire format; deciding what a failure means for the user is the
//! reasoning engine's job. Uses a long-lived reqwest::Client for connection
//! pooling.

use crate::credential::Credential;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of an advisor call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorReply {
    /// 2xx; the text is absent when the payload had no `aiResponse` field.
    Answered(Option<String>),
    /// Any non-success status, with the raw body.
    Rejected { status: u16, body: String },
}

/// Seam for the natural-language service.
///
/// `Err` means the request never produced a usable response: network
/// failure or an undecodable success payload.
#[async_trait]
pub trait RemoteAdvisor: Send + Sync {
    async fn advise(&self, query: &str, credential: &Credential) -> Result<AdvisorReply>;
}

#[derive(Debug, Serialize)]
struct AdvisorRequest<'a> {
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct AdvisorPayload {
    #[serde(rename = "aiResponse")]
    ai_response: Option<serde_json::Value>,
}

impl AdvisorPayload {
    /// Reply text; non-string values are rendered as JSON, falsy ones dropped.
    fn into_text(self) -> Option<String> {
        match self.ai_response? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

/// HTTP advisor (connection-pooled)
pub struct HttpAdvisor {
    client: Client,
    url: String,
}

impl HttpAdvisor {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteAdvisor for HttpAdvisor {
    async fn advise(&self, query: &str, credential: &Credential) -> Result<AdvisorReply> {
        debug!(
            url = %self.url,
            authenticated = credential.is_authenticated(),
            "Calling remote advisor"
        );

        let request = self.client.post(&self.url).json(&AdvisorRequest { user: query });

        let response = credential.apply(request).send().await.map_err(|e| {
            warn!("Advisor request failed: {}", e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Advisor returned non-success status");
            return Ok(AdvisorReply::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: AdvisorPayload = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse advisor response: {}", e);
            e
        })?;

        Ok(AdvisorReply::Answered(payload.into_text()))
    }
}
