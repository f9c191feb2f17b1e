//! Anomaly ingestion
//!
//! Relays the irregularities flagged by the external analyzer. Display of
//! anomalies is best-effort, so every failure collapses to an empty list.

use crate::credential::Credential;
use crate::error::EngineError;
use crate::models::Anomaly;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Seam for the external analyzer.
#[async_trait]
pub trait AnomalySource: Send + Sync {
    async fn analyze(&self, credential: &Credential) -> Result<Vec<Anomaly>>;
}

#[derive(Debug, Deserialize)]
struct AnalyzerPayload {
    #[serde(default)]
    anomalies: Option<Vec<serde_json::Value>>,
}

impl AnalyzerPayload {
    /// Decode entries one at a time so a bad entry does not sink the rest.
    fn into_anomalies(self) -> Vec<Anomaly> {
        self.anomalies
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(anomaly) => Some(anomaly),
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable anomaly entry");
                    None
                }
            })
            .collect()
    }
}

pub struct HttpAnalyzer {
    client: Client,
    url: String,
}

impl HttpAnalyzer {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AnomalySource for HttpAnalyzer {
    async fn analyze(&self, credential: &Credential) -> Result<Vec<Anomaly>> {
        let response = credential.apply(self.client.get(&self.url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::AnalyzerStatus {
                status: status.as_u16(),
            });
        }

        let payload: AnalyzerPayload = response.json().await?;
        Ok(payload.into_anomalies())
    }
}

/// Best-effort front for an [`AnomalySource`].
#[derive(Clone)]
pub struct AnomalyIngestor {
    source: Arc<dyn AnomalySource>,
}

impl AnomalyIngestor {
    pub fn new(source: Arc<dyn AnomalySource>) -> Self {
        Self { source }
    }

    /// Fetch the current anomalies. Never fails; any error yields an empty list.
    pub async fn fetch_anomalies(&self, credential: &Credential) -> Vec<Anomaly> {
        match self.source.analyze(credential).await {
            Ok(anomalies) => {
                info!(count = anomalies.len(), "Anomalies fetched");
                anomalies
            }
            Err(EngineError::AnalyzerStatus { status }) => {
                debug!(status, "Analyzer declined request, showing no anomalies");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Anomaly fetch failed, showing no anomalies");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn ingestor_for(server: &MockServer) -> AnomalyIngestor {
        let analyzer = HttpAnalyzer::new(format!("{}/api/finances/analyze", server.uri())).unwrap();
        AnomalyIngestor::new(Arc::new(analyzer))
    }

    #[tokio::test]
    async fn test_relays_anomalies_unchanged() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/finances/analyze"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "anomalies": [
                    {"type": "spike", "reason": "Dining spend 3x average"},
                    {"type": "duplicate", "reason": "Two identical charges"}
                ]
            })))
            .mount(&server)
            .await;

        let anomalies = ingestor_for(&server)
            .await
            .fetch_anomalies(&Credential::bearer("tok"))
            .await;

        assert_eq!(
            anomalies,
            vec![
                Anomaly {
                    kind: "spike".to_string(),
                    reason: "Dining spend 3x average".to_string()
                },
                Anomaly {
                    kind: "duplicate".to_string(),
                    reason: "Two identical charges".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_entries_are_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/finances/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "anomalies": [
                    {"type": "spike", "reason": "Dining 3x"},
                    {"type": "duplicate"},
                    "not an object",
                    {"reason": "Unusual merchant"}
                ]
            })))
            .mount(&server)
            .await;

        let anomalies = ingestor_for(&server)
            .await
            .fetch_anomalies(&Credential::anonymous())
            .await;

        assert_eq!(
            anomalies,
            vec![
                Anomaly {
                    kind: "spike".to_string(),
                    reason: "Dining 3x".to_string()
                },
                Anomaly {
                    kind: "duplicate".to_string(),
                    reason: String::new()
                },
                Anomaly {
                    kind: String::new(),
                    reason: "Unusual merchant".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_status_yields_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let anomalies = ingestor_for(&server)
            .await
            .fetch_anomalies(&Credential::anonymous())
            .await;
        assert!(anomalies.is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_and_malformed_body_yield_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/finances/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let ingestor = ingestor_for(&server).await;
        assert!(ingestor.fetch_anomalies(&Credential::anonymous()).await.is_empty());

        server.reset().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        assert!(ingestor.fetch_anomalies(&Credential::anonymous()).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_analyzer_yields_empty() {
        // Bind then drop a listener so the port is closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let analyzer = HttpAnalyzer::new(format!("http://{}/api/finances/analyze", addr)).unwrap();
        let ingestor = AnomalyIngestor::new(Arc::new(analyzer));

        assert!(ingestor.fetch_anomalies(&Credential::anonymous()).await.is_empty());
    }
}
