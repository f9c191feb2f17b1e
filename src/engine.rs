//! Engine facade
//!
//! Bundles the four contracts (score, simulate, reason, fetch anomalies)
//! behind one handle. Callers pass the snapshot and credential on every call;
//! the facade holds only the remote collaborators and configuration.

use crate::advisor::{HttpAdvisor, RemoteAdvisor};
use crate::anomaly::{AnomalyIngestor, AnomalySource, HttpAnalyzer};
use crate::config::EngineConfig;
use crate::credential::Credential;
use crate::health;
use crate::models::{
    Anomaly, FinancialSnapshot, HealthBand, QuickEstimate, ReasoningResult, ScoreBreakdown,
    SimulationResult, TraceStep,
};
use crate::reasoning::{self, ReasoningEngine};
use crate::simulator::{self, PendingSimulation};
use crate::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Clone)]
pub struct FinCoachEngine {
    config: EngineConfig,
    advisor: Arc<dyn RemoteAdvisor>,
    reasoning: Arc<ReasoningEngine>,
    anomalies: AnomalyIngestor,
}

impl FinCoachEngine {
    /// Engine wired to the HTTP advisor and analyzer named in `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let advisor = Arc::new(HttpAdvisor::new(config.advisor_url.clone())?);
        let analyzer = Arc::new(HttpAnalyzer::new(config.analyzer_url.clone())?);

        info!(
            advisor_url = %config.advisor_url,
            analyzer_url = %config.analyzer_url,
            "FinCoach engine configured"
        );

        Ok(Self::with_collaborators(config, advisor, analyzer))
    }

    pub fn with_collaborators(
        config: EngineConfig,
        advisor: Arc<dyn RemoteAdvisor>,
        anomaly_source: Arc<dyn AnomalySource>,
    ) -> Self {
        Self {
            reasoning: Arc::new(ReasoningEngine::new(advisor.clone())),
            anomalies: AnomalyIngestor::new(anomaly_source),
            advisor,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn score(&self, snapshot: &FinancialSnapshot) -> u8 {
        health::score(snapshot)
    }

    pub fn score_report(&self, snapshot: &FinancialSnapshot) -> (u8, HealthBand, ScoreBreakdown) {
        let score = health::score(snapshot);
        (score, health::band(score), health::breakdown(snapshot))
    }

    pub fn simulate(&self, snapshot: &FinancialSnapshot, amount: f64, horizon_months: u32) -> SimulationResult {
        simulator::simulate(snapshot, amount, horizon_months)
    }

    pub fn quick_estimate(&self, snapshot: &FinancialSnapshot, amount: f64) -> QuickEstimate {
        simulator::quick_estimate(snapshot, amount)
    }

    pub fn simulate_with_advisory(
        &self,
        snapshot: &FinancialSnapshot,
        amount: f64,
        horizon_months: u32,
        credential: &Credential,
    ) -> PendingSimulation {
        simulator::simulate_with_advisory(
            snapshot,
            amount,
            horizon_months,
            self.advisor.clone(),
            credential.clone(),
            &self.config.currency,
        )
    }

    pub async fn reason(
        &self,
        snapshot: &FinancialSnapshot,
        query: &str,
        credential: &Credential,
    ) -> ReasoningResult {
        self.reasoning.reason(snapshot, query, credential).await
    }

    pub async fn fetch_anomalies(&self, credential: &Credential) -> Vec<Anomaly> {
        self.anomalies.fetch_anomalies(credential).await
    }

    /// Replay `steps` with the configured reveal delay.
    pub fn reveal(&self, steps: Vec<TraceStep>) -> mpsc::Receiver<TraceStep> {
        reasoning::reveal(steps, self.config.reveal_delay)
    }
}
