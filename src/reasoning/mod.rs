//! Reasoning trace engine - implements the linear reasoning loop
//!
//! START → LOCAL INTENT? → (ACT → OBSERVE) → DELEGATE → OBSERVE → COMPLETE
//!
//! Every exit produces a renderable [`ReasoningResult`]. Remote failures end
//! the loop in a degraded state whose reply text describes the failure; they
//! are never returned as errors.

use crate::advisor::{AdvisorReply, RemoteAdvisor};
use crate::classifier::{IntentClassifier, QueryIntent};
use crate::credential::Credential;
use crate::error::EngineError;
use crate::models::{FinancialSnapshot, ReasoningResult, TraceStep};
use crate::simulator;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod reveal;
pub use reveal::reveal;

/// Reply used when the advisor answers without any text.
pub const EMPTY_REPLY: &str = "Empty AI reply";
/// Prefix of the reply when the advisor could not be reached.
pub const NETWORK_ERROR_MARKER: &str = "Network error";
/// Prefix of the reply when the advisor returned a failure status.
pub const ADVISOR_ERROR_MARKER: &str = "AI error";

/// Append-only step log for one invocation.
#[derive(Default)]
struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    fn push(&mut self, step: TraceStep) {
        debug!(step = %step, "Trace step");
        self.steps.push(step);
    }

    fn thought(&mut self, text: impl Into<String>) {
        self.push(TraceStep::Thought(text.into()));
    }

    fn action(&mut self, text: impl Into<String>) {
        self.push(TraceStep::Action(text.into()));
    }

    fn observe(&mut self, text: impl Into<String>) {
        self.push(TraceStep::Observation(text.into()));
    }

    fn finish(self, response: String) -> ReasoningResult {
        ReasoningResult {
            steps: self.steps,
            response,
        }
    }
}

/// Message for a failed advisor call, without our own error prefixes.
fn failure_message(err: &EngineError) -> String {
    match err {
        EngineError::HttpError(e) => e.to_string(),
        EngineError::SerializationError(e) => format!("invalid advisor payload: {}", e),
        other => other.to_string(),
    }
}

pub struct ReasoningEngine {
    advisor: Arc<dyn RemoteAdvisor>,
}

impl ReasoningEngine {
    pub fn new(advisor: Arc<dyn RemoteAdvisor>) -> Self {
        Self { advisor }
    }

    /// Run one reasoning invocation. Never fails.
    pub async fn reason(
        &self,
        snapshot: &FinancialSnapshot,
        query: &str,
        credential: &Credential,
    ) -> ReasoningResult {
        let reasoning_id = Uuid::new_v4();
        let start_time = Instant::now();
        let mut trace = Trace::default();

        info!(
            reasoning_id = %reasoning_id,
            snapshot = %snapshot.fingerprint(),
            authenticated = credential.is_authenticated(),
            "Starting reasoning"
        );

        // === START ===
        trace.thought("Preparing query for the advisor.");

        // === LOCAL INTENT ===
        if let QueryIntent::Affordability { amount } = IntentClassifier::classify(query) {
            trace.action(format!("Running local purchase simulation for {}.", amount));

            let estimate = simulator::quick_estimate(snapshot, amount);

            if estimate.safe {
                trace.observe(format!(
                    "Local simulation says safe: {}% of monthly free cash.",
                    estimate.impact_percent
                ));
            } else {
                trace.observe(format!(
                    "Local simulation warns: {}% of monthly free cash, delays {} by about {} days.",
                    estimate.impact_percent, estimate.delayed_goal, estimate.delay_days
                ));
            }

            debug!(
                reasoning_id = %reasoning_id,
                safe = estimate.safe,
                impact_percent = estimate.impact_percent,
                "Local simulation complete"
            );
        }

        // === DELEGATE ===
        trace.thought("Delegating to remote advisor.");

        let response = match self.advisor.advise(query, credential).await {
            Ok(AdvisorReply::Answered(text)) => {
                trace.observe("Advisor response received.");
                text.filter(|t| !t.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY.to_string())
            }
            Ok(AdvisorReply::Rejected { status, body }) => {
                warn!(reasoning_id = %reasoning_id, status, "Advisor returned failure status");
                trace.observe(format!("Advisor service error: {}", status));
                format!("{} ({}): {}", ADVISOR_ERROR_MARKER, status, body)
            }
            Err(e) => {
                let message = failure_message(&e);
                warn!(reasoning_id = %reasoning_id, error = %message, "Advisor unreachable");
                trace.observe(format!("{}: {}", NETWORK_ERROR_MARKER, message));
                format!("{}: {}", NETWORK_ERROR_MARKER, message)
            }
        };

        // === COMPLETE ===
        let result = trace.finish(response);

        info!(
            reasoning_id = %reasoning_id,
            steps = result.steps.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Reasoning complete"
        );

        result
    }
}
