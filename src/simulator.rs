//! Purchase simulator
//!
//! Two estimates of what a one-off purchase does to a user's finances:
//! - [`quick_estimate`]: day-granularity delay, used by the reasoning trace
//! - [`simulate`]: month-granularity delay plus a balance projection
//!
//! They use different units on purpose and are kept as separate operations.
//! The purchase is modelled as a single deduction in the first projected month.

use crate::advisor::{AdvisorReply, RemoteAdvisor};
use crate::credential::Credential;
use crate::error::EngineError;
use crate::models::{round_half_up, FinancialSnapshot, QuickEstimate, SimulationResult};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Label used when the snapshot has no second goal to delay.
pub const DEFAULT_DELAYED_GOAL: &str = "Next goal";

/// Longest projection [`simulate`] will compute.
pub const MAX_HORIZON_MONTHS: u32 = 120;

const SAFE_SHARE_OF_FREE_CASH: f64 = 0.5;
const DAYS_PER_MONTH: f64 = 30.0;

/// Free cash per month, floored at 1 so it is always a safe divisor.
fn monthly_free(snapshot: &FinancialSnapshot) -> f64 {
    snapshot.monthly_surplus().max(1.0)
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

fn impact_percent(amount: f64, free: f64) -> i64 {
    round_half_up(amount / free * 100.0)
}

pub fn quick_estimate(snapshot: &FinancialSnapshot, amount: f64) -> QuickEstimate {
    let amount = sanitize_amount(amount);
    let free = monthly_free(snapshot);

    QuickEstimate {
        safe: amount < free * SAFE_SHARE_OF_FREE_CASH,
        impact_percent: impact_percent(amount, free),
        delay_days: round_half_up(amount / (free / DAYS_PER_MONTH)),
        delayed_goal: snapshot
            .goals
            .get(1)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| DEFAULT_DELAYED_GOAL.to_string()),
    }
}

/// Simulate a purchase over `horizon_months`, clamped to
/// `1..=MAX_HORIZON_MONTHS`.
pub fn simulate(snapshot: &FinancialSnapshot, amount: f64, horizon_months: u32) -> SimulationResult {
    let amount = sanitize_amount(amount);
    let free = monthly_free(snapshot);
    let surplus = snapshot.monthly_surplus();
    let horizon = horizon_months.clamp(1, MAX_HORIZON_MONTHS);

    let projected_balance = (0..horizon)
        .map(|i| {
            let deduction = if i == 0 { amount } else { 0.0 };
            snapshot.balance + surplus * f64::from(i + 1) - deduction
        })
        .collect();

    SimulationResult {
        safe: amount < free * SAFE_SHARE_OF_FREE_CASH,
        impact_percent: impact_percent(amount, free),
        delay_estimate: round_half_up(amount / free),
        projected_balance,
        immediate_balance: snapshot.balance - amount,
        advisory: None,
    }
}

/// Advisor commentary that is still in flight.
pub struct AdvisoryHandle {
    task: JoinHandle<Option<String>>,
}

impl AdvisoryHandle {
    /// Wait for the advisory text. `None` on any failure.
    pub async fn wait(self) -> Option<String> {
        match self.task.await.map_err(EngineError::from) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Advisory task did not complete");
                None
            }
        }
    }
}

/// A simulation whose numbers are ready and whose advisory is not.
pub struct PendingSimulation {
    pub result: SimulationResult,
    pub advisory: AdvisoryHandle,
}

impl PendingSimulation {
    /// Wait for the advisory and fold it into the result.
    pub async fn resolve(self) -> SimulationResult {
        let mut result = self.result;
        result.advisory = self.advisory.wait().await;
        result
    }
}

pub fn advisory_prompt(amount: f64, currency: &str) -> String {
    format!("Simulate: If I spend {} {} now, what happens?", sanitize_amount(amount), currency)
}

/// Run [`simulate`] and start the advisor call in the background.
///
/// The returned result is complete except for `advisory`; the advisor call
/// is already running when this returns. Must be called inside a tokio runtime.
pub fn simulate_with_advisory(
    snapshot: &FinancialSnapshot,
    amount: f64,
    horizon_months: u32,
    advisor: Arc<dyn RemoteAdvisor>,
    credential: Credential,
    currency: &str,
) -> PendingSimulation {
    let result = simulate(snapshot, amount, horizon_months);
    let prompt = advisory_prompt(amount, currency);

    let task = tokio::spawn(async move {
        match advisor.advise(&prompt, &credential).await {
            Ok(AdvisorReply::Answered(text)) => text.filter(|t| !t.trim().is_empty()),
            Ok(AdvisorReply::Rejected { status, .. }) => {
                debug!(status, "Advisor declined simulation advisory");
                None
            }
            Err(e) => {
                debug!(error = %e, "Simulation advisory unavailable");
                None
            }
        }
    });

    PendingSimulation {
        result,
        advisory: AdvisoryHandle { task },
    }
}
