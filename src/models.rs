//! Core data models for the FinCoach engine

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;

/// Credit score assumed when the profile carries none
pub const DEFAULT_CREDIT_SCORE: i64 = 600;

//
// ================= Snapshot =================
//

/// Point-in-time, read-only view of a user's finances.
///
/// Absent or `null` numeric fields deserialize to 0, and the credit score to
/// [`DEFAULT_CREDIT_SCORE`], so downstream arithmetic never sees a hole.
/// `creditScore` and `credit_score` may both be present; the camelCase key wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SnapshotWire")]
pub struct FinancialSnapshot {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
    pub credit_score: i64,
    pub goals: Vec<Goal>,
}

/// Lenient wire form of [`FinancialSnapshot`].
#[derive(Deserialize)]
struct SnapshotWire {
    #[serde(default, deserialize_with = "number_or_zero")]
    income: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    expenses: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    balance: f64,
    #[serde(default, rename = "creditScore")]
    credit_score: Option<f64>,
    #[serde(default, rename = "credit_score")]
    credit_score_snake: Option<f64>,
    #[serde(default, deserialize_with = "goals_or_empty")]
    goals: Vec<Goal>,
}

impl From<SnapshotWire> for FinancialSnapshot {
    fn from(wire: SnapshotWire) -> Self {
        // Profiles store the score as a JSON number that may carry a fraction.
        let credit_score = wire
            .credit_score
            .or(wire.credit_score_snake)
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64)
            .unwrap_or(DEFAULT_CREDIT_SCORE);

        Self {
            income: wire.income,
            expenses: wire.expenses,
            balance: wire.balance,
            credit_score,
            goals: wire.goals,
        }
    }
}

impl FinancialSnapshot {
    pub fn new(income: f64, expenses: f64, balance: f64, credit_score: i64) -> Self {
        Self {
            income,
            expenses,
            balance,
            credit_score,
            goals: Vec::new(),
        }
    }

    pub fn with_goals(mut self, goals: Vec<Goal>) -> Self {
        self.goals = goals;
        self
    }

    /// Income minus expenses; may be negative.
    pub fn monthly_surplus(&self) -> f64 {
        self.income - self.expenses
    }

    /// SHA-256 of the snapshot's JSON form, for correlating log lines
    /// without writing raw figures to them.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        if serde_json::to_writer(&mut HashWriter(&mut hasher), self).is_err() {
            return String::new();
        }

        hex::encode(hasher.finalize())
    }
}

impl Default for FinancialSnapshot {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, DEFAULT_CREDIT_SCORE)
    }
}

/// A savings goal. `id` may arrive as `id` or `_id`, string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GoalWire")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub current: f64,
    pub target: f64,
}

#[derive(Deserialize)]
struct GoalWire {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient_string")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "number_or_zero")]
    current: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    target: f64,
}

impl From<GoalWire> for Goal {
    fn from(wire: GoalWire) -> Self {
        Self {
            id: wire.id.or(wire.mongo_id).unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            current: wire.current,
            target: wire.target,
        }
    }
}

impl Goal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, current: f64, target: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current,
            target,
        }
    }

    /// Progress towards the target in whole percent.
    pub fn progress_percent(&self) -> i64 {
        round_half_up(self.current / self.target.max(1.0) * 100.0)
    }
}

fn number_or_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Strings pass through; numbers and other scalars are rendered as text.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn goals_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Goal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Goal>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Rounds half-way cases towards positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

//
// ================= Health =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Strong,
    Fair,
    Weak,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub savings_ratio: f64,
    pub liquidity_score: u8,
    pub debt_score: u8,
    pub investment_score: u8,
}

//
// ================= Simulation =================
//

/// Month-granularity outcome of a hypothetical purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub safe: bool,
    pub impact_percent: i64,
    /// Months of free cash flow the purchase consumes.
    pub delay_estimate: i64,
    pub projected_balance: Vec<f64>,
    pub immediate_balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

/// Day-granularity estimate used by the reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimate {
    pub safe: bool,
    pub impact_percent: i64,
    pub delay_days: i64,
    pub delayed_goal: String,
}

//
// ================= Reasoning =================
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum TraceStep {
    Thought(String),
    Action(String),
    Observation(String),
}

impl TraceStep {
    pub fn kind(&self) -> StepKind {
        match self {
            TraceStep::Thought(_) => StepKind::Thought,
            TraceStep::Action(_) => StepKind::Action,
            TraceStep::Observation(_) => StepKind::Observation,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            TraceStep::Thought(text) | TraceStep::Action(text) | TraceStep::Observation(text) => {
                text
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Thought,
    Action,
    Observation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub steps: Vec<TraceStep>,
    pub response: String,
}

impl ReasoningResult {
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(TraceStep::kind).collect()
    }
}

//
// ================= Anomalies =================
//

/// A flagged irregularity. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Thought => "thought",
            StepKind::Action => "action",
            StepKind::Observation => "observation",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthBand::Strong => "Strong",
            HealthBand::Fair => "Fair",
            HealthBand::Weak => "Weak",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let snapshot: FinancialSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.income, 0.0);
        assert_eq!(snapshot.expenses, 0.0);
        assert_eq!(snapshot.balance, 0.0);
        assert_eq!(snapshot.credit_score, DEFAULT_CREDIT_SCORE);
        assert!(snapshot.goals.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let snapshot: FinancialSnapshot = serde_json::from_str(
            r#"{"income": null, "expenses": 1200, "balance": null, "creditScore": null, "goals": null}"#,
        )
        .unwrap();
        assert_eq!(snapshot.income, 0.0);
        assert_eq!(snapshot.expenses, 1200.0);
        assert_eq!(snapshot.credit_score, DEFAULT_CREDIT_SCORE);
    }

    #[test]
    fn test_snake_case_credit_and_goal_alias() {
        let snapshot: FinancialSnapshot = serde_json::from_str(
            r#"{"income": 5000, "credit_score": 780,
                "goals": [{"_id": "g1", "name": "Car", "current": 250, "target": 1000}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.credit_score, 780);
        assert_eq!(snapshot.goals[0].id, "g1");
        assert_eq!(snapshot.goals[0].progress_percent(), 25);
    }

    #[test]
    fn test_both_credit_keys_prefer_camel_case() {
        let snapshot: FinancialSnapshot = serde_json::from_str(
            r#"{"income": 5000, "creditScore": 760, "credit_score": 700}"#,
        )
        .unwrap();
        assert_eq!(snapshot.credit_score, 760);

        let snapshot: FinancialSnapshot =
            serde_json::from_str(r#"{"creditScore": null, "credit_score": 700}"#).unwrap();
        assert_eq!(snapshot.credit_score, 700);
    }

    #[test]
    fn test_numeric_goal_ids() {
        let snapshot: FinancialSnapshot = serde_json::from_str(
            r#"{"goals": [
                {"id": 1, "name": "Car", "current": 250, "target": 1000},
                {"_id": "g2", "id": null, "name": "Trip"},
                {"id": "g3", "_id": "m3"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.goals[0].id, "1");
        assert_eq!(snapshot.goals[0].progress_percent(), 25);
        assert_eq!(snapshot.goals[1].id, "g2");
        assert_eq!(snapshot.goals[1].target, 0.0);
        assert_eq!(snapshot.goals[2].id, "g3");
        assert_eq!(snapshot.goals[2].name, "");
    }

    #[test]
    fn test_serialized_snapshot_reads_back() {
        let snapshot = FinancialSnapshot::new(5000.0, 3000.0, 10000.0, 720)
            .with_goals(vec![Goal::new("g1", "Car", 10.0, 100.0)]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["creditScore"], 720);
        assert_eq!(serde_json::from_value::<FinancialSnapshot>(json).unwrap(), snapshot);
    }

    #[test]
    fn test_goal_progress_guards_zero_target() {
        let goal = Goal::new("g", "Emergency fund", 50.0, 0.0);
        assert_eq!(goal.progress_percent(), 5000);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = FinancialSnapshot::new(5000.0, 3000.0, 10000.0, 720);
        let b = a.clone();
        let c = FinancialSnapshot::new(5000.0, 3000.0, 10001.0, 720);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_trace_step_wire_format() {
        let json = serde_json::to_value(TraceStep::Action("run".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "action", "content": "run"}));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(f64::NAN), 0);
    }
}
