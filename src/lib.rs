//! FinCoach Engine
//!
//! The decision logic behind a personal-finance coaching client:
//! - Scores financial health from a snapshot of income, expenses, balance and credit
//! - Simulates what a purchase does to liquidity and goal timelines
//! - Runs a thought → action → observation trace that mixes local simulation
//!   with a remote natural-language advisor
//! - Relays anomalies flagged by an external analyzer
//!
//! Every public entry point resolves with a usable value. Remote failures are
//! folded into the reply text (advisor) or an empty list (analyzer).

pub mod advisor;
pub mod anomaly;
pub mod api;
pub mod classifier;
pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod reasoning;
pub mod simulator;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{IntentClassifier, QueryIntent};
pub use credential::Credential;
pub use engine::FinCoachEngine;
