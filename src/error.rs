//! Error types for the FinCoach engine
//!
//! Public entry points never return these: the reasoning engine folds them into
//! the reply text and the anomaly ingestor folds them into an empty list. They
//! exist for the client layer underneath, where `?` keeps the code flat.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {

    // =============================
    // Engine Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analyzer returned status {status}")]
    AnalyzerStatus { status: u16 },

    #[error("Background task failed: {0}")]
    Task(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Task(err.to_string())
    }
}
