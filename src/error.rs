//! Error types for Nursery Insight

use thiserror::Error;

/// Errors raised by the persistence collaborators (observation source, analytic sink)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Reasons an observation draft is rejected before it reaches the journal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("Observation category must not be empty")]
    EmptyCategory,

    #[error("Observation intensity must be between 1 and 5, got {0}")]
    IntensityOutOfRange(i32),

    #[error("Child identifier must not be empty")]
    MissingChild,
}

/// Errors that can occur while running an analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Reading observations failed; nothing was persisted.
    #[error("Failed to load observations: {0}")]
    Load(#[source] StoreError),

    /// Writing the analytic record failed; the computed summary is discarded.
    #[error("Failed to persist analytic record: {0}")]
    Persist(#[source] StoreError),

    #[error("Failed to record observation: {0}")]
    Record(#[source] StoreError),

    #[error("Failed to read analytics history: {0}")]
    History(#[source] StoreError),

    #[error("Invalid observation: {0}")]
    InvalidObservation(#[from] ObservationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
