//! Nursery Insight - Observation analysis engine for childcare coordination
//!
//! Insight turns the behavioral observations parents and animators log about a
//! child into a short written summary and gentle suggestions, through a
//! deterministic pipeline: load window → normalization → pattern detection →
//! synthesis → persistence of one analytic record.
//!
//! ## Modules
//!
//! - **Journal**: Validate and append observations
//! - **Pipeline**: Analyze a child's trailing 30-day window, on demand or in batch
//! - **Store**: Persistence contracts plus in-memory and JSON file stores

pub mod config;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod journal;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod store;
pub mod synthesizer;
pub mod types;

pub use error::{AnalysisError, ObservationError, StoreError};
pub use journal::{ObservationDraft, ObservationJournal};
pub use pipeline::{synthesize, AnalysisEngine, BatchEntry};
pub use store::{AnalyticStore, InMemoryStore, JsonFileStore, ObservationSink, ObservationSource};
pub use types::{
    AnalysisOutcome, AnalysisWindow, AnalyticRecord, ChildId, Locale, Observation,
    PatternSummary, Synthesis,
};

/// Insight version
pub const INSIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name recorded in CLI reports
pub const PRODUCER_NAME: &str = "nursery-insight";
