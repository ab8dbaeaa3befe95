//! Analysis pipeline orchestration
//!
//! This module provides the public API for running an analysis. It orchestrates
//! the full pipeline: load → normalize → detect → synthesize → persist.

use crate::detector::PatternDetector;
use crate::encoder::AnalyticRecordEncoder;
use crate::error::AnalysisError;
use crate::loader::ObservationLoader;
use crate::normalizer::ObservationNormalizer;
use crate::store::{AnalyticStore, ObservationSource};
use crate::synthesizer::Synthesizer;
use crate::types::{
    AnalysisOutcome, AnalysisWindow, AnalyticRecord, ChildId, Locale, Observation, Synthesis,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Run normalize → detect → synthesize over in-memory observations (stateless, one-shot).
///
/// Nothing is loaded or persisted. Returns `None` for an empty slice.
///
/// # Example
/// ```ignore
/// let synthesis = synthesize(&observations, Locale::Fr);
/// ```
pub fn synthesize(observations: &[Observation], locale: Locale) -> Option<Synthesis> {
    if observations.is_empty() {
        return None;
    }

    let normalized = ObservationNormalizer::normalize_all(observations);
    let patterns = PatternDetector::detect(&normalized);
    Some(Synthesizer::new(locale).synthesize(patterns))
}

/// Result of one child's run inside a batch
#[derive(Debug)]
pub struct BatchEntry {
    pub child_id: ChildId,
    pub result: Result<AnalysisOutcome, AnalysisError>,
}

/// Analysis engine wired to its persistence collaborators.
///
/// Holds no state between runs; every run reads its own window and writes at most
/// one record.
pub struct AnalysisEngine<S, A> {
    loader: ObservationLoader<S>,
    analytics: A,
    synthesizer: Synthesizer,
}

impl<S: ObservationSource, A: AnalyticStore> AnalysisEngine<S, A> {
    /// Create an engine with French wording
    pub fn new(source: S, analytics: A) -> Self {
        Self {
            loader: ObservationLoader::new(source),
            analytics,
            synthesizer: Synthesizer::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.synthesizer = Synthesizer::new(locale);
        self
    }

    /// Run the analysis for one child over the 30 days ending now
    pub fn run(&self, child_id: &ChildId) -> Result<AnalysisOutcome, AnalysisError> {
        self.run_at(child_id, Utc::now())
    }

    /// Run the analysis for one child over the 30 days ending at `now`
    ///
    /// An empty window short-circuits to [`AnalysisOutcome::InsufficientData`]
    /// without writing anything.
    pub fn run_at(
        &self,
        child_id: &ChildId,
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let window = AnalysisWindow::trailing(now);
        info!(
            child_id = %child_id,
            window_start = %window.start,
            window_end = %window.end,
            "starting analysis"
        );

        // Stage 1: Load the window
        let observations = self
            .loader
            .load(child_id, &window)
            .map_err(AnalysisError::Load)?;

        if observations.is_empty() {
            info!(child_id = %child_id, "no observations in window, skipping analysis");
            return Ok(AnalysisOutcome::insufficient_data());
        }

        // Stage 2: Normalize
        let normalized = ObservationNormalizer::normalize_all(&observations);

        // Stage 3: Detect patterns
        let patterns = PatternDetector::detect(&normalized);
        debug!(
            child_id = %child_id,
            recurring_tags = patterns.recurring_tags.len(),
            difficult_hours = ?patterns.difficult_hours,
            high_intensity = patterns.high_intensity_count,
            "patterns detected"
        );

        // Stage 4: Synthesize text and suggestions
        let synthesis = self.synthesizer.synthesize(patterns);

        // Stage 5: Persist once
        let new_record = AnalyticRecordEncoder::encode(child_id, &window, synthesis)?;
        let record = self
            .analytics
            .create_analytic_record(new_record)
            .map_err(AnalysisError::Persist)?;

        info!(
            child_id = %child_id,
            record_id = %record.id,
            observations = observations.len(),
            suggestions = record.suggestions.len(),
            "analysis stored"
        );

        Ok(AnalysisOutcome::Completed { record })
    }

    /// Run the analysis for several children, one after another, sharing `now`
    ///
    /// A failure for one child is reported in its entry and does not stop the batch.
    pub fn run_batch(&self, child_ids: &[ChildId], now: DateTime<Utc>) -> Vec<BatchEntry> {
        child_ids
            .iter()
            .map(|child_id| {
                let result = self.run_at(child_id, now);
                if let Err(e) = &result {
                    warn!(child_id = %child_id, error = %e, "analysis failed");
                }
                BatchEntry {
                    child_id: child_id.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Run the batch over every child known to the observation source
    pub fn run_all(&self, now: DateTime<Utc>) -> Result<Vec<BatchEntry>, AnalysisError> {
        let child_ids = self
            .loader
            .source()
            .child_ids()
            .map_err(AnalysisError::Load)?;
        Ok(self.run_batch(&child_ids, now))
    }

    /// Past analyses for a child, newest first
    pub fn analytics_history(
        &self,
        child_id: &ChildId,
    ) -> Result<Vec<AnalyticRecord>, AnalysisError> {
        self.analytics
            .analytics_for_child(child_id)
            .map_err(AnalysisError::History)
    }
}
