//! Core data types for the observation analysis pipeline
//!
//! These types represent data at each stage of the pipeline:
//! Observation → NormalizedObservation → PatternSummary → AnalyticRecord

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the trailing analysis window in days
pub const WINDOW_DAYS: i64 = 30;

/// Opaque child identifier (foreign key owned by the child registry)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildId(pub String);

impl ChildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChildId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who wrote an observation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorType {
    #[default]
    Parent,
    Animator,
}

// ============================================================================
// Stage 1: Observations as stored by the journal
// ============================================================================

/// A single logged behavioral data point for a child
///
/// `observed_at` keeps the offset it was recorded in, so the hour of day seen by
/// the analysis is the caregiver's local hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub id: Uuid,
    pub child_id: ChildId,
    #[serde(default)]
    pub author_type: AuthorType,
    pub observed_at: DateTime<FixedOffset>,
    /// Kind of behavior (e.g. "émotion", "sommeil")
    pub category: String,
    /// Expected in 1..=5; values outside are clamped during normalization
    pub intensity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-text labels; absent means no tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

// ============================================================================
// Stage 2: Normalized observations (analysis-ready, ephemeral)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedObservation {
    pub date: DateTime<FixedOffset>,
    pub category: String,
    /// Clamped into 1..=5
    pub intensity: u8,
    /// Distinct tags in first-seen order
    pub tags: Vec<String>,
    /// Hour of day (0-23) in the recorded offset
    pub hour: u32,
}

// ============================================================================
// Stage 3: Pattern summary
// ============================================================================

/// Patterns detected across one analysis window
///
/// Serialized with camelCase keys; this is the `content` stored on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    /// Tags present in at least three observations, first-seen order
    pub recurring_tags: Vec<String>,
    /// Hours whose mean intensity is strictly above 3.0, first-seen order
    pub difficult_hours: Vec<u32>,
    /// Observations with intensity >= 4
    pub high_intensity_count: u32,
    pub total_observations: u32,
}

/// Output of the synthesizer for one window, before persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub patterns: PatternSummary,
    pub summary: String,
    pub suggestions: Vec<String>,
}

// ============================================================================
// Stage 4: Analytic records
// ============================================================================

/// Kind of analytic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticType {
    Summary,
}

/// Fields of an analytic record before the store assigns `id` and `createdAt`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalyticRecord {
    pub child_id: ChildId,
    #[serde(rename = "type")]
    pub analytic_type: AnalyticType,
    /// Serialized [`PatternSummary`]
    pub content: String,
    pub summary: String,
    pub suggestions: Vec<String>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Persisted output of one analysis run (append-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticRecord {
    pub id: Uuid,
    pub child_id: ChildId,
    #[serde(rename = "type")]
    pub analytic_type: AnalyticType,
    pub content: String,
    pub summary: String,
    pub suggestions: Vec<String>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticRecord {
    /// Materialize a record from its fields plus store-assigned identity
    pub fn from_new(new: NewAnalyticRecord, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            child_id: new.child_id,
            analytic_type: new.analytic_type,
            content: new.content,
            summary: new.summary,
            suggestions: new.suggestions,
            period_start: new.period_start,
            period_end: new.period_end,
            created_at,
        }
    }

    /// Decode the stored pattern summary
    pub fn patterns(&self) -> Result<PatternSummary, serde_json::Error> {
        serde_json::from_str(&self.content)
    }
}

// ============================================================================
// Window and outcome
// ============================================================================

/// Trailing time window `[end - 30 days, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    /// The window ending at `now`
    pub fn trailing(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(WINDOW_DAYS),
            end: now,
        }
    }

    /// Whether `at` falls inside the window (both bounds inclusive)
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        let at = at.with_timezone(&Utc);
        at >= self.start && at <= self.end
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// Message returned when the window holds no observations
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Pas assez de données pour une analyse pertinente.";

/// Result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// No observations in the window; nothing was persisted
    InsufficientData { message: String },
    /// The record written by this run
    Completed { record: AnalyticRecord },
}

impl AnalysisOutcome {
    pub fn insufficient_data() -> Self {
        Self::InsufficientData {
            message: INSUFFICIENT_DATA_MESSAGE.to_string(),
        }
    }

    pub fn record(&self) -> Option<&AnalyticRecord> {
        match self {
            Self::Completed { record } => Some(record),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Language used for summaries and suggestions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" | "french" => Ok(Self::Fr),
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}
