//! Observation journal
//!
//! Validates observation drafts written by parents and animators and appends
//! them to the store. Access control happens before this point.

use crate::error::{AnalysisError, ObservationError};
use crate::normalizer::{MAX_INTENSITY, MIN_INTENSITY};
use crate::store::{ObservationSink, ObservationSource};
use crate::types::{AuthorType, ChildId, Observation};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// An observation as submitted, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDraft {
    pub child_id: ChildId,
    #[serde(default)]
    pub author_type: AuthorType,
    pub category: String,
    pub intensity: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Defaults to the time of recording
    #[serde(default)]
    pub observed_at: Option<DateTime<FixedOffset>>,
}

impl ObservationDraft {
    pub fn new(child_id: ChildId, category: impl Into<String>, intensity: i32) -> Self {
        Self {
            child_id,
            author_type: AuthorType::Parent,
            category: category.into(),
            intensity,
            description: None,
            tags: None,
            observed_at: None,
        }
    }

    pub fn with_author(mut self, author_type: AuthorType) -> Self {
        self.author_type = author_type;
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn observed_at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.observed_at = Some(at);
        self
    }

    /// Check the draft and turn it into an observation
    pub fn validate(self, now: DateTime<Utc>) -> Result<Observation, ObservationError> {
        if self.child_id.as_str().trim().is_empty() {
            return Err(ObservationError::MissingChild);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ObservationError::EmptyCategory);
        }
        if !(i32::from(MIN_INTENSITY)..=i32::from(MAX_INTENSITY)).contains(&self.intensity) {
            return Err(ObservationError::IntensityOutOfRange(self.intensity));
        }

        Ok(Observation {
            id: Uuid::new_v4(),
            child_id: self.child_id,
            author_type: self.author_type,
            observed_at: self.observed_at.unwrap_or_else(|| now.fixed_offset()),
            category: category.to_string(),
            intensity: self.intensity,
            description: self.description.filter(|d| !d.trim().is_empty()),
            tags: Some(self.tags.unwrap_or_default()),
        })
    }
}

/// Front door for logging and listing observations
pub struct ObservationJournal<S> {
    store: S,
}

impl<S> ObservationJournal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ObservationSink> ObservationJournal<S> {
    /// Validate and append an observation
    pub fn record_observation(&self, draft: ObservationDraft) -> Result<Observation, AnalysisError> {
        let observation = draft.validate(Utc::now())?;
        let stored = self
            .store
            .append_observation(observation)
            .map_err(AnalysisError::Record)?;

        info!(
            child_id = %stored.child_id,
            observation_id = %stored.id,
            author = ?stored.author_type,
            "observation recorded"
        );
        Ok(stored)
    }
}

impl<S: ObservationSource> ObservationJournal<S> {
    /// Every observation for a child, newest first
    pub fn observations_for_child(
        &self,
        child_id: &ChildId,
    ) -> Result<Vec<Observation>, AnalysisError> {
        self.store
            .observations_for_child(child_id)
            .map_err(AnalysisError::Load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_valid_draft() {
        let paris = FixedOffset::east_opt(3600).unwrap();
        let at = paris.with_ymd_and_hms(2024, 3, 10, 18, 15, 0).unwrap();

        let obs = ObservationDraft::new(ChildId::from("child-1"), "  émotion ", 4)
            .with_author(AuthorType::Animator)
            .with_tags(["colère"])
            .observed_at(at)
            .validate(Utc::now())
            .unwrap();

        assert_eq!(obs.category, "émotion");
        assert_eq!(obs.observed_at.hour(), 18);
        assert_eq!(obs.tags, Some(vec!["colère".to_string()]));
        assert!(!obs.id.is_nil());
    }

    #[test]
    fn test_defaults_applied() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let obs = ObservationDraft::new(ChildId::from("child-1"), "sommeil", 1)
            .with_description("   ")
            .validate(now)
            .unwrap();

        assert_eq!(obs.tags, Some(vec![]));
        assert_eq!(obs.description, None);
        assert_eq!(obs.observed_at, now.fixed_offset());
        assert_eq!(obs.author_type, AuthorType::Parent);
    }

    #[test]
    fn test_rejects_out_of_range_intensity() {
        for intensity in [0, 6, -1] {
            let result = ObservationDraft::new(ChildId::from("child-1"), "émotion", intensity)
                .validate(Utc::now());
            assert_eq!(result, Err(ObservationError::IntensityOutOfRange(intensity)));
        }
    }

    #[test]
    fn test_rejects_empty_category_and_child() {
        assert_eq!(
            ObservationDraft::new(ChildId::from("child-1"), " ", 3).validate(Utc::now()),
            Err(ObservationError::EmptyCategory)
        );
        assert_eq!(
            ObservationDraft::new(ChildId::from(""), "émotion", 3).validate(Utc::now()),
            Err(ObservationError::MissingChild)
        );
    }

    #[test]
    fn test_record_and_list_newest_first() {
        let store = InMemoryStore::new();
        let journal = ObservationJournal::new(&store);
        let paris = FixedOffset::east_opt(3600).unwrap();

        for day in [3, 9, 5] {
            journal
                .record_observation(
                    ObservationDraft::new(ChildId::from("child-1"), "jeu", 2)
                        .observed_at(paris.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap()),
                )
                .unwrap();
        }

        let listed = journal
            .observations_for_child(&ChildId::from("child-1"))
            .unwrap();
        let days: Vec<u32> = listed
            .iter()
            .map(|o| chrono::Datelike::day(&o.observed_at))
            .collect();
        assert_eq!(days, vec![9, 5, 3]);
    }

    #[test]
    fn test_invalid_draft_not_stored() {
        let store = InMemoryStore::new();
        let journal = ObservationJournal::new(&store);

        let result =
            journal.record_observation(ObservationDraft::new(ChildId::from("child-1"), "jeu", 9));

        assert!(matches!(result, Err(AnalysisError::InvalidObservation(_))));
        assert!(store.child_ids().unwrap().is_empty());
    }
}
