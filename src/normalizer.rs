//! Observation normalization
//!
//! Projects stored observations into the minimal shape the detector needs.

use crate::types::{NormalizedObservation, Observation};
use chrono::Timelike;
use std::collections::HashSet;
use tracing::warn;

/// Lowest valid intensity
pub const MIN_INTENSITY: u8 = 1;

/// Highest valid intensity
pub const MAX_INTENSITY: u8 = 5;

/// Normalizer for observations
pub struct ObservationNormalizer;

impl ObservationNormalizer {
    /// Normalize one observation
    ///
    /// The hour is read in the offset the observation was recorded in.
    pub fn normalize(observation: &Observation) -> NormalizedObservation {
        NormalizedObservation {
            date: observation.observed_at,
            category: observation.category.clone(),
            intensity: clamp_intensity(observation.intensity),
            tags: distinct_tags(observation.tags.as_deref().unwrap_or_default()),
            hour: observation.observed_at.hour(),
        }
    }

    /// Normalize a sequence, preserving order
    pub fn normalize_all(observations: &[Observation]) -> Vec<NormalizedObservation> {
        observations.iter().map(Self::normalize).collect()
    }
}

fn clamp_intensity(raw: i32) -> u8 {
    let clamped = raw.clamp(MIN_INTENSITY as i32, MAX_INTENSITY as i32);
    if clamped != raw {
        warn!(raw, clamped, "observation intensity out of range, clamped");
    }
    clamped as u8
}

/// Trimmed, non-empty tags with duplicates removed, first-seen order
fn distinct_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorType, ChildId};
    use chrono::{FixedOffset, TimeZone};
    use uuid::Uuid;

    fn make_observation(intensity: i32, tags: Option<Vec<&str>>) -> Observation {
        Observation {
            id: Uuid::nil(),
            child_id: ChildId::from("child-1"),
            author_type: AuthorType::Animator,
            observed_at: FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, 18, 45, 0)
                .unwrap(),
            category: "émotion".to_string(),
            intensity,
            description: Some("pleurs au départ du parent".to_string()),
            tags: tags.map(|t| t.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_hour_uses_recorded_offset() {
        let normalized = ObservationNormalizer::normalize(&make_observation(3, None));

        // 18:45 at +02:00 is 16:45 UTC; the local hour is kept
        assert_eq!(normalized.hour, 18);
        assert_eq!(normalized.category, "émotion");
        assert_eq!(normalized.intensity, 3);
    }

    #[test]
    fn test_absent_tags_become_empty() {
        let normalized = ObservationNormalizer::normalize(&make_observation(2, None));
        assert!(normalized.tags.is_empty());
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let normalized = ObservationNormalizer::normalize(&make_observation(
            2,
            Some(vec!["colère", "fatigue", "colère", " ", " fatigue "]),
        ));

        assert_eq!(normalized.tags, vec!["colère", "fatigue"]);
    }

    #[test]
    fn test_intensity_clamped() {
        assert_eq!(
            ObservationNormalizer::normalize(&make_observation(9, None)).intensity,
            MAX_INTENSITY
        );
        assert_eq!(
            ObservationNormalizer::normalize(&make_observation(-2, None)).intensity,
            MIN_INTENSITY
        );
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let observations = vec![make_observation(1, None), make_observation(5, None)];
        let normalized = ObservationNormalizer::normalize_all(&observations);

        let intensities: Vec<u8> = normalized.iter().map(|n| n.intensity).collect();
        assert_eq!(intensities, vec![1, 5]);
    }
}
