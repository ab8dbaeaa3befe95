//! Pattern detection
//!
//! Aggregates normalized observations into a [`PatternSummary`]: tags that keep
//! coming back, hours of the day that tend to be hard, and how many episodes were
//! intense.

use crate::types::{NormalizedObservation, PatternSummary};
use std::collections::{HashMap, HashSet};

/// Minimum number of observations carrying a tag for it to be recurring
pub const RECURRING_TAG_MIN_OCCURRENCES: u32 = 3;

/// Intensity at or above which an observation counts as high
pub const HIGH_INTENSITY_THRESHOLD: u8 = 4;

/// Mean intensity an hour must strictly exceed to be difficult
pub const DIFFICULT_HOUR_MEAN_THRESHOLD: f64 = 3.0;

/// Pattern detector over one window of normalized observations
pub struct PatternDetector;

impl PatternDetector {
    /// Detect patterns
    ///
    /// Qualifying tags and hours are returned in the order they were first seen,
    /// so the output is fully determined by the input order. A tag counts at most
    /// once per observation.
    pub fn detect(observations: &[NormalizedObservation]) -> PatternSummary {
        let mut tag_counts = FirstSeenCounter::<String, u32>::default();
        let mut hour_intensities = FirstSeenCounter::<u32, Vec<u8>>::default();
        let mut high_intensity_count = 0u32;

        for obs in observations {
            let mut seen = HashSet::with_capacity(obs.tags.len());
            for tag in obs.tags.iter().filter(|t| seen.insert(t.as_str())) {
                *tag_counts.entry(tag) += 1;
            }

            hour_intensities.entry(&obs.hour).push(obs.intensity);

            if obs.intensity >= HIGH_INTENSITY_THRESHOLD {
                high_intensity_count += 1;
            }
        }

        let recurring_tags = tag_counts
            .into_entries()
            .filter(|(_, count)| *count >= RECURRING_TAG_MIN_OCCURRENCES)
            .map(|(tag, _)| tag)
            .collect();

        let difficult_hours = hour_intensities
            .into_entries()
            .filter(|(_, intensities)| {
                mean_intensity(intensities).is_some_and(|m| m > DIFFICULT_HOUR_MEAN_THRESHOLD)
            })
            .map(|(hour, _)| hour)
            .collect();

        PatternSummary {
            recurring_tags,
            difficult_hours,
            high_intensity_count,
            total_observations: observations.len() as u32,
        }
    }
}

/// Arithmetic mean; `None` for an empty bucket
fn mean_intensity(intensities: &[u8]) -> Option<f64> {
    if intensities.is_empty() {
        return None;
    }
    let sum: u64 = intensities.iter().map(|&i| u64::from(i)).sum();
    Some(sum as f64 / intensities.len() as f64)
}

/// Keyed accumulator that iterates in first-insertion order
struct FirstSeenCounter<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for FirstSeenCounter<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + std::hash::Hash, V: Default> FirstSeenCounter<K, V> {
    fn entry(&mut self, key: &K) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), V::default()));
                let slot = self.entries.len() - 1;
                self.index.insert(key.clone(), slot);
                slot
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        self.entries.into_iter()
    }
}
