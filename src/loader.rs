//! Observation loading
//!
//! Fetches the observations of one child that fall inside the trailing window.

use crate::error::StoreError;
use crate::store::ObservationSource;
use crate::types::{AnalysisWindow, ChildId, Observation};
use tracing::debug;

/// Loader for the trailing analysis window
pub struct ObservationLoader<S> {
    source: S,
}

impl<S: ObservationSource> ObservationLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load observations inside `window`, oldest first
    ///
    /// An empty result is valid. Records the source returns outside the window
    /// are dropped, and the result is stably re-sorted by `observed_at`.
    pub fn load(
        &self,
        child_id: &ChildId,
        window: &AnalysisWindow,
    ) -> Result<Vec<Observation>, StoreError> {
        let mut observations = self
            .source
            .load_observations(child_id, window.start, window.end)?;

        let fetched = observations.len();
        observations.retain(|o| window.contains(&o.observed_at));
        observations.sort_by_key(|o| o.observed_at);

        debug!(
            child_id = %child_id,
            fetched,
            kept = observations.len(),
            "observations loaded"
        );

        Ok(observations)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthorType;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use uuid::Uuid;

    /// Source that ignores the requested bounds and returns everything unsorted
    struct CarelessSource(Vec<Observation>);

    impl ObservationSource for CarelessSource {
        fn load_observations(
            &self,
            _child_id: &ChildId,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Observation>, StoreError> {
            Ok(self.0.clone())
        }

        fn observations_for_child(&self, _: &ChildId) -> Result<Vec<Observation>, StoreError> {
            Ok(self.0.clone())
        }

        fn child_ids(&self) -> Result<Vec<ChildId>, StoreError> {
            Ok(vec![])
        }
    }

    fn obs_at(at: DateTime<FixedOffset>, category: &str) -> Observation {
        Observation {
            id: Uuid::nil(),
            child_id: ChildId::from("child-1"),
            author_type: AuthorType::Parent,
            observed_at: at,
            category: category.to_string(),
            intensity: 2,
            description: None,
            tags: None,
        }
    }

    #[test]
    fn test_load_sorts_and_trims_to_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = AnalysisWindow::trailing(now);
        let utc = FixedOffset::east_opt(0).unwrap();

        let source = CarelessSource(vec![
            obs_at((now - Duration::days(2)).with_timezone(&utc), "late"),
            obs_at((now - Duration::days(45)).with_timezone(&utc), "too old"),
            obs_at((now - Duration::days(10)).with_timezone(&utc), "early"),
            obs_at((now + Duration::hours(1)).with_timezone(&utc), "future"),
        ]);

        let loaded = ObservationLoader::new(source)
            .load(&ChildId::from("child-1"), &window)
            .unwrap();

        let categories: Vec<&str> = loaded.iter().map(|o| o.category.as_str()).collect();
        assert_eq!(categories, vec!["early", "late"]);
    }

    #[test]
    fn test_ties_keep_source_order() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = AnalysisWindow::trailing(now);
        let at = (now - Duration::days(1)).fixed_offset();

        let source = CarelessSource(vec![obs_at(at, "first"), obs_at(at, "second")]);
        let loaded = ObservationLoader::new(source)
            .load(&ChildId::from("child-1"), &window)
            .unwrap();

        assert_eq!(loaded[0].category, "first");
        assert_eq!(loaded[1].category, "second");
    }

    #[test]
    fn test_empty_source_is_not_an_error() {
        let window = AnalysisWindow::trailing(Utc::now());
        let loaded = ObservationLoader::new(CarelessSource(vec![]))
            .load(&ChildId::from("child-1"), &window)
            .unwrap();

        assert!(loaded.is_empty());
    }
}
