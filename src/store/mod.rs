//! Persistence collaborators
//!
//! The engine only talks to storage through these traits, so a run can be wired
//! to the in-memory store in tests and to the JSON file store from the CLI.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::types::{AnalyticRecord, ChildId, NewAnalyticRecord, Observation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Read access to logged observations
pub trait ObservationSource {
    /// Observations for `child_id` with `observed_at` in `[start, end]`, oldest first
    fn load_observations(
        &self,
        child_id: &ChildId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, StoreError>;

    /// Every observation for `child_id`, newest first
    fn observations_for_child(&self, child_id: &ChildId) -> Result<Vec<Observation>, StoreError>;

    /// Children that have at least one observation
    fn child_ids(&self) -> Result<Vec<ChildId>, StoreError>;
}

/// Append-only write access to the observation journal
pub trait ObservationSink {
    fn append_observation(&self, observation: Observation) -> Result<Observation, StoreError>;
}

/// Append-only storage of analytic records
pub trait AnalyticStore {
    /// Persist a new record, assigning its id and `createdAt`
    fn create_analytic_record(&self, new: NewAnalyticRecord)
        -> Result<AnalyticRecord, StoreError>;

    /// Records for `child_id`, newest first
    fn analytics_for_child(&self, child_id: &ChildId) -> Result<Vec<AnalyticRecord>, StoreError>;
}

impl<T: ObservationSource + ?Sized> ObservationSource for &T {
    fn load_observations(
        &self,
        child_id: &ChildId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, StoreError> {
        (**self).load_observations(child_id, start, end)
    }

    fn observations_for_child(&self, child_id: &ChildId) -> Result<Vec<Observation>, StoreError> {
        (**self).observations_for_child(child_id)
    }

    fn child_ids(&self) -> Result<Vec<ChildId>, StoreError> {
        (**self).child_ids()
    }
}

impl<T: ObservationSink + ?Sized> ObservationSink for &T {
    fn append_observation(&self, observation: Observation) -> Result<Observation, StoreError> {
        (**self).append_observation(observation)
    }
}

impl<T: AnalyticStore + ?Sized> AnalyticStore for &T {
    fn create_analytic_record(
        &self,
        new: NewAnalyticRecord,
    ) -> Result<AnalyticRecord, StoreError> {
        (**self).create_analytic_record(new)
    }

    fn analytics_for_child(&self, child_id: &ChildId) -> Result<Vec<AnalyticRecord>, StoreError> {
        (**self).analytics_for_child(child_id)
    }
}

/// Full contents of a store, as held in memory or written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub analytics: Vec<AnalyticRecord>,
}

impl StoreSnapshot {
    pub(crate) fn window(
        &self,
        child_id: &ChildId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Observation> {
        let mut selected: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| &o.child_id == child_id)
            .filter(|o| {
                let at = o.observed_at.with_timezone(&Utc);
                at >= start && at <= end
            })
            .cloned()
            .collect();
        selected.sort_by_key(|o| o.observed_at);
        selected
    }

    pub(crate) fn newest_observations(&self, child_id: &ChildId) -> Vec<Observation> {
        let mut selected: Vec<Observation> = self
            .observations
            .iter()
            .rev()
            .filter(|o| &o.child_id == child_id)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        selected
    }

    pub(crate) fn child_ids(&self) -> Vec<ChildId> {
        self.observations
            .iter()
            .map(|o| o.child_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub(crate) fn push_observation(&mut self, mut observation: Observation) -> Observation {
        if observation.id.is_nil() {
            observation.id = Uuid::new_v4();
        }
        self.observations.push(observation.clone());
        observation
    }

    pub(crate) fn push_analytic(&mut self, new: NewAnalyticRecord) -> AnalyticRecord {
        let record = AnalyticRecord::from_new(new, Uuid::new_v4(), Utc::now());
        self.analytics.push(record.clone());
        record
    }

    /// Newest first; equal timestamps keep the later write first
    pub(crate) fn history(&self, child_id: &ChildId) -> Vec<AnalyticRecord> {
        let mut records: Vec<AnalyticRecord> = self
            .analytics
            .iter()
            .rev()
            .filter(|r| &r.child_id == child_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}
