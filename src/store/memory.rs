//! In-memory store
//!
//! Used by tests and by callers that embed the engine next to their own
//! persistence layer.

use crate::error::StoreError;
use crate::store::{AnalyticStore, ObservationSink, ObservationSource, StoreSnapshot};
use crate::types::{AnalyticRecord, ChildId, NewAnalyticRecord, Observation};
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreSnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with observations
    pub fn with_observations(observations: Vec<Observation>) -> Self {
        Self {
            inner: RwLock::new(StoreSnapshot {
                observations,
                analytics: Vec::new(),
            }),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.read()?.clone())
    }

    /// Number of analytic records written so far
    pub fn analytic_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.analytics.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreSnapshot>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreSnapshot>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl ObservationSource for InMemoryStore {
    fn load_observations(
        &self,
        child_id: &ChildId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, StoreError> {
        Ok(self.read()?.window(child_id, start, end))
    }

    fn observations_for_child(&self, child_id: &ChildId) -> Result<Vec<Observation>, StoreError> {
        Ok(self.read()?.newest_observations(child_id))
    }

    fn child_ids(&self) -> Result<Vec<ChildId>, StoreError> {
        Ok(self.read()?.child_ids())
    }
}

impl ObservationSink for InMemoryStore {
    fn append_observation(&self, observation: Observation) -> Result<Observation, StoreError> {
        Ok(self.write()?.push_observation(observation))
    }
}

impl AnalyticStore for InMemoryStore {
    fn create_analytic_record(
        &self,
        new: NewAnalyticRecord,
    ) -> Result<AnalyticRecord, StoreError> {
        Ok(self.write()?.push_analytic(new))
    }

    fn analytics_for_child(&self, child_id: &ChildId) -> Result<Vec<AnalyticRecord>, StoreError> {
        Ok(self.read()?.history(child_id))
    }
}
