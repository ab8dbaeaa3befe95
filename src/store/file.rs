//! JSON file store
//!
//! Keeps the whole journal and analytics history in one JSON document. Every
//! write rewrites the document through a uniquely named temp file and a rename,
//! so a failed write leaves the previous contents intact. Writers serialize on an
//! advisory lock held on a sibling `.lock` file for the whole read-modify-write,
//! which also covers separate processes pointing at the same document.

use crate::error::StoreError;
use crate::store::{AnalyticStore, ObservationSink, ObservationSource, StoreSnapshot};
use crate::types::{AnalyticRecord, ChildId, NewAnalyticRecord, Observation};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file guarding writes
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Read the document; a missing file is an empty store
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(StoreSnapshot::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreSnapshot::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Take the exclusive write lock; released when the returned handle drops
    fn acquire_write_lock(&self) -> Result<File, StoreError> {
        fs::create_dir_all(self.parent_dir())?;
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(serde_json::to_string_pretty(snapshot)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(
            path = %self.path.display(),
            observations = snapshot.observations.len(),
            analytics = snapshot.analytics.len(),
            "store saved"
        );
        Ok(())
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreSnapshot) -> T) -> Result<T, StoreError> {
        let _lock = self.acquire_write_lock()?;
        let mut snapshot = self.load()?;
        let out = f(&mut snapshot);
        self.save(&snapshot)?;
        Ok(out)
    }
}

impl ObservationSource for JsonFileStore {
    fn load_observations(
        &self,
        child_id: &ChildId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, StoreError> {
        Ok(self.load()?.window(child_id, start, end))
    }

    fn observations_for_child(&self, child_id: &ChildId) -> Result<Vec<Observation>, StoreError> {
        Ok(self.load()?.newest_observations(child_id))
    }

    fn child_ids(&self) -> Result<Vec<ChildId>, StoreError> {
        Ok(self.load()?.child_ids())
    }
}

impl ObservationSink for JsonFileStore {
    fn append_observation(&self, observation: Observation) -> Result<Observation, StoreError> {
        self.update(|s| s.push_observation(observation))
    }
}

impl AnalyticStore for JsonFileStore {
    fn create_analytic_record(
        &self,
        new: NewAnalyticRecord,
    ) -> Result<AnalyticRecord, StoreError> {
        self.update(|s| s.push_analytic(new))
    }

    fn analytics_for_child(&self, child_id: &ChildId) -> Result<Vec<AnalyticRecord>, StoreError> {
        Ok(self.load()?.history(child_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalyticType, AuthorType};
    use chrono::{Duration, FixedOffset, TimeZone};
    use uuid::Uuid;

    fn sample_observation() -> Observation {
        Observation {
            id: Uuid::nil(),
            child_id: ChildId::from("child-1"),
            author_type: AuthorType::Parent,
            observed_at: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 10, 14, 0, 0)
                .unwrap(),
            category: "sommeil".to_string(),
            intensity: 2,
            description: Some("sieste courte".to_string()),
            tags: Some(vec!["fatigue".to_string()]),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json"));

        assert_eq!(store.load().unwrap(), StoreSnapshot::default());
        assert!(store.child_ids().unwrap().is_empty());
    }

    #[test]
    fn test_append_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let stored = JsonFileStore::open(&path)
            .append_observation(sample_observation())
            .unwrap();

        let reopened = JsonFileStore::open(&path);
        let listed = reopened
            .observations_for_child(&ChildId::from("child-1"))
            .unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[test]
    fn test_analytic_records_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json"));
        let now = Utc::now();

        let record = store
            .create_analytic_record(NewAnalyticRecord {
                child_id: ChildId::from("child-1"),
                analytic_type: AnalyticType::Summary,
                content: "{}".to_string(),
                summary: "ok".to_string(),
                suggestions: vec!["a".to_string()],
                period_start: now - Duration::days(30),
                period_end: now,
            })
            .unwrap();

        let history = store
            .analytics_for_child(&ChildId::from("child-1"))
            .unwrap();
        assert_eq!(history, vec![record]);

        let mut leftovers: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, vec!["store.json", "store.json.lock"]);
    }

    #[test]
    fn test_lock_path_is_a_sibling() {
        let store = JsonFileStore::open("data/insight.json");
        assert_eq!(store.lock_path(), PathBuf::from("data/insight.json.lock"));
    }

    #[test]
    fn test_concurrent_writers_keep_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let writers = 8;

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let now = Utc::now();
                    JsonFileStore::open(path).create_analytic_record(NewAnalyticRecord {
                        child_id: ChildId::from(format!("child-{i}").as_str()),
                        analytic_type: AnalyticType::Summary,
                        content: "{}".to_string(),
                        summary: format!("summary {i}"),
                        suggestions: Vec::new(),
                        period_start: now - Duration::days(30),
                        period_end: now,
                    })
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        let snapshot = JsonFileStore::open(&path).load().unwrap();
        assert_eq!(snapshot.analytics.len(), writers);
        for i in 0..writers {
            let child = ChildId::from(format!("child-{i}").as_str());
            assert_eq!(snapshot.history(&child).len(), 1);
        }
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::open(&path).child_ids();
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
