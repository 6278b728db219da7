//! Round-trip of the activity collection through a [`KeyValueStore`].
//!
//! The value under [`STORAGE_KEY`] is a JSON array of
//! `{ id, name, time, running, start }` records. Loading never fails: absent
//! or malformed data yields an empty list. Every restored activity comes back
//! stopped, so a timer left running in an earlier session is not resumed.

use std::collections::HashSet;

use super::KeyValueStore;
use crate::activity::{Activity, ActivityRecord};
use crate::error::PersistenceError;

/// Default key under which the activity collection is stored.
pub const STORAGE_KEY: &str = "timeTrackingActivities";

pub struct PersistenceAdapter {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection, falling back to empty on any failure.
    pub fn load(&self) -> Vec<Activity> {
        match self.try_load() {
            Ok(activities) => activities,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable activity state");
                Vec::new()
            }
        }
    }

    /// Load the stored collection, reporting why it could not be read.
    ///
    /// Records are normalized to stopped, invalid times are reset to zero and
    /// records repeating an earlier id are dropped.
    pub fn try_load(&self) -> Result<Vec<Activity>, PersistenceError> {
        let Some(raw) = self.backend.kv_get(&self.key)? else {
            return Ok(Vec::new());
        };

        let records: Vec<ActivityRecord> =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Decode {
                key: self.key.clone(),
                source,
            })?;

        let mut seen = HashSet::new();
        let mut activities = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id.clone()) {
                tracing::warn!(id = %record.id, "dropping activity with duplicate id");
                continue;
            }
            let (activity, rejected) = record.into_activity();
            if let Some(time) = rejected {
                tracing::warn!(id = %activity.id(), time, "reset invalid stored time to zero");
            }
            activities.push(activity);
        }
        Ok(activities)
    }

    /// Overwrite the stored collection.
    pub fn save(&self, activities: &[Activity]) -> Result<(), PersistenceError> {
        let records: Vec<ActivityRecord> = activities.iter().map(ActivityRecord::from).collect();
        let json = serde_json::to_string(&records).map_err(PersistenceError::Encode)?;
        self.backend.kv_set(&self.key, &json)?;
        Ok(())
    }
}
