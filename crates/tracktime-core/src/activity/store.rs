//! The canonical, ordered activity collection.
//!
//! Insertion order is display order. Every mutation is a read-modify-write
//! on the collection held here, checks both model invariants before
//! committing, and is followed by a full-state save.
//!
//! ## Invariants
//!
//! - At most one activity is running.
//! - An activity has a start instant exactly when it is running.

use std::sync::Arc;

use super::model::{Activity, ActivityId};
use crate::clock::Clock;
use crate::error::ActivityError;
use crate::events::{timestamp, Event};
use crate::storage::PersistenceAdapter;
use crate::timer::{AccrualStrategy, TimestampDelta};

const DEFAULT_NAME: &str = "New Activity";

pub struct ActivityStore {
    activities: Vec<Activity>,
    persistence: PersistenceAdapter,
    clock: Arc<dyn Clock>,
    accrual: Box<dyn AccrualStrategy>,
    default_name: String,
}

impl ActivityStore {
    /// Hydrate from persisted state.
    ///
    /// Restored activities are all stopped; see [`PersistenceAdapter::load`].
    pub fn open(persistence: PersistenceAdapter, clock: Arc<dyn Clock>) -> Self {
        let activities = persistence.load();
        tracing::debug!(count = activities.len(), key = persistence.key(), "loaded activities");
        Self {
            activities,
            persistence,
            clock,
            accrual: Box::new(TimestampDelta),
            default_name: DEFAULT_NAME.to_string(),
        }
    }

    pub fn with_accrual(mut self, accrual: Box<dyn AccrualStrategy>) -> Self {
        self.accrual = accrual;
        self
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// An owned copy of the collection.
    pub fn snapshot(&self) -> Vec<Activity> {
        self.activities.clone()
    }

    pub fn get(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id() == id)
    }

    /// The running activity, derived from the collection.
    pub fn running(&self) -> Option<&Activity> {
        self.activities.iter().find(|a| a.is_running())
    }

    pub fn is_any_running(&self) -> bool {
        self.running().is_some()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Sum of all activities, including the running activity's open interval.
    pub fn total_minutes(&self) -> f64 {
        let now = self.clock.now_ms();
        self.activities.iter().map(|a| a.live_minutes(now)).sum()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a stopped activity with the default name.
    pub fn add_activity(&mut self) -> (Activity, Event) {
        let name = self.default_name.clone();
        self.add_named(name)
    }

    pub fn add_named(&mut self, name: impl Into<String>) -> (Activity, Event) {
        let activity = Activity::new(name);
        self.activities.push(activity.clone());
        self.persist();
        let event = Event::ActivityAdded {
            id: activity.id().clone(),
            name: activity.name().to_string(),
            at: timestamp(self.clock.now_ms()),
        };
        (activity, event)
    }

    /// Create `Activity 1..=count` if the collection is empty. Returns how many were added.
    pub fn seed_defaults(&mut self, count: u32) -> usize {
        if !self.activities.is_empty() || count == 0 {
            return 0;
        }
        self.activities
            .extend((1..=count).map(|i| Activity::new(format!("Activity {i}"))));
        self.persist();
        count as usize
    }

    pub fn edit_name(
        &mut self,
        id: &ActivityId,
        name: impl Into<String>,
    ) -> Result<Event, ActivityError> {
        let index = self.position(id)?;
        let name = name.into();
        self.activities[index].set_name(name.clone());
        self.persist();
        Ok(Event::ActivityRenamed {
            id: id.clone(),
            name,
            at: timestamp(self.clock.now_ms()),
        })
    }

    /// Overwrite accrued minutes. The activity must be stopped.
    pub fn edit_time(&mut self, id: &ActivityId, minutes: f64) -> Result<Event, ActivityError> {
        let index = self.position(id)?;
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(ActivityError::InvalidTime { value: minutes });
        }
        if self.activities[index].is_running() {
            return Err(ActivityError::Running { id: id.clone() });
        }

        let previous = self.activities[index].elapsed_minutes();
        self.activities[index].set_elapsed_minutes(minutes);
        self.persist();
        Ok(Event::TimeEdited {
            id: id.clone(),
            previous_minutes: previous,
            elapsed_minutes: minutes,
            at: timestamp(self.clock.now_ms()),
        })
    }

    /// Zero the accrued minutes. A running activity keeps running from now.
    pub fn clear_time(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        let index = self.position(id)?;
        let now = self.clock.now_ms();
        let activity = &mut self.activities[index];
        activity.set_elapsed_minutes(0.0);
        activity.restart_interval(now);
        let running = activity.is_running();
        self.persist();
        Ok(Event::TimeCleared {
            id: id.clone(),
            running,
            at: timestamp(now),
        })
    }

    /// Stop the activity if it runs, otherwise start it.
    pub fn toggle_running(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        let index = self.position(id)?;
        let event = if self.activities[index].is_running() {
            self.stop_at(index)
        } else {
            self.start_at(index)?
        };
        Ok(event)
    }

    /// Start the activity. `None` if it was already running.
    ///
    /// Fails with [`ActivityError::ConcurrentTimer`] if another activity runs.
    pub fn start(&mut self, id: &ActivityId) -> Result<Option<Event>, ActivityError> {
        let index = self.position(id)?;
        if self.activities[index].is_running() {
            return Ok(None);
        }
        self.start_at(index).map(Some)
    }

    /// Stop the activity. `None` if it was not running.
    pub fn stop(&mut self, id: &ActivityId) -> Result<Option<Event>, ActivityError> {
        let index = self.position(id)?;
        if !self.activities[index].is_running() {
            return Ok(None);
        }
        Ok(Some(self.stop_at(index)))
    }

    /// Remove a stopped activity.
    pub fn delete_activity(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        let index = self.position(id)?;
        if self.activities[index].is_running() {
            return Err(ActivityError::Running { id: id.clone() });
        }
        let removed = self.activities.remove(index);
        self.persist();
        Ok(Event::ActivityDeleted {
            id: id.clone(),
            name: removed.name().to_string(),
            at: timestamp(self.clock.now_ms()),
        })
    }

    /// Apply one accrual tick to the running activity, if any.
    pub fn accrue(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let index = self.activities.iter().position(|a| a.is_running())?;
        let advanced = self.accrual.advance(&self.activities[index], now);
        let elapsed = advanced.elapsed_minutes();
        let id = advanced.id().clone();
        self.activities[index] = advanced;
        self.persist();
        Some(Event::Ticked {
            id,
            elapsed_minutes: elapsed,
            at: timestamp(now),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn position(&self, id: &ActivityId) -> Result<usize, ActivityError> {
        self.activities
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| {
                tracing::debug!(%id, "intent for unknown activity ignored");
                ActivityError::NotFound { id: id.clone() }
            })
    }

    fn start_at(&mut self, index: usize) -> Result<Event, ActivityError> {
        if let Some(other) = self.running() {
            return Err(ActivityError::ConcurrentTimer {
                running_id: other.id().clone(),
                running_name: other.name().to_string(),
            });
        }
        let now = self.clock.now_ms();
        let activity = &mut self.activities[index];
        activity.begin(now);
        let event = Event::TimerStarted {
            id: activity.id().clone(),
            name: activity.name().to_string(),
            start_ms: now,
            at: timestamp(now),
        };
        self.persist();
        Ok(event)
    }

    fn stop_at(&mut self, index: usize) -> Event {
        let now = self.clock.now_ms();
        let activity = &mut self.activities[index];
        let added = activity.finish(now);
        tracing::debug!(id = %activity.id(), added, "stopped activity");
        let event = Event::TimerStopped {
            id: activity.id().clone(),
            name: activity.name().to_string(),
            added_minutes: added,
            elapsed_minutes: activity.elapsed_minutes(),
            at: timestamp(now),
        };
        self.persist();
        event
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.activities) {
            tracing::error!(error = %e, "failed to save activities");
        }
    }
}
