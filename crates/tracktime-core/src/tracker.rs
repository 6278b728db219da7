//! The contract the presentation layer talks to.
//!
//! [`Tracker`] pairs the [`ActivityStore`] with the [`TimerController`] so the
//! controller is Active exactly while some activity runs. Readers get owned
//! snapshots; writers submit intents and get an [`Event`] or a typed
//! [`ActivityError`] back.

use std::sync::Arc;

use crate::activity::{Activity, ActivityId, ActivityStore};
use crate::clock::Clock;
use crate::error::ActivityError;
use crate::events::{timestamp, Event, TimerStatus};
use crate::storage::{Config, KeyValueStore, PersistenceAdapter};
use crate::timer::TimerController;

pub struct Tracker {
    store: ActivityStore,
    timer: TimerController,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    pub fn new(store: ActivityStore, timer: TimerController, clock: Arc<dyn Clock>) -> Self {
        let mut tracker = Self {
            store,
            timer,
            clock,
        };
        tracker.sync_timer();
        tracker
    }

    /// Build a tracker from configuration over the given backend.
    ///
    /// Loads persisted activities (all stopped) and seeds defaults if the
    /// configuration asks for them and storage is empty.
    pub fn open(config: &Config, backend: impl KeyValueStore + 'static, clock: Arc<dyn Clock>) -> Self {
        let persistence = PersistenceAdapter::with_key(backend, config.storage.key.clone());
        let mut store = ActivityStore::open(persistence, Arc::clone(&clock))
            .with_accrual(config.timer.accrual.build(config.timer.tick_interval_ms))
            .with_default_name(config.activities.default_name.clone());
        let seeded = store.seed_defaults(config.activities.seed_count);
        if seeded > 0 {
            tracing::info!(seeded, "created default activities");
        }
        Self::new(store, TimerController::new(config.timer.tick_interval_ms), clock)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<Activity> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn timer_status(&self) -> TimerStatus {
        self.timer.status()
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Full state as a single event.
    pub fn state_snapshot(&self) -> Event {
        Event::StateSnapshot {
            activities: self.store.snapshot(),
            timer: self.timer.status(),
            running: self.store.running().map(|a| a.id().clone()),
            total_minutes: self.store.total_minutes(),
            at: timestamp(self.clock.now_ms()),
        }
    }

    /// Milliseconds until the next tick is due, if the timer is Active.
    pub fn next_tick_in_ms(&self) -> Option<u64> {
        self.timer.time_until_due(self.clock.now_ms())
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn add_activity(&mut self) -> (Activity, Event) {
        self.store.add_activity()
    }

    pub fn add_named(&mut self, name: impl Into<String>) -> (Activity, Event) {
        self.store.add_named(name)
    }

    pub fn edit_name(&mut self, id: &ActivityId, name: impl Into<String>) -> Result<Event, ActivityError> {
        self.store.edit_name(id, name)
    }

    pub fn edit_time(&mut self, id: &ActivityId, minutes: f64) -> Result<Event, ActivityError> {
        self.store.edit_time(id, minutes)
    }

    pub fn clear_time(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        self.store.clear_time(id)
    }

    pub fn toggle_running(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        let event = self.store.toggle_running(id)?;
        self.sync_timer();
        Ok(event)
    }

    pub fn start(&mut self, id: &ActivityId) -> Result<Option<Event>, ActivityError> {
        let event = self.store.start(id)?;
        self.sync_timer();
        Ok(event)
    }

    pub fn stop(&mut self, id: &ActivityId) -> Result<Option<Event>, ActivityError> {
        let event = self.store.stop(id)?;
        self.sync_timer();
        Ok(event)
    }

    pub fn delete_activity(&mut self, id: &ActivityId) -> Result<Event, ActivityError> {
        self.store.delete_activity(id)
    }

    // ── Driver ───────────────────────────────────────────────────────

    /// Fire the pending tick if it is due.
    pub fn pump(&mut self) -> Option<Event> {
        let handle = self.timer.due(self.clock.now_ms())?;
        self.timer.fire(handle, &mut self.store)
    }

    /// Stop whatever runs and cancel the tick, committing the open interval.
    pub fn shutdown(&mut self) -> Option<Event> {
        let running = self.store.running().map(|a| a.id().clone());
        let event = running.and_then(|id| self.store.stop(&id).ok().flatten());
        self.sync_timer();
        event
    }

    fn sync_timer(&mut self) {
        let now = self.clock.now_ms();
        if self.store.is_any_running() {
            self.timer.start_timer(now);
        } else {
            self.timer.stop_timer(now);
        }
    }
}
