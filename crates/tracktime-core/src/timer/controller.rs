//! Timer controller.
//!
//! A caller-driven state machine with no internal thread. While Active it
//! holds a [`TickHandle`] describing when the next tick is due; the driver
//! (an event loop, a test) asks for the due handle and fires it.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start_timer--> Active --stop_timer--> Idle
//! ```
//!
//! Both transitions are idempotent. Stopping bumps the handle generation, so a
//! handle obtained before the stop is recognised as cancelled when fired.
//!
//! ## Usage
//!
//! ```ignore
//! controller.start_timer(now);
//! // In a loop:
//! if let Some(handle) = controller.due(now) {
//!     controller.fire(handle, &mut store);
//! }
//! ```

use crate::activity::ActivityStore;
use crate::events::{timestamp, Event, TimerStatus};

/// Opaque reference to one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
    due_ms: u64,
}

impl TickHandle {
    /// Epoch milliseconds at which this tick is due.
    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }
}

#[derive(Debug, Clone)]
pub struct TimerController {
    period_ms: u64,
    generation: u64,
    scheduled: Option<TickHandle>,
}

impl TimerController {
    /// A controller in the Idle state ticking every `period_ms` once active.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            generation: 0,
            scheduled: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        if self.scheduled.is_some() {
            TimerStatus::Active
        } else {
            TimerStatus::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.scheduled.is_some()
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// The pending tick, if Active.
    pub fn scheduled(&self) -> Option<TickHandle> {
        self.scheduled
    }

    /// Milliseconds until the pending tick is due; zero if overdue.
    pub fn time_until_due(&self, now_ms: u64) -> Option<u64> {
        self.scheduled.map(|h| h.due_ms.saturating_sub(now_ms))
    }

    /// The pending tick if it is due at `now_ms`.
    pub fn due(&self, now_ms: u64) -> Option<TickHandle> {
        self.scheduled.filter(|h| h.due_ms <= now_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Active. `None` if already Active.
    pub fn start_timer(&mut self, now_ms: u64) -> Option<Event> {
        if self.scheduled.is_some() {
            return None;
        }
        self.scheduled = Some(TickHandle {
            generation: self.generation,
            due_ms: now_ms.saturating_add(self.period_ms),
        });
        tracing::info!(period_ms = self.period_ms, "timer active");
        Some(Event::TimerStateChanged {
            state: TimerStatus::Active,
            at: timestamp(now_ms),
        })
    }

    /// Active -> Idle, cancelling the pending tick. `None` if already Idle.
    pub fn stop_timer(&mut self, now_ms: u64) -> Option<Event> {
        self.scheduled.take()?;
        self.generation += 1;
        tracing::info!("timer idle");
        Some(Event::TimerStateChanged {
            state: TimerStatus::Idle,
            at: timestamp(now_ms),
        })
    }

    /// Run the tick behind `handle` against the store and schedule the next one.
    ///
    /// A handle from a cancelled schedule, or a tick with nothing running, is a
    /// no-op. Missed periods are skipped rather than replayed.
    pub fn fire(&mut self, handle: TickHandle, store: &mut ActivityStore) -> Option<Event> {
        let current = self.scheduled?;
        if handle.generation != current.generation {
            tracing::debug!("dropping tick from cancelled schedule");
            return None;
        }

        let now = store.now_ms();
        let mut next_due = current.due_ms.saturating_add(self.period_ms);
        if next_due <= now {
            next_due = now.saturating_add(self.period_ms);
        }
        self.scheduled = Some(TickHandle {
            generation: current.generation,
            due_ms: next_due,
        });

        let event = store.accrue();
        if event.is_none() {
            tracing::debug!("tick with no running activity");
        }
        event
    }
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::storage::{MemoryStore, PersistenceAdapter};
    use std::sync::Arc;

    fn store(clock: &ManualClock) -> ActivityStore {
        ActivityStore::open(
            PersistenceAdapter::new(MemoryStore::new()),
            Arc::new(clock.clone()),
        )
    }

    #[test]
    fn start_stop_transitions() {
        let mut timer = TimerController::new(1000);
        assert_eq!(timer.status(), TimerStatus::Idle);

        assert!(timer.start_timer(0).is_some());
        assert_eq!(timer.status(), TimerStatus::Active);
        assert!(timer.start_timer(0).is_none());

        assert!(timer.stop_timer(0).is_some());
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert!(timer.stop_timer(0).is_none());
    }

    #[test]
    fn stop_on_idle_changes_nothing() {
        let mut timer = TimerController::new(1000);
        let before = timer.clone();
        assert!(timer.stop_timer(5).is_none());
        assert_eq!(timer.generation, before.generation);
        assert_eq!(timer.scheduled, before.scheduled);
    }

    #[test]
    fn due_only_after_period() {
        let mut timer = TimerController::new(1000);
        timer.start_timer(10_000);
        assert!(timer.due(10_999).is_none());
        assert!(timer.due(11_000).is_some());
        assert_eq!(timer.time_until_due(10_400), Some(600));
    }

    #[test]
    fn fire_accrues_running_activity_and_reschedules() {
        let clock = ManualClock::new(0);
        let mut store = store(&clock);
        let (a, _) = store.add_activity();
        store.start(a.id()).unwrap();

        let mut timer = TimerController::new(1000);
        timer.start_timer(clock.now_ms());
        clock.advance_ms(1000);
        let handle = timer.due(clock.now_ms()).unwrap();
        assert!(timer.fire(handle, &mut store).is_some());
        assert_eq!(timer.scheduled().unwrap().due_ms(), 2000);
        assert!((store.get(a.id()).unwrap().elapsed_minutes() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn cancelled_handle_is_a_noop() {
        let clock = ManualClock::new(0);
        let mut store = store(&clock);
        let (a, _) = store.add_activity();
        store.start(a.id()).unwrap();

        let mut timer = TimerController::new(1000);
        timer.start_timer(0);
        clock.advance_ms(1000);
        let in_flight = timer.due(clock.now_ms()).unwrap();
        timer.stop_timer(clock.now_ms());
        timer.start_timer(clock.now_ms());

        let before = store.snapshot();
        assert!(timer.fire(in_flight, &mut store).is_none());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn fire_while_idle_is_a_noop() {
        let clock = ManualClock::new(0);
        let mut store = store(&clock);
        let mut timer = TimerController::new(1000);
        timer.start_timer(0);
        let handle = timer.scheduled().unwrap();
        timer.stop_timer(0);
        assert!(timer.fire(handle, &mut store).is_none());
        assert!(!timer.is_active());
    }

    #[test]
    fn stale_tick_with_nothing_running_is_a_noop() {
        let clock = ManualClock::new(0);
        let mut store = store(&clock);
        store.add_activity();
        let mut timer = TimerController::new(1000);
        timer.start_timer(0);
        clock.advance_ms(1000);
        let handle = timer.due(1000).unwrap();
        let before = store.snapshot();
        assert!(timer.fire(handle, &mut store).is_none());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn missed_periods_are_skipped() {
        let clock = ManualClock::new(0);
        let mut store = store(&clock);
        let mut timer = TimerController::new(1000);
        timer.start_timer(0);
        clock.advance_ms(5_500);
        let handle = timer.due(clock.now_ms()).unwrap();
        timer.fire(handle, &mut store);
        assert_eq!(timer.scheduled().unwrap().due_ms(), 6_500);
    }
}
