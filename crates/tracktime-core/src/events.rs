use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityId};

/// Every state change in the system produces an Event.
/// The CLI prints them; a GUI would use them to refresh its view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    ActivityAdded {
        id: ActivityId,
        name: String,
        at: DateTime<Utc>,
    },
    ActivityRenamed {
        id: ActivityId,
        name: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        id: ActivityId,
        name: String,
        start_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        id: ActivityId,
        name: String,
        /// Minutes committed by this stop.
        added_minutes: f64,
        elapsed_minutes: f64,
        at: DateTime<Utc>,
    },
    TimeCleared {
        id: ActivityId,
        /// The activity kept running with a fresh interval.
        running: bool,
        at: DateTime<Utc>,
    },
    TimeEdited {
        id: ActivityId,
        previous_minutes: f64,
        elapsed_minutes: f64,
        at: DateTime<Utc>,
    },
    ActivityDeleted {
        id: ActivityId,
        name: String,
        at: DateTime<Utc>,
    },
    /// One accrual tick was applied to the running activity.
    Ticked {
        id: ActivityId,
        elapsed_minutes: f64,
        at: DateTime<Utc>,
    },
    /// The timer controller changed between idle and active.
    TimerStateChanged {
        state: TimerStatus,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        activities: Vec<Activity>,
        timer: TimerStatus,
        running: Option<ActivityId>,
        total_minutes: f64,
        at: DateTime<Utc>,
    },
}

/// Whether the accrual tick is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Active,
}

/// Converts an epoch-millisecond instant into an event timestamp.
pub fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::TimerStateChanged {
            state: TimerStatus::Active,
            at: timestamp(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerStateChanged");
        assert_eq!(json["state"], "active");
        assert_eq!(json["at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn timestamp_converts_millis() {
        assert_eq!(timestamp(1_500).timestamp_millis(), 1_500);
    }
}
