use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::minutes_between;

/// Opaque activity identifier.
///
/// Freshly created activities get a UUID v4; restored ones keep whatever
/// string was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One trackable task.
///
/// Fields are only mutated by [`ActivityStore`](super::ActivityStore); everyone
/// else sees clones. `start_ms` is `Some` exactly when `running` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    id: ActivityId,
    name: String,
    #[serde(rename = "time")]
    elapsed_minutes: f64,
    running: bool,
    #[serde(rename = "start")]
    start_ms: Option<u64>,
}

impl Activity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActivityId::generate(),
            name: name.into(),
            elapsed_minutes: 0.0,
            running: false,
            start_ms: None,
        }
    }

    pub fn id(&self) -> &ActivityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_minutes
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start of the current accrual interval, if running.
    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    /// Accrued minutes plus the not-yet-committed interval up to `now_ms`.
    pub fn live_minutes(&self, now_ms: u64) -> f64 {
        match self.start_ms {
            Some(start) if self.running => self.elapsed_minutes + minutes_between(start, now_ms),
            _ => self.elapsed_minutes,
        }
    }

    /// This activity with the running interval dropped, as it looks after a reload.
    pub fn normalized(mut self) -> Self {
        self.running = false;
        self.start_ms = None;
        self
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_elapsed_minutes(&mut self, minutes: f64) {
        self.elapsed_minutes = minutes;
    }

    pub(crate) fn add_minutes(&mut self, minutes: f64) {
        self.elapsed_minutes += minutes;
    }

    pub(crate) fn begin(&mut self, now_ms: u64) {
        self.running = true;
        self.start_ms = Some(now_ms);
    }

    /// Moves the interval start forward without touching accrued time.
    pub(crate) fn restart_interval(&mut self, now_ms: u64) {
        if self.running {
            self.start_ms = Some(now_ms);
        }
    }

    /// Commits the open interval and stops. Returns the minutes added.
    pub(crate) fn finish(&mut self, now_ms: u64) -> f64 {
        let added = match self.start_ms {
            Some(start) if self.running => minutes_between(start, now_ms),
            _ => 0.0,
        };
        self.elapsed_minutes += added;
        self.running = false;
        self.start_ms = None;
        added
    }
}

/// The persisted shape of an activity.
///
/// Decoding is lenient about `running`/`start` disagreeing; converting into an
/// [`Activity`] always yields a stopped one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub name: String,
    pub time: f64,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub start: Option<u64>,
}

impl From<&Activity> for ActivityRecord {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.0.clone(),
            name: activity.name.clone(),
            time: activity.elapsed_minutes,
            running: activity.running,
            start: activity.start_ms,
        }
    }
}

impl ActivityRecord {
    /// Rebuilds a stopped activity. A negative or non-finite stored time is
    /// reset to zero and handed back as the second value.
    pub fn into_activity(self) -> (Activity, Option<f64>) {
        let (time, rejected) = if self.time.is_finite() && self.time >= 0.0 {
            (self.time, None)
        } else {
            (0.0, Some(self.time))
        };
        let activity = Activity {
            id: ActivityId(self.id),
            name: self.name,
            elapsed_minutes: time,
            running: false,
            start_ms: None,
        };
        (activity, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_activity_is_stopped_and_empty() {
        let a = Activity::new("New Activity");
        assert_eq!(a.name(), "New Activity");
        assert_eq!(a.elapsed_minutes(), 0.0);
        assert!(!a.is_running());
        assert!(a.start_ms().is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ActivityId::generate(), ActivityId::generate());
    }

    #[test]
    fn finish_commits_open_interval() {
        let mut a = Activity::new("x");
        a.begin(0);
        let added = a.finish(90_000);
        assert!((added - 1.5).abs() < 1e-9);
        assert!((a.elapsed_minutes() - 1.5).abs() < 1e-9);
        assert!(!a.is_running());
        assert!(a.start_ms().is_none());
    }

    #[test]
    fn finish_on_stopped_activity_adds_nothing() {
        let mut a = Activity::new("x");
        a.set_elapsed_minutes(3.0);
        assert_eq!(a.finish(1_000_000), 0.0);
        assert_eq!(a.elapsed_minutes(), 3.0);
    }

    #[test]
    fn live_minutes_includes_open_interval() {
        let mut a = Activity::new("x");
        a.set_elapsed_minutes(2.0);
        a.begin(60_000);
        assert!((a.live_minutes(120_000) - 3.0).abs() < 1e-9);
        assert_eq!(a.elapsed_minutes(), 2.0);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let mut a = Activity::new("Reading");
        a.begin(42);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["name"], "Reading");
        assert_eq!(json["time"], 0.0);
        assert_eq!(json["running"], true);
        assert_eq!(json["start"], 42);
        assert!(json.get("elapsed_minutes").is_none());
    }

    #[test]
    fn record_conversion_stops_and_clamps() {
        let record = ActivityRecord {
            id: "abc".into(),
            name: "Old".into(),
            time: -4.0,
            running: true,
            start: Some(5),
        };
        let (activity, rejected) = record.into_activity();
        assert_eq!(rejected, Some(-4.0));
        assert_eq!(activity.elapsed_minutes(), 0.0);
        assert!(!activity.is_running());
        assert!(activity.start_ms().is_none());
        assert_eq!(activity.id().as_str(), "abc");
    }
}
