//! How a tick turns wall-clock time into accrued minutes.
//!
//! Two strategies are provided:
//!
//! - [`TimestampDelta`] adds `now - start` and moves `start` to `now`. Exact
//!   regardless of scheduler jitter or skipped ticks.
//! - [`FixedIncrement`] adds one tick period per tick. Immune to clock jumps,
//!   but under-counts whenever ticks are skipped.
//!
//! Both move the interval start to `now`, so a stop right after a tick only
//! commits the time since that tick.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::activity::Activity;
use crate::clock::minutes_between;

pub trait AccrualStrategy: Send + Sync + fmt::Debug {
    /// Returns `activity` advanced to `now_ms`. Stopped activities come back unchanged.
    fn advance(&self, activity: &Activity, now_ms: u64) -> Activity;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampDelta;

impl AccrualStrategy for TimestampDelta {
    fn advance(&self, activity: &Activity, now_ms: u64) -> Activity {
        let mut next = activity.clone();
        if let Some(start) = activity.start_ms().filter(|_| activity.is_running()) {
            next.add_minutes(minutes_between(start, now_ms));
            next.restart_interval(now_ms);
        }
        next
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedIncrement {
    increment_minutes: f64,
}

impl FixedIncrement {
    pub fn per_tick(tick_interval_ms: u64) -> Self {
        Self {
            increment_minutes: tick_interval_ms as f64 / 60_000.0,
        }
    }
}

impl AccrualStrategy for FixedIncrement {
    fn advance(&self, activity: &Activity, now_ms: u64) -> Activity {
        let mut next = activity.clone();
        if activity.is_running() {
            next.add_minutes(self.increment_minutes);
            next.restart_interval(now_ms);
        }
        next
    }
}

/// Configurable selector for the accrual strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualKind {
    #[default]
    TimestampDelta,
    FixedIncrement,
}

impl AccrualKind {
    pub fn build(self, tick_interval_ms: u64) -> Box<dyn AccrualStrategy> {
        match self {
            AccrualKind::TimestampDelta => Box::new(TimestampDelta),
            AccrualKind::FixedIncrement => Box::new(FixedIncrement::per_tick(tick_interval_ms)),
        }
    }
}

impl fmt::Display for AccrualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccrualKind::TimestampDelta => write!(f, "timestamp_delta"),
            AccrualKind::FixedIncrement => write!(f, "fixed_increment"),
        }
    }
}

impl std::str::FromStr for AccrualKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "timestamp_delta" => Ok(AccrualKind::TimestampDelta),
            "fixed_increment" => Ok(AccrualKind::FixedIncrement),
            _ => Err(format!("Unknown accrual strategy: {s}")),
        }
    }
}
