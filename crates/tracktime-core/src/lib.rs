//! # tracktime Core Library
//!
//! Core business logic for the tracktime activity timer. All operations are
//! available through the library; the CLI binary is a thin presentation layer
//! over the same core.
//!
//! ## Architecture
//!
//! - **Activity Store**: the ordered activity collection and its mutations,
//!   enforcing that at most one activity runs at a time
//! - **Timer Controller**: a caller-driven Idle/Active state machine whose
//!   ticks accrue time for the running activity
//! - **Persistence**: the whole collection round-trips as one JSON value in a
//!   key-value store (SQLite file or in-memory)
//!
//! ## Key Components
//!
//! - [`Tracker`]: the presentation-facing facade
//! - [`ActivityStore`]: canonical activity collection
//! - [`TimerController`]: accrual tick scheduling
//! - [`PersistenceAdapter`]: load/save of the collection
//! - [`Config`]: application configuration management

pub mod activity;
pub mod clock;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use activity::{Activity, ActivityId, ActivityRecord, ActivityStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ActivityError, ConfigError, CoreError, PersistenceError, StorageError};
pub use events::{Event, TimerStatus};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, PersistenceAdapter, STORAGE_KEY};
pub use timer::{AccrualKind, AccrualStrategy, FixedIncrement, TickHandle, TimerController, TimestampDelta};
pub use tracker::Tracker;
