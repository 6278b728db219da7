mod accrual;
mod controller;

pub use accrual::{AccrualKind, AccrualStrategy, FixedIncrement, TimestampDelta};
pub use controller::{TickHandle, TimerController};
