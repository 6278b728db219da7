mod model;
mod store;

pub use model::{Activity, ActivityId, ActivityRecord};
pub use store::ActivityStore;
