//! Systems - logic that operates on parts and units

mod lifecycle;
pub mod repair;

pub use lifecycle::*;
pub use repair::{estimate, plan_task, RepairEstimate, RepairTask, TaskBlocked, TaskRoll, Technician};
