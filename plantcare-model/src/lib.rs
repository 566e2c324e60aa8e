//! Shared data model for the `PlantCare` scheduling engine.
//!
//! Plants own task configurations, configurations own recurrence periods,
//! and reminders are addressed by deterministic per-plant keys.

pub mod plant;
pub mod recurrence;
pub mod reminder;
pub mod task;

pub use plant::{
    DuplicateTaskType, Period, PeriodId, Plant, PlantId, TaskConfiguration, TaskType,
    UnknownTaskType,
};
pub use recurrence::{DayOfYear, RecurrenceRule, RuleError};
pub use reminder::ReminderId;
pub use task::{PlantTask, TaskRecordId};
