//! Reminder notification port.
//!
//! Defines the [`NotificationScheduler`] trait the engine uses to manage
//! the process-wide table of pending reminders. Concrete implementations:
//! - [`memory::InMemoryScheduler`] - in-process table for tests and demos
//! - OS notification services, provided by the application shell

pub mod memory;

use chrono::{DateTime, Utc};

use plantcare_model::ReminderId;

pub use memory::InMemoryScheduler;

/// Errors reported by a notification service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The service refused the request (permission denied, invalid trigger).
    #[error("notification request rejected: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("notification service unavailable: {0}")]
    Unavailable(String),
}

/// Async access to the shared pending-reminder table.
///
/// The table is shared by every plant, so a list followed by writes is not
/// atomic. Reminder ids are plant-scoped, which keeps concurrent work on
/// different plants disjoint.
pub trait NotificationScheduler: Send + Sync {
    /// Schedules a reminder for `id` at `trigger_at`.
    ///
    /// An existing reminder with the same id is replaced. If the call
    /// fails, the previous reminder (if any) must be left untouched.
    fn schedule(
        &self,
        id: &ReminderId,
        trigger_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), SchedulerError>> + Send;

    /// Cancels the reminders with the given ids. Unknown ids are ignored.
    fn cancel(
        &self,
        ids: &[ReminderId],
    ) -> impl std::future::Future<Output = Result<(), SchedulerError>> + Send;

    /// Lists the ids of every pending reminder, across all plants.
    fn list_pending_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ReminderId>, SchedulerError>> + Send;
}
