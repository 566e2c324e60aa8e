//! In-memory notification scheduler.
//!
//! Keeps the pending-reminder table in a [`tokio::sync::Mutex`] so it can
//! be shared across tasks like a real notification service. Failure
//! injection hooks let tests exercise the engine's error paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use plantcare_model::ReminderId;

use super::{NotificationScheduler, SchedulerError};

/// In-process pending-reminder table.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    /// Pending reminders keyed by id.
    pending: Mutex<BTreeMap<ReminderId, DateTime<Utc>>>,
    /// Ids whose `schedule` calls are rejected.
    rejected: Mutex<HashSet<ReminderId>>,
    /// When set, `cancel` calls fail with [`SchedulerError::Rejected`].
    cancel_rejected: AtomicBool,
    /// When set, every call fails with [`SchedulerError::Unavailable`].
    unavailable: AtomicBool,
    /// Number of successful `schedule` calls.
    schedule_calls: AtomicUsize,
}

impl InMemoryScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the pending table.
    pub async fn pending(&self) -> BTreeMap<ReminderId, DateTime<Utc>> {
        self.pending.lock().await.clone()
    }

    /// Returns the trigger time of a pending reminder.
    pub async fn trigger_for(&self, id: &ReminderId) -> Option<DateTime<Utc>> {
        self.pending.lock().await.get(id).copied()
    }

    /// Makes future `schedule` calls for `id` fail with
    /// [`SchedulerError::Rejected`].
    pub async fn reject_schedule_for(&self, id: ReminderId) {
        self.rejected.lock().await.insert(id);
    }

    /// Clears every rejection installed by
    /// [`reject_schedule_for`](Self::reject_schedule_for).
    pub async fn clear_rejections(&self) {
        self.rejected.lock().await.clear();
    }

    /// Makes `cancel` calls fail (or succeed again) while `schedule` and
    /// `list_pending_ids` keep working.
    pub fn reject_cancel(&self, rejected: bool) {
        self.cancel_rejected.store(rejected, Ordering::SeqCst);
    }

    /// Makes every call fail (or succeed again) as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `schedule` calls that succeeded.
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), SchedulerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SchedulerError::Unavailable(
                "in-memory scheduler offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl NotificationScheduler for InMemoryScheduler {
    async fn schedule(
        &self,
        id: &ReminderId,
        trigger_at: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        self.check_available()?;
        if self.rejected.lock().await.contains(id) {
            return Err(SchedulerError::Rejected(format!("reminder {id}")));
        }
        self.pending.lock().await.insert(id.clone(), trigger_at);
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel(&self, ids: &[ReminderId]) -> Result<(), SchedulerError> {
        self.check_available()?;
        if self.cancel_rejected.load(Ordering::SeqCst) {
            return Err(SchedulerError::Rejected(format!(
                "cancel of {} reminder(s)",
                ids.len()
            )));
        }
        let mut pending = self.pending.lock().await;
        for id in ids {
            pending.remove(id);
        }
        drop(pending);
        Ok(())
    }

    async fn list_pending_ids(&self) -> Result<Vec<ReminderId>, SchedulerError> {
        self.check_available()?;
        Ok(self.pending.lock().await.keys().cloned().collect())
    }
}
