//! Reconciliation of a plant's reminders with its task configurations.
//!
//! [`ScheduleSynchronizer::synchronize`] upserts one reminder per
//! configuration that wants one, then cancels every other pending reminder
//! carrying the plant's prefix. Reminder ids are deterministic, so running
//! it again with unchanged input leaves the table as it was.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use plantcare_model::{Plant, PlantId, ReminderId, TaskType};

use crate::batch::BatchOutcome;
use crate::notify::{NotificationScheduler, SchedulerError};
use crate::schedule::next_due_on_or_after;

/// What a successful (or partially successful) synchronization changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The plant that was synchronized.
    pub plant_id: PlantId,
    /// Reminders upserted, with their trigger times.
    pub scheduled: Vec<(ReminderId, DateTime<Utc>)>,
    /// Stale reminders removed.
    pub cancelled: Vec<ReminderId>,
}

impl SyncReport {
    const fn new(plant_id: PlantId) -> Self {
        Self {
            plant_id,
            scheduled: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

/// A single step of a synchronization that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncFailure {
    /// Upserting a configuration's reminder failed; the previous reminder
    /// for that slot is left as it was.
    #[error("failed to schedule {reminder_id} ({task_type}): {source}")]
    Schedule {
        /// Task type of the configuration.
        task_type: TaskType,
        /// The reminder slot.
        reminder_id: ReminderId,
        /// Error from the notification service.
        source: SchedulerError,
    },

    /// Listing pending reminders failed, so stale reminders were not removed.
    #[error("failed to list pending reminders: {0}")]
    ListPending(SchedulerError),

    /// Cancelling stale reminders failed.
    #[error("failed to cancel {} stale reminder(s): {source}", .ids.len())]
    Cancel {
        /// The reminders that should have been cancelled.
        ids: Vec<ReminderId>,
        /// Error from the notification service.
        source: SchedulerError,
    },
}

/// Synchronization of one plant finished with at least one failed step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("synchronizing plant {plant_id} failed ({} error(s))", .failures.len())]
pub struct SyncError {
    /// The plant whose synchronization failed.
    pub plant_id: PlantId,
    /// Each failed step.
    pub failures: Vec<SyncFailure>,
    /// The steps that did succeed.
    pub partial: SyncReport,
}

/// Keeps the pending-reminder table consistent with plant configurations.
pub struct ScheduleSynchronizer<N: NotificationScheduler> {
    scheduler: Arc<N>,
}

impl<N: NotificationScheduler> ScheduleSynchronizer<N> {
    /// Creates a synchronizer over a shared notification scheduler.
    #[must_use]
    pub const fn new(scheduler: Arc<N>) -> Self {
        Self { scheduler }
    }

    /// Reconciles `plant`'s reminders with its configurations.
    ///
    /// 1. Every configuration that is tracked with notifications on and has
    ///    an occurrence at or after `now` (counted from its start date) gets
    ///    its reminder upserted to the earliest such occurrence.
    /// 2. Every other pending reminder of the plant is cancelled. This
    ///    covers removed task types, untracked or muted configurations, and
    ///    configurations with nothing left to schedule.
    ///
    /// A slot whose upsert fails is kept, not cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] listing every failed step. Steps are attempted
    /// even after an earlier one failed.
    pub async fn synchronize(
        &self,
        plant: &Plant,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(plant.id);
        let mut failures = Vec::new();
        let mut valid: HashSet<ReminderId> = HashSet::new();

        for cfg in plant.configurations() {
            if !cfg.wants_reminder() {
                continue;
            }
            let reminder_id = ReminderId::new(&plant.id, cfg.task_type);
            let Some(trigger_at) = next_due_on_or_after(cfg.start_date, &cfg.periods, now) else {
                tracing::debug!(
                    plant_id = %plant.id,
                    task_type = %cfg.task_type,
                    "no upcoming occurrence, nothing to schedule"
                );
                continue;
            };

            match self.scheduler.schedule(&reminder_id, trigger_at).await {
                Ok(()) => {
                    tracing::debug!(reminder_id = %reminder_id, %trigger_at, "reminder upserted");
                    report.scheduled.push((reminder_id.clone(), trigger_at));
                }
                Err(source) => {
                    tracing::warn!(
                        reminder_id = %reminder_id,
                        error = %source,
                        "failed to schedule reminder, keeping previous state"
                    );
                    failures.push(SyncFailure::Schedule {
                        task_type: cfg.task_type,
                        reminder_id: reminder_id.clone(),
                        source,
                    });
                }
            }
            valid.insert(reminder_id);
        }

        match self.scheduler.list_pending_ids().await {
            Ok(pending) => {
                let stale: Vec<ReminderId> = pending
                    .into_iter()
                    .filter(|id| id.belongs_to(&plant.id) && !valid.contains(id))
                    .collect();
                if !stale.is_empty() {
                    match self.scheduler.cancel(&stale).await {
                        Ok(()) => {
                            tracing::info!(
                                plant_id = %plant.id,
                                count = stale.len(),
                                "removed stale reminders"
                            );
                            report.cancelled = stale;
                        }
                        Err(source) => {
                            tracing::warn!(plant_id = %plant.id, error = %source, "stale reminder cleanup failed");
                            failures.push(SyncFailure::Cancel { ids: stale, source });
                        }
                    }
                }
            }
            Err(source) => {
                tracing::warn!(plant_id = %plant.id, error = %source, "could not list pending reminders");
                failures.push(SyncFailure::ListPending(source));
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(SyncError {
                plant_id: plant.id,
                failures,
                partial: report,
            })
        }
    }

    /// Synchronizes every plant, isolating per-plant failures.
    ///
    /// Plants are processed concurrently; their reminder ids never overlap.
    pub async fn synchronize_all(
        &self,
        plants: &[Plant],
        now: DateTime<Utc>,
    ) -> BatchOutcome<SyncReport, SyncError> {
        let outcome: BatchOutcome<_, _> = join_all(plants.iter().map(|p| self.synchronize(p, now)))
            .await
            .into_iter()
            .collect();
        if !outcome.is_complete() {
            tracing::warn!(
                failed = outcome.failed.len(),
                total = plants.len(),
                "some plants failed to synchronize"
            );
        }
        outcome
    }
}
