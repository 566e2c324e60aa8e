//! Recording completions and advancing the reminder schedule.
//!
//! [`TaskCompletionCoordinator`] handles everything that happens when a
//! care task is marked done or deleted: the completion record, the
//! satisfied reminder, and the reminder for the next occurrence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use plantcare_model::{Plant, PlantId, PlantTask, ReminderId, TaskType};

use crate::notify::{NotificationScheduler, SchedulerError};
use crate::schedule::next_due;
use crate::store::{StoreError, TaskStore};

/// Errors that can occur during task completion and deletion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The plant has no configuration for the requested task type.
    #[error("plant {plant_id} has no {task_type} configuration")]
    TaskTypeNotFound {
        /// The plant that was looked up.
        plant_id: PlantId,
        /// The missing task type.
        task_type: TaskType,
    },

    /// The task store rejected a read, write, or delete.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// The notification service rejected a request.
    #[error("scheduling failed: {0}")]
    Scheduling(#[from] SchedulerError),
}

/// What happened to the next reminder after a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// The next reminder was scheduled.
    Scheduled {
        /// The reminder slot.
        reminder_id: ReminderId,
        /// When it fires.
        trigger_at: DateTime<Utc>,
    },
    /// The configuration has no next occurrence.
    NoOccurrence,
    /// The configuration is not tracked with notifications.
    NotificationsDisabled,
    /// Scheduling failed. The completion itself was still recorded.
    Failed {
        /// The reminder slot.
        reminder_id: ReminderId,
        /// When it should have fired.
        trigger_at: DateTime<Utc>,
        /// Error from the notification service.
        error: SchedulerError,
    },
}

/// Result of a successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// The persisted completion record.
    pub record: PlantTask,
    /// What happened to the next reminder.
    pub reminder: ReminderOutcome,
}

/// Records completions and reschedules reminders.
pub struct TaskCompletionCoordinator<N: NotificationScheduler, S: TaskStore> {
    scheduler: Arc<N>,
    store: Arc<S>,
}

impl<N: NotificationScheduler, S: TaskStore> TaskCompletionCoordinator<N, S> {
    /// Creates a coordinator over a shared scheduler and store.
    #[must_use]
    pub const fn new(scheduler: Arc<N>, store: Arc<S>) -> Self {
        Self { scheduler, store }
    }

    /// Marks `task_type` on `plant` as done at `completion_date`.
    ///
    /// The current reminder is cancelled (best effort), a completion record
    /// is stored, and the reminder for the next occurrence after
    /// `completion_date` is scheduled. A scheduling failure at the end is
    /// reported in [`CompletionOutcome::reminder`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskTypeNotFound`] if `plant` has no
    /// configuration for `task_type` (nothing is changed), or
    /// [`TaskError::Persistence`] if the record could not be stored (no
    /// next reminder is scheduled).
    pub async fn complete_task(
        &self,
        plant: &Plant,
        task_type: TaskType,
        completion_date: DateTime<Utc>,
    ) -> Result<CompletionOutcome, TaskError> {
        let cfg = plant
            .configuration(task_type)
            .ok_or(TaskError::TaskTypeNotFound {
                plant_id: plant.id,
                task_type,
            })?;
        let reminder_id = ReminderId::new(&plant.id, task_type);

        if let Err(e) = self
            .scheduler
            .cancel(std::slice::from_ref(&reminder_id))
            .await
        {
            tracing::warn!(reminder_id = %reminder_id, error = %e, "failed to cancel satisfied reminder");
        }

        let record = PlantTask::completed(plant, task_type, completion_date, completion_date);
        if let Err(e) = self.store.create(&record).await {
            tracing::warn!(
                plant_id = %plant.id,
                task_type = %task_type,
                error = %e,
                "failed to record completion, next reminder not scheduled"
            );
            return Err(e.into());
        }

        let reminder = if !cfg.wants_reminder() {
            ReminderOutcome::NotificationsDisabled
        } else if let Some(trigger_at) = next_due(completion_date, &cfg.periods) {
            match self.scheduler.schedule(&reminder_id, trigger_at).await {
                Ok(()) => ReminderOutcome::Scheduled {
                    reminder_id,
                    trigger_at,
                },
                Err(error) => {
                    tracing::warn!(
                        reminder_id = %reminder_id,
                        error = %error,
                        "completion recorded but next reminder could not be scheduled"
                    );
                    ReminderOutcome::Failed {
                        reminder_id,
                        trigger_at,
                        error,
                    }
                }
            }
        } else {
            ReminderOutcome::NoOccurrence
        };

        tracing::info!(
            plant_id = %plant.id,
            task_type = %task_type,
            record_id = %record.id,
            "task completed"
        );
        Ok(CompletionOutcome { record, reminder })
    }

    /// Deletes a task entry.
    ///
    /// A completed entry is removed from the store. An upcoming entry has no
    /// stored record, so its reminder is cancelled instead.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Persistence`] or [`TaskError::Scheduling`] from
    /// the respective collaborator.
    pub async fn delete_task(&self, task: &PlantTask) -> Result<(), TaskError> {
        if task.is_completed {
            self.store.delete(&task.plant_id, &task.id).await?;
            tracing::debug!(plant_id = %task.plant_id, record_id = %task.id, "completion record deleted");
        } else {
            let reminder_id = ReminderId::new(&task.plant_id, task.task_type);
            self.scheduler
                .cancel(std::slice::from_ref(&reminder_id))
                .await?;
            tracing::debug!(reminder_id = %reminder_id, "upcoming reminder cancelled");
        }
        Ok(())
    }

    /// Removes the upcoming `task_type` task of `plant_id` without needing
    /// a materialized record: its pending reminder is cancelled. Completion
    /// records of that type are history and stay in the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Scheduling`] if the cancellation fails.
    pub async fn delete_task_type(
        &self,
        plant_id: &PlantId,
        task_type: TaskType,
    ) -> Result<(), TaskError> {
        let reminder_id = ReminderId::new(plant_id, task_type);
        self.scheduler
            .cancel(std::slice::from_ref(&reminder_id))
            .await?;
        tracing::info!(reminder_id = %reminder_id, "upcoming task type removed");
        Ok(())
    }

    /// Removes every reminder and completion record of a deleted plant.
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns the first collaborator failure.
    pub async fn delete_plant(&self, plant_id: &PlantId) -> Result<usize, TaskError> {
        let reminders: Vec<ReminderId> = self
            .scheduler
            .list_pending_ids()
            .await?
            .into_iter()
            .filter(|id| id.belongs_to(plant_id))
            .collect();
        if !reminders.is_empty() {
            self.scheduler.cancel(&reminders).await?;
        }

        let records = self.store.get_all(plant_id).await?;
        for record in &records {
            self.store.delete(plant_id, &record.id).await?;
        }
        tracing::info!(
            plant_id = %plant_id,
            reminders = reminders.len(),
            records = records.len(),
            "plant data removed"
        );
        Ok(records.len())
    }
}
