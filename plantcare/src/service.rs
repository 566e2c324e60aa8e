//! Application-facing facade over the scheduling engine.
//!
//! [`PlantCareService`] wires one shared notification scheduler, task store
//! and clock into the synchronizer and completion coordinator, and exposes
//! the operations an application shell needs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use plantcare_model::{Plant, PlantId, PlantTask, TaskType};

use crate::batch::BatchOutcome;
use crate::clock::Clock;
use crate::completion::{CompletionOutcome, TaskCompletionCoordinator, TaskError};
use crate::config::EngineConfig;
use crate::notify::NotificationScheduler;
use crate::schedule::{project, project_all};
use crate::store::{StoreError, TaskStore};
use crate::sync::{ScheduleSynchronizer, SyncError, SyncReport};

/// Entry point for applications using the engine.
pub struct PlantCareService<N: NotificationScheduler, S: TaskStore, C: Clock> {
    config: EngineConfig,
    clock: C,
    store: Arc<S>,
    synchronizer: ScheduleSynchronizer<N>,
    completions: TaskCompletionCoordinator<N, S>,
}

impl<N: NotificationScheduler, S: TaskStore, C: Clock> PlantCareService<N, S, C> {
    /// Creates a service over shared collaborators.
    #[must_use]
    pub fn new(config: EngineConfig, scheduler: Arc<N>, store: Arc<S>, clock: C) -> Self {
        Self {
            config,
            clock,
            synchronizer: ScheduleSynchronizer::new(Arc::clone(&scheduler)),
            completions: TaskCompletionCoordinator::new(scheduler, Arc::clone(&store)),
            store,
        }
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Upcoming tasks of `plant` within the configured default horizon.
    #[must_use]
    pub fn upcoming_tasks(&self, plant: &Plant) -> Vec<PlantTask> {
        self.upcoming_tasks_within(plant, self.config.default_horizon_days)
    }

    /// Upcoming tasks of `plant` within `horizon_days` (capped at the
    /// configured maximum).
    #[must_use]
    pub fn upcoming_tasks_within(&self, plant: &Plant, horizon_days: u32) -> Vec<PlantTask> {
        project(plant, self.config.clamp_horizon(horizon_days), self.clock.now())
    }

    /// Upcoming tasks of several plants, merged by due date.
    #[must_use]
    pub fn upcoming_tasks_for(&self, plants: &[Plant], horizon_days: u32) -> Vec<PlantTask> {
        project_all(plants, self.config.clamp_horizon(horizon_days), self.clock.now())
    }

    /// Completion records of one plant.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    pub async fn completed_tasks(&self, plant_id: &PlantId) -> Result<Vec<PlantTask>, StoreError> {
        self.store.get_all(plant_id).await
    }

    /// Completion records of several plants. A plant whose records cannot
    /// be read is reported in `failed` without affecting the others.
    pub async fn completed_tasks_for(
        &self,
        plant_ids: &[PlantId],
    ) -> BatchOutcome<Vec<PlantTask>, (PlantId, StoreError)> {
        join_all(plant_ids.iter().map(|id| async move {
            self.store.get_all(id).await.map_err(|e| (*id, e))
        }))
        .await
        .into_iter()
        .collect()
    }

    /// [`ScheduleSynchronizer::synchronize`] at the clock's current instant.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] describing each failed step.
    pub async fn synchronize(&self, plant: &Plant) -> Result<SyncReport, SyncError> {
        self.synchronizer.synchronize(plant, self.clock.now()).await
    }

    /// [`ScheduleSynchronizer::synchronize_all`] at the clock's current
    /// instant.
    pub async fn synchronize_all(&self, plants: &[Plant]) -> BatchOutcome<SyncReport, SyncError> {
        self.synchronizer
            .synchronize_all(plants, self.clock.now())
            .await
    }

    /// See [`TaskCompletionCoordinator::complete_task`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if the task type is not configured or the
    /// completion could not be stored.
    pub async fn complete_task(
        &self,
        plant: &Plant,
        task_type: TaskType,
        completion_date: DateTime<Utc>,
    ) -> Result<CompletionOutcome, TaskError> {
        self.completions
            .complete_task(plant, task_type, completion_date)
            .await
    }

    /// Completes `task_type` on `plant` at the clock's current instant.
    ///
    /// # Errors
    ///
    /// Same as [`complete_task`](Self::complete_task).
    pub async fn complete_task_now(
        &self,
        plant: &Plant,
        task_type: TaskType,
    ) -> Result<CompletionOutcome, TaskError> {
        self.complete_task(plant, task_type, self.clock.now()).await
    }

    /// See [`TaskCompletionCoordinator::delete_task`].
    ///
    /// # Errors
    ///
    /// Returns the collaborator failure.
    pub async fn delete_task(&self, task: &PlantTask) -> Result<(), TaskError> {
        self.completions.delete_task(task).await
    }

    /// See [`TaskCompletionCoordinator::delete_task_type`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Scheduling`] if the reminder cannot be cancelled.
    pub async fn delete_task_type(&self, plant: &Plant, task_type: TaskType) -> Result<(), TaskError> {
        self.completions.delete_task_type(&plant.id, task_type).await
    }

    /// See [`TaskCompletionCoordinator::delete_plant`].
    ///
    /// # Errors
    ///
    /// Returns the first collaborator failure.
    pub async fn delete_plant(&self, plant_id: &PlantId) -> Result<usize, TaskError> {
        self.completions.delete_plant(plant_id).await
    }
}
