//! Completed and upcoming task entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plant::{Plant, PlantId, TaskType};

/// Unique identifier for a task entry (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRecordId(Uuid);

impl TaskRecordId {
    /// Creates a new time-ordered identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskRecordId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TaskRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A care task for one plant, either completed or upcoming.
///
/// Completed entries are persisted once per completion and never change.
/// Upcoming entries are projections recomputed on demand and never stored.
/// Callers tell them apart with [`is_completed`](Self::is_completed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantTask {
    /// Unique identifier.
    pub id: TaskRecordId,
    /// Plant the task belongs to.
    pub plant_id: PlantId,
    /// Plant name at the time the entry was built.
    pub plant_name: String,
    /// Plant image at the time the entry was built.
    pub image_url: Option<String>,
    /// Which task.
    pub task_type: TaskType,
    /// When the task is (or was) due.
    pub due_date: DateTime<Utc>,
    /// When the task was completed; `Some` exactly when `is_completed`.
    pub completion_date: Option<DateTime<Utc>>,
    /// Whether this entry records a completion.
    pub is_completed: bool,
}

impl PlantTask {
    /// Builds a completion record.
    #[must_use]
    pub fn completed(
        plant: &Plant,
        task_type: TaskType,
        due_date: DateTime<Utc>,
        completion_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskRecordId::new(),
            plant_id: plant.id,
            plant_name: plant.name.clone(),
            image_url: plant.image_url.clone(),
            task_type,
            due_date,
            completion_date: Some(completion_date),
            is_completed: true,
        }
    }

    /// Builds an upcoming (not yet completed) entry.
    #[must_use]
    pub fn upcoming(plant: &Plant, task_type: TaskType, due_date: DateTime<Utc>) -> Self {
        Self {
            id: TaskRecordId::new(),
            plant_id: plant.id,
            plant_name: plant.name.clone(),
            image_url: plant.image_url.clone(),
            task_type,
            due_date,
            completion_date: None,
            is_completed: false,
        }
    }
}
