//! Deterministic reminder identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plant::{PlantId, TaskType};

/// Identifier of the single reminder slot for a `(plant, task type)` pair.
///
/// Formatted as `"{plant_id}_{task_type}"`. Because the key is derived
/// rather than generated, scheduling the same slot twice replaces the
/// earlier reminder instead of adding a second one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(String);

impl ReminderId {
    /// Builds the reminder id for `task_type` on `plant_id`.
    #[must_use]
    pub fn new(plant_id: &PlantId, task_type: TaskType) -> Self {
        Self(format!("{}{}", Self::plant_prefix(plant_id), task_type.as_str()))
    }

    /// Wraps a raw identifier read back from a notification service.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The prefix shared by every reminder of `plant_id`.
    #[must_use]
    pub fn plant_prefix(plant_id: &PlantId) -> String {
        format!("{plant_id}_")
    }

    /// Returns `true` if this reminder belongs to `plant_id`.
    #[must_use]
    pub fn belongs_to(&self, plant_id: &PlantId) -> bool {
        self.0.starts_with(&Self::plant_prefix(plant_id))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
