//! Plants and their per-task-type configurations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recurrence::RecurrenceRule;

/// Unique identifier for a plant (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlantId(Uuid);

impl PlantId {
    /// Creates a new time-ordered plant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `PlantId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a period within a task configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodId(Uuid);

impl PeriodId {
    /// Creates a new period identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for PeriodId {
    fn default() -> Self {
        Self::new()
    }
}

/// The kinds of care task a plant can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Watering.
    Watering,
    /// Checking leaves and soil for pests.
    PestInspection,
    /// Fertilizing.
    Fertilizing,
    /// Dusting or washing leaves.
    Cleaning,
    /// Moving to a new pot.
    Repotting,
    /// Taking cuttings.
    Propagation,
}

impl TaskType {
    /// Every task type, in display order.
    pub const ALL: [Self; 6] = [
        Self::Watering,
        Self::PestInspection,
        Self::Fertilizing,
        Self::Cleaning,
        Self::Repotting,
        Self::Propagation,
    ];

    /// Stable key used in reminder identifiers and serialized data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watering => "watering",
            Self::PestInspection => "pest_inspection",
            Self::Fertilizing => "fertilizing",
            Self::Cleaning => "cleaning",
            Self::Repotting => "repotting",
            Self::Propagation => "propagation",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized task type key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct UnknownTaskType(pub String);

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTaskType(s.to_string()))
    }
}

/// A named recurrence within a task configuration, e.g. "Summer watering".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// Display name.
    pub name: String,
    /// When the task recurs during this period.
    pub rule: RecurrenceRule,
}

impl Period {
    /// Creates a period with a fresh identifier.
    pub fn new(name: impl Into<String>, rule: RecurrenceRule) -> Self {
        Self {
            id: PeriodId::new(),
            name: name.into(),
            rule,
        }
    }
}

/// How one task type is tracked for one plant.
///
/// `has_notifications` only has an effect when `is_tracked` is also set;
/// see [`wants_reminder`](Self::wants_reminder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfiguration {
    /// The task this configuration applies to.
    pub task_type: TaskType,
    /// Whether the task shows up in upcoming tasks.
    pub is_tracked: bool,
    /// Whether a reminder is scheduled for the next occurrence.
    pub has_notifications: bool,
    /// Reference date for the first occurrence.
    pub start_date: DateTime<Utc>,
    /// Competing recurrences; the earliest next occurrence wins.
    pub periods: Vec<Period>,
}

impl TaskConfiguration {
    /// Creates an untracked configuration with no periods.
    #[must_use]
    pub const fn new(task_type: TaskType, start_date: DateTime<Utc>) -> Self {
        Self {
            task_type,
            is_tracked: false,
            has_notifications: false,
            start_date,
            periods: Vec::new(),
        }
    }

    /// Marks the configuration as tracked.
    #[must_use]
    pub const fn tracked(mut self) -> Self {
        self.is_tracked = true;
        self
    }

    /// Enables reminders. Also marks the configuration as tracked.
    #[must_use]
    pub const fn with_notifications(mut self) -> Self {
        self.is_tracked = true;
        self.has_notifications = true;
        self
    }

    /// Appends a period.
    #[must_use]
    pub fn with_period(mut self, period: Period) -> Self {
        self.periods.push(period);
        self
    }

    /// Returns `true` if a reminder should exist for this configuration.
    #[must_use]
    pub const fn wants_reminder(&self) -> bool {
        self.is_tracked && self.has_notifications
    }
}

/// A plant and its task configurations.
///
/// Configurations keep insertion order and hold at most one entry per
/// [`TaskType`]. Deserialization rejects input that repeats a task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlantRecord")]
pub struct Plant {
    /// Unique identifier.
    pub id: PlantId,
    /// Display name.
    pub name: String,
    /// Optional image location.
    pub image_url: Option<String>,
    configurations: Vec<TaskConfiguration>,
}

/// Error returned when plant data holds two configurations for one task type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate {0} configuration")]
pub struct DuplicateTaskType(pub TaskType);

/// Serialized form of [`Plant`], validated on the way in.
#[derive(Deserialize)]
struct PlantRecord {
    id: PlantId,
    name: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    configurations: Vec<TaskConfiguration>,
}

impl TryFrom<PlantRecord> for Plant {
    type Error = DuplicateTaskType;

    fn try_from(record: PlantRecord) -> Result<Self, Self::Error> {
        let mut plant = Self::with_id(record.id, record.name);
        plant.image_url = record.image_url;
        for cfg in record.configurations {
            if plant.configuration(cfg.task_type).is_some() {
                return Err(DuplicateTaskType(cfg.task_type));
            }
            plant.configurations.push(cfg);
        }
        Ok(plant)
    }
}

impl Plant {
    /// Creates a plant with no configurations.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(PlantId::new(), name)
    }

    /// Creates a plant with a known identifier.
    pub fn with_id(id: PlantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: None,
            configurations: Vec::new(),
        }
    }

    /// Sets the image location.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Adds or replaces a configuration (builder form of
    /// [`upsert_configuration`](Self::upsert_configuration)).
    #[must_use]
    pub fn with_configuration(mut self, configuration: TaskConfiguration) -> Self {
        self.upsert_configuration(configuration);
        self
    }

    /// Returns all configurations in insertion order.
    #[must_use]
    pub fn configurations(&self) -> &[TaskConfiguration] {
        &self.configurations
    }

    /// Returns the configuration for `task_type`, if any.
    #[must_use]
    pub fn configuration(&self, task_type: TaskType) -> Option<&TaskConfiguration> {
        self.configurations
            .iter()
            .find(|c| c.task_type == task_type)
    }

    /// Returns a mutable reference to the configuration for `task_type`.
    pub fn configuration_mut(&mut self, task_type: TaskType) -> Option<&mut TaskConfiguration> {
        self.configurations
            .iter_mut()
            .find(|c| c.task_type == task_type)
    }

    /// Inserts a configuration, replacing an existing one of the same task
    /// type in place.
    pub fn upsert_configuration(&mut self, configuration: TaskConfiguration) {
        if let Some(existing) = self.configuration_mut(configuration.task_type) {
            *existing = configuration;
        } else {
            self.configurations.push(configuration);
        }
    }

    /// Removes and returns the configuration for `task_type`.
    pub fn remove_configuration(&mut self, task_type: TaskType) -> Option<TaskConfiguration> {
        let index = self
            .configurations
            .iter()
            .position(|c| c.task_type == task_type)?;
        Some(self.configurations.remove(index))
    }
}
