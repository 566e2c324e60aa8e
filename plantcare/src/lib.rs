//! `PlantCare`: recurring plant-care task scheduling engine.
//!
//! Computes when care tasks are next due, projects upcoming occurrences,
//! keeps a reminder table consistent with plant configurations, and
//! advances the schedule when tasks are completed. Notification delivery,
//! persistence and time are injected through the [`notify`], [`store`] and
//! [`clock`] ports.

pub mod batch;
pub mod clock;
pub mod completion;
pub mod config;
pub mod logging;
pub mod notify;
pub mod schedule;
pub mod service;
pub mod store;
pub mod sync;

pub use plantcare_model as model;

pub use batch::BatchOutcome;
pub use clock::{Clock, ManualClock, SystemClock};
pub use completion::{CompletionOutcome, ReminderOutcome, TaskCompletionCoordinator, TaskError};
pub use config::{ConfigError, EngineConfig, LoggingConfig};
pub use logging::{LoggingError, init_logging};
pub use notify::{InMemoryScheduler, NotificationScheduler, SchedulerError};
pub use service::PlantCareService;
pub use store::{InMemoryTaskStore, StoreError, TaskStore};
pub use sync::{ScheduleSynchronizer, SyncError, SyncFailure, SyncReport};
