//! Completed-task persistence port.
//!
//! Defines the [`TaskStore`] trait for persisting completion records keyed
//! by plant. Implementations include:
//! - [`memory::InMemoryTaskStore`] - in-memory store for tests
//! - document-database stores, provided by the application shell

pub mod memory;

use plantcare_model::{PlantId, PlantTask, TaskRecordId};

pub use memory::InMemoryTaskStore;

/// Errors that can occur during task storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A read operation failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// The requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Trait for persisting completed-task records.
pub trait TaskStore: Send + Sync {
    /// Stores a new completion record.
    fn create(
        &self,
        record: &PlantTask,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Deletes one record of a plant.
    fn delete(
        &self,
        plant_id: &PlantId,
        record_id: &TaskRecordId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Retrieves every record of a plant, oldest completion first.
    fn get_all(
        &self,
        plant_id: &PlantId,
    ) -> impl std::future::Future<Output = Result<Vec<PlantTask>, StoreError>> + Send;
}
