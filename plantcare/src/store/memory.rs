//! In-memory task store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use plantcare_model::{PlantId, PlantTask, TaskRecordId};

use super::{StoreError, TaskStore};

/// Per-plant record lists behind a [`RwLock`].
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<PlantId, Vec<PlantTask>>>,
    unavailable: AtomicBool,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail (or succeed again) as if storage were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Total number of stored records across all plants.
    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

impl TaskStore for InMemoryTaskStore {
    async fn create(&self, record: &PlantTask) -> Result<(), StoreError> {
        self.check_available()?;
        self.records
            .write()
            .await
            .entry(record.plant_id)
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn delete(&self, plant_id: &PlantId, record_id: &TaskRecordId) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        let list = records
            .get_mut(plant_id)
            .ok_or_else(|| StoreError::NotFound(format!("plant {plant_id}")))?;
        let index = list
            .iter()
            .position(|r| r.id == *record_id)
            .ok_or_else(|| StoreError::NotFound(format!("record {record_id}")))?;
        list.remove(index);
        if list.is_empty() {
            records.remove(plant_id);
        }
        drop(records);
        Ok(())
    }

    async fn get_all(&self, plant_id: &PlantId) -> Result<Vec<PlantTask>, StoreError> {
        self.check_available()?;
        let mut list = self
            .records
            .read()
            .await
            .get(plant_id)
            .cloned()
            .unwrap_or_default();
        list.sort_by_key(|r| r.completion_date);
        Ok(list)
    }
}
