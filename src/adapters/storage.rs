use crate::domain::model::BoundaryRecord;
use crate::domain::ports::BoundaryStore;
use crate::utils::error::{AreaError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 記憶體內的紀錄儲存，clone 之後共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct MemoryBoundaryStore {
    records: Arc<Mutex<HashMap<Uuid, BoundaryRecord>>>,
}

impl MemoryBoundaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl BoundaryStore for MemoryBoundaryStore {
    async fn insert(&self, record: &BoundaryRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.area_id) {
            return Err(AreaError::PersistenceError {
                message: format!("record for area {} already exists", record.area_id),
            });
        }
        records.insert(record.area_id, record.clone());
        Ok(())
    }

    async fn find_by_area_id(&self, area_id: Uuid) -> Result<Option<BoundaryRecord>> {
        Ok(self.records.lock().await.get(&area_id).cloned())
    }

    async fn delete_by_area_id(&self, area_id: Uuid) -> Result<()> {
        self.records.lock().await.remove(&area_id);
        Ok(())
    }
}

/// 每個 area 一個 JSON 檔 (`<base>/<area_id>.json`)
#[derive(Debug, Clone)]
pub struct FileBoundaryStore {
    base_path: PathBuf,
}

impl FileBoundaryStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, area_id: Uuid) -> PathBuf {
        self.base_path.join(format!("{}.json", area_id))
    }
}

impl BoundaryStore for FileBoundaryStore {
    async fn insert(&self, record: &BoundaryRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let data = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.record_path(record.area_id), data)
            .await
            .map_err(|e| AreaError::PersistenceError {
                message: format!("failed to write record for area {}: {}", record.area_id, e),
            })
    }

    async fn find_by_area_id(&self, area_id: Uuid) -> Result<Option<BoundaryRecord>> {
        match tokio::fs::read(self.record_path(area_id)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AreaError::IoError(e)),
        }
    }

    async fn delete_by_area_id(&self, area_id: Uuid) -> Result<()> {
        match tokio::fs::remove_file(self.record_path(area_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AreaError::IoError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_replace_keeps_one_record() {
        let store = MemoryBoundaryStore::new();
        let area_id = Uuid::new_v4();

        store
            .replace(&BoundaryRecord::failure(area_id, "first", 1))
            .await
            .unwrap();
        store
            .replace(&BoundaryRecord::failure(area_id, "second", 2))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        let record = store.find_by_area_id(area_id).await.unwrap().unwrap();
        assert_eq!(record.error_message.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_insert() {
        let store = MemoryBoundaryStore::new();
        let record = BoundaryRecord::failure(Uuid::new_v4(), "boom", 1);

        store.insert(&record).await.unwrap();
        assert!(matches!(
            store.insert(&record).await,
            Err(AreaError::PersistenceError { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBoundaryStore::new(temp_dir.path().join("boundaries"));
        let record = BoundaryRecord::failure(Uuid::new_v4(), "no polygons", 42);

        store.replace(&record).await.unwrap();

        let loaded = store.find_by_area_id(record.area_id).await.unwrap();
        assert_eq!(loaded, Some(record.clone()));
        assert!(store.base_path().join(format!("{}.json", record.area_id)).exists());
    }

    #[tokio::test]
    async fn test_file_store_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileBoundaryStore::new(temp_dir.path());
        let record = BoundaryRecord::failure(Uuid::new_v4(), "x", 0);

        store.insert(&record).await.unwrap();
        store.delete_by_area_id(record.area_id).await.unwrap();
        store.delete_by_area_id(record.area_id).await.unwrap();

        assert!(store.find_by_area_id(record.area_id).await.unwrap().is_none());
    }
}
