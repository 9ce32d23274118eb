//! Per-collection CRUD seam between handlers and the database.

use async_trait::async_trait;
use db::{DBService, models::Resource};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: Uuid },
}

/// Create/read/update/delete for any [`Resource`].
///
/// Writes are last-write-wins. Deleting an id that does not exist succeeds.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Every record in the collection, oldest first.
    async fn list<R: Resource>(&self) -> Result<Vec<R>, RecordStoreError>;

    async fn get<R: Resource>(&self, id: Uuid) -> Result<Option<R>, RecordStoreError>;

    async fn create<R: Resource>(&self, data: R::Create) -> Result<R, RecordStoreError>;

    async fn update<R: Resource>(&self, id: Uuid, data: R::Update) -> Result<(), RecordStoreError>;

    async fn delete<R: Resource>(&self, id: Uuid) -> Result<(), RecordStoreError>;
}

#[async_trait]
impl RecordStore for DBService {
    async fn list<R: Resource>(&self) -> Result<Vec<R>, RecordStoreError> {
        R::find_all(&self.pool).await.map_err(|e| {
            error!(collection = R::COLLECTION, error = %e, "Failed to list records");
            e.into()
        })
    }

    async fn get<R: Resource>(&self, id: Uuid) -> Result<Option<R>, RecordStoreError> {
        Ok(R::find_by_id(&self.pool, id).await?)
    }

    async fn create<R: Resource>(&self, data: R::Create) -> Result<R, RecordStoreError> {
        let id = Uuid::new_v4();
        let record = R::create(&self.pool, &data, id).await.map_err(|e| {
            error!(collection = R::COLLECTION, error = %e, "Failed to create record");
            RecordStoreError::from(e)
        })?;
        debug!(collection = R::COLLECTION, id = %id, "Record created");
        Ok(record)
    }

    async fn update<R: Resource>(&self, id: Uuid, data: R::Update) -> Result<(), RecordStoreError> {
        let touched = R::update(&self.pool, id, &data).await.map_err(|e| {
            error!(collection = R::COLLECTION, id = %id, error = %e, "Failed to update record");
            RecordStoreError::from(e)
        })?;
        if touched == 0 {
            return Err(RecordStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            });
        }
        debug!(collection = R::COLLECTION, id = %id, "Record updated");
        Ok(())
    }

    async fn delete<R: Resource>(&self, id: Uuid) -> Result<(), RecordStoreError> {
        let removed = R::delete(&self.pool, id).await.map_err(|e| {
            error!(collection = R::COLLECTION, id = %id, error = %e, "Failed to delete record");
            RecordStoreError::from(e)
        })?;
        debug!(collection = R::COLLECTION, id = %id, removed, "Record deleted");
        Ok(())
    }
}
