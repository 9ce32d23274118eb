use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{FromRow, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

/// A CRUD-managed record kind stored in its own table.
///
/// Listing, lookup and deletion are shared; each kind supplies its own insert
/// and partial update because those bind kind-specific columns.
#[async_trait]
pub trait Resource:
    Clone + Serialize + DeserializeOwned + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static
{
    /// Table name, also used as the collection segment in URLs.
    const COLLECTION: &'static str;
    /// Singular, lowercase name used in operator-facing notices.
    const LABEL: &'static str;

    type Create: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Every field optional; `None` leaves the stored value untouched.
    type Update: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn id(&self) -> Uuid;

    async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid ASC", Self::COLLECTION);
        sqlx::query_as::<_, Self>(&sql).fetch_all(pool).await
    }

    async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", Self::COLLECTION);
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn create(pool: &SqlitePool, data: &Self::Create, id: Uuid) -> Result<Self, sqlx::Error>;

    /// Returns the number of rows touched (0 when `id` is unknown).
    async fn update(pool: &SqlitePool, id: Uuid, data: &Self::Update) -> Result<u64, sqlx::Error>;

    async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::COLLECTION);
        sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await
    }
}
