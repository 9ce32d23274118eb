use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct GalleryImage {
    pub id: Uuid,
    pub url: String,
    /// Image host identifier; absent for images that were never uploaded.
    pub public_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateGalleryImage {
    pub url: String,
    pub public_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateGalleryImage {
    pub url: Option<String>,
    pub public_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
impl Resource for GalleryImage {
    const COLLECTION: &'static str = "gallery";
    const LABEL: &'static str = "image";

    type Create = CreateGalleryImage;
    type Update = UpdateGalleryImage;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(
        pool: &SqlitePool,
        data: &CreateGalleryImage,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, GalleryImage>(
            r#"INSERT INTO gallery (id, url, public_id, title, description, uploaded_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.url)
        .bind(&data.public_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateGalleryImage,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE gallery
               SET url         = COALESCE($2, url),
                   public_id   = COALESCE($3, public_id),
                   title       = COALESCE($4, title),
                   description = COALESCE($5, description),
                   updated_at  = $6
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.url)
        .bind(&data.public_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
