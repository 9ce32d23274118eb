use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

/// Category value that disables filtering in the document library.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub doc_type: String,
    pub category: String,
    pub format: String,
    pub last_updated: String,
    pub size: String,
    pub required: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn in_category(documents: &[Document], category: &str) -> Vec<Document> {
        if category == ALL_CATEGORIES {
            return documents.to_vec();
        }
        documents
            .iter()
            .filter(|doc| doc.category == category)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDocument {
    pub name: String,
    pub doc_type: String,
    pub category: String,
    pub format: String,
    pub last_updated: String,
    pub size: String,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub doc_type: Option<String>,
    pub category: Option<String>,
    pub format: Option<String>,
    pub last_updated: Option<String>,
    pub size: Option<String>,
    pub required: Option<bool>,
    pub description: Option<String>,
}

#[async_trait]
impl Resource for Document {
    const COLLECTION: &'static str = "documents";
    const LABEL: &'static str = "document";

    type Create = CreateDocument;
    type Update = UpdateDocument;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateDocument, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Document>(
            r#"INSERT INTO documents (id, name, doc_type, category, format, last_updated, size, required, description, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.doc_type)
        .bind(&data.category)
        .bind(&data.format)
        .bind(&data.last_updated)
        .bind(&data.size)
        .bind(data.required)
        .bind(&data.description)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateDocument) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE documents
               SET name         = COALESCE($2, name),
                   doc_type     = COALESCE($3, doc_type),
                   category     = COALESCE($4, category),
                   format       = COALESCE($5, format),
                   last_updated = COALESCE($6, last_updated),
                   size         = COALESCE($7, size),
                   required     = COALESCE($8, required),
                   description  = COALESCE($9, description),
                   updated_at   = $10
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.doc_type)
        .bind(&data.category)
        .bind(&data.format)
        .bind(&data.last_updated)
        .bind(&data.size)
        .bind(data.required)
        .bind(&data.description)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
