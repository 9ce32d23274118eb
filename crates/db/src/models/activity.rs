use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub age_group: String,
    pub duration: String,
    #[sqlx(json)]
    pub materials: Vec<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateActivity {
    pub name: String,
    pub description: String,
    pub age_group: String,
    pub duration: String,
    pub materials: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateActivity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub age_group: Option<String>,
    pub duration: Option<String>,
    pub materials: Option<Vec<String>>,
    pub image: Option<String>,
}

#[async_trait]
impl Resource for Activity {
    const COLLECTION: &'static str = "activities";
    const LABEL: &'static str = "activity";

    type Create = CreateActivity;
    type Update = UpdateActivity;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateActivity, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Activity>(
            r#"INSERT INTO activities (id, name, description, age_group, duration, materials, image, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.age_group)
        .bind(&data.duration)
        .bind(Json(&data.materials))
        .bind(&data.image)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateActivity) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE activities
               SET name        = COALESCE($2, name),
                   description = COALESCE($3, description),
                   age_group   = COALESCE($4, age_group),
                   duration    = COALESCE($5, duration),
                   materials   = COALESCE($6, materials),
                   image       = COALESCE($7, image),
                   updated_at  = $8
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.age_group)
        .bind(&data.duration)
        .bind(data.materials.as_ref().map(Json))
        .bind(&data.image)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
