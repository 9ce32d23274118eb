use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

/// One day of the weekly menu.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub snack: String,
    #[sqlx(json)]
    pub allergies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMenuItem {
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub snack: String,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateMenuItem {
    pub day: Option<String>,
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub snack: Option<String>,
    pub allergies: Option<Vec<String>>,
}

#[async_trait]
impl Resource for MenuItem {
    const COLLECTION: &'static str = "menu";
    const LABEL: &'static str = "menu";

    type Create = CreateMenuItem;
    type Update = UpdateMenuItem;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateMenuItem, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, MenuItem>(
            r#"INSERT INTO menu (id, day, breakfast, lunch, snack, allergies, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.day)
        .bind(&data.breakfast)
        .bind(&data.lunch)
        .bind(&data.snack)
        .bind(Json(&data.allergies))
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateMenuItem) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE menu
               SET day        = COALESCE($2, day),
                   breakfast  = COALESCE($3, breakfast),
                   lunch      = COALESCE($4, lunch),
                   snack      = COALESCE($5, snack),
                   allergies  = COALESCE($6, allergies),
                   updated_at = $7
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.day)
        .bind(&data.breakfast)
        .bind(&data.lunch)
        .bind(&data.snack)
        .bind(data.allergies.as_ref().map(Json))
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
