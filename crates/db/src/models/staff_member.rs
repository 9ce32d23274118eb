use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub bio: String,
    pub image: Option<String>,
    #[sqlx(json)]
    pub qualifications: Vec<String>,
    pub start_date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateStaffMember {
    pub name: String,
    pub position: String,
    pub bio: String,
    pub image: Option<String>,
    pub qualifications: Vec<String>,
    pub start_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateStaffMember {
    pub name: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub qualifications: Option<Vec<String>>,
    pub start_date: Option<String>,
}

#[async_trait]
impl Resource for StaffMember {
    const COLLECTION: &'static str = "staff";
    const LABEL: &'static str = "staff member";

    type Create = CreateStaffMember;
    type Update = UpdateStaffMember;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateStaffMember, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, StaffMember>(
            r#"INSERT INTO staff (id, name, position, bio, image, qualifications, start_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.position)
        .bind(&data.bio)
        .bind(&data.image)
        .bind(Json(&data.qualifications))
        .bind(&data.start_date)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateStaffMember) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE staff
               SET name           = COALESCE($2, name),
                   position       = COALESCE($3, position),
                   bio            = COALESCE($4, bio),
                   image          = COALESCE($5, image),
                   qualifications = COALESCE($6, qualifications),
                   start_date     = COALESCE($7, start_date),
                   updated_at     = $8
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.position)
        .bind(&data.bio)
        .bind(&data.image)
        .bind(data.qualifications.as_ref().map(Json))
        .bind(&data.start_date)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
