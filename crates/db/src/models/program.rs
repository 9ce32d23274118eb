use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub age_range: String,
    pub description: String,
    pub schedule: String,
    pub capacity: i32,
    pub tuition: String,
    #[sqlx(json)]
    pub features: Vec<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProgram {
    pub name: String,
    pub age_range: String,
    pub description: String,
    pub schedule: String,
    pub capacity: i32,
    pub tuition: String,
    pub features: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProgram {
    pub name: Option<String>,
    pub age_range: Option<String>,
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub capacity: Option<i32>,
    pub tuition: Option<String>,
    pub features: Option<Vec<String>>,
    pub image: Option<String>,
}

#[async_trait]
impl Resource for Program {
    const COLLECTION: &'static str = "programs";
    const LABEL: &'static str = "program";

    type Create = CreateProgram;
    type Update = UpdateProgram;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateProgram, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Program>(
            r#"INSERT INTO programs (id, name, age_range, description, schedule, capacity, tuition, features, image, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.age_range)
        .bind(&data.description)
        .bind(&data.schedule)
        .bind(data.capacity)
        .bind(&data.tuition)
        .bind(Json(&data.features))
        .bind(&data.image)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateProgram) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE programs
               SET name        = COALESCE($2, name),
                   age_range   = COALESCE($3, age_range),
                   description = COALESCE($4, description),
                   schedule    = COALESCE($5, schedule),
                   capacity    = COALESCE($6, capacity),
                   tuition     = COALESCE($7, tuition),
                   features    = COALESCE($8, features),
                   image       = COALESCE($9, image),
                   updated_at  = $10
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.age_range)
        .bind(&data.description)
        .bind(&data.schedule)
        .bind(data.capacity)
        .bind(&data.tuition)
        .bind(data.features.as_ref().map(Json))
        .bind(&data.image)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn toddler_program() -> CreateProgram {
        CreateProgram {
            name: "Toddler Explorers".to_string(),
            age_range: "1-2 years".to_string(),
            description: "Hands-on discovery".to_string(),
            schedule: "Mon-Fri 7:00 AM - 6:00 PM".to_string(),
            capacity: 12,
            tuition: "$300/week".to_string(),
            features: vec!["Tummy time".to_string(), "Sensory play".to_string(), String::new()],
            image: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_keeps_list_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let created = Program::create(&db.pool, &toddler_program(), id).await.unwrap();
        assert_eq!(created.id, id);

        let found = Program::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(found.features, vec!["Tummy time", "Sensory play", ""]);
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn partial_update_leaves_other_columns() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        Program::create(&db.pool, &toddler_program(), id).await.unwrap();

        let patch = UpdateProgram {
            capacity: Some(14),
            ..Default::default()
        };
        assert_eq!(Program::update(&db.pool, id, &patch).await.unwrap(), 1);

        let found = Program::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(found.capacity, 14);
        assert_eq!(found.name, "Toddler Explorers");
        assert_eq!(found.features.len(), 3);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_touch_nothing() {
        let db = DBService::new_in_memory().await.unwrap();
        let missing = Uuid::new_v4();
        assert_eq!(
            Program::update(&db.pool, missing, &UpdateProgram::default()).await.unwrap(),
            0
        );
        assert_eq!(Program::delete(&db.pool, missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_all_is_in_insertion_order() {
        let db = DBService::new_in_memory().await.unwrap();
        let mut ids = Vec::new();
        for name in ["Infant Care", "Toddler Explorers", "Preschool"] {
            let id = Uuid::new_v4();
            let mut data = toddler_program();
            data.name = name.to_string();
            Program::create(&db.pool, &data, id).await.unwrap();
            ids.push(id);
        }
        let all = Program::find_all(&db.pool).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), ids);
        assert_eq!(Program::count(&db.pool).await.unwrap(), 3);
    }
}
