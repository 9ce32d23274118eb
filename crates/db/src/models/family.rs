use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

/// A child enrolled through a family. Children only exist inside their family record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct Child {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub program: String,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Family {
    pub id: Uuid,
    pub parent_name: String,
    pub email: String,
    pub phone: String,
    #[sqlx(json)]
    pub children: Vec<Child>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened child listing shown next to the family table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct ChildRow {
    pub family_id: Uuid,
    pub parent_name: String,
    pub parent_phone: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub child: Child,
}

impl Family {
    pub fn child_rows(families: &[Family]) -> Vec<ChildRow> {
        families
            .iter()
            .flat_map(|family| {
                family.children.iter().map(move |child| ChildRow {
                    family_id: family.id,
                    parent_name: family.parent_name.clone(),
                    parent_phone: family.phone.clone(),
                    child: child.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFamily {
    pub parent_name: String,
    pub email: String,
    pub phone: String,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateFamily {
    pub parent_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub children: Option<Vec<Child>>,
}

#[async_trait]
impl Resource for Family {
    const COLLECTION: &'static str = "families";
    const LABEL: &'static str = "family";

    type Create = CreateFamily;
    type Update = UpdateFamily;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateFamily, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Family>(
            r#"INSERT INTO families (id, parent_name, email, phone, children, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.parent_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(Json(&data.children))
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateFamily) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE families
               SET parent_name = COALESCE($2, parent_name),
                   email       = COALESCE($3, email),
                   phone       = COALESCE($4, phone),
                   children    = COALESCE($5, children),
                   updated_at  = $6
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.parent_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.children.as_ref().map(Json))
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
