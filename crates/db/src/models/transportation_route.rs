use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct RouteStop {
    pub location: String,
    pub time: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct TransportationRoute {
    pub id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub areas: Vec<String>,
    pub schedule: String,
    pub driver: String,
    pub capacity: i32,
    pub current_children: i32,
    #[sqlx(json)]
    pub stops: Vec<RouteStop>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransportationRoute {
    /// Seats taken as a whole percentage. A route without capacity reads as empty.
    pub fn occupancy_percent(&self) -> i32 {
        if self.capacity <= 0 {
            return 0;
        }
        let percent = i64::from(self.current_children) * 100 / i64::from(self.capacity);
        i32::try_from(percent.max(0)).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTransportationRoute {
    pub name: String,
    pub areas: Vec<String>,
    pub schedule: String,
    pub driver: String,
    pub capacity: i32,
    pub current_children: i32,
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateTransportationRoute {
    pub name: Option<String>,
    pub areas: Option<Vec<String>>,
    pub schedule: Option<String>,
    pub driver: Option<String>,
    pub capacity: Option<i32>,
    pub current_children: Option<i32>,
    pub stops: Option<Vec<RouteStop>>,
}

#[async_trait]
impl Resource for TransportationRoute {
    const COLLECTION: &'static str = "transportation";
    const LABEL: &'static str = "route";

    type Create = CreateTransportationRoute;
    type Update = UpdateTransportationRoute;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(
        pool: &SqlitePool,
        data: &CreateTransportationRoute,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, TransportationRoute>(
            r#"INSERT INTO transportation (id, name, areas, schedule, driver, capacity, current_children, stops, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(Json(&data.areas))
        .bind(&data.schedule)
        .bind(&data.driver)
        .bind(data.capacity)
        .bind(data.current_children)
        .bind(Json(&data.stops))
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTransportationRoute,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE transportation
               SET name             = COALESCE($2, name),
                   areas            = COALESCE($3, areas),
                   schedule         = COALESCE($4, schedule),
                   driver           = COALESCE($5, driver),
                   capacity         = COALESCE($6, capacity),
                   current_children = COALESCE($7, current_children),
                   stops            = COALESCE($8, stops),
                   updated_at       = $9
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.areas.as_ref().map(Json))
        .bind(&data.schedule)
        .bind(&data.driver)
        .bind(data.capacity)
        .bind(data.current_children)
        .bind(data.stops.as_ref().map(Json))
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

    fn route(capacity: i32, current_children: i32) -> CreateTransportationRoute {
        CreateTransportationRoute {
            name: "North Route".to_string(),
            areas: vec!["Maple Heights".to_string(), "Oak Park".to_string()],
            schedule: "7:00 AM - 8:30 AM".to_string(),
            driver: "Michael Brown".to_string(),
            capacity,
            current_children,
            stops: vec![RouteStop {
                location: "Maple Heights Community Center".to_string(),
                time: "7:15 AM".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn stops_survive_a_round_trip_through_sqlite() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        TransportationRoute::create(&db.pool, &route(15, 12), id).await.unwrap();
        let stored = TransportationRoute::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(stored.stops.len(), 1);
        assert_eq!(stored.stops[0].time, "7:15 AM");
        assert_eq!(stored.occupancy_percent(), 80);
    }

    #[tokio::test]
    async fn occupancy_rounds_down_and_tolerates_zero_capacity() {
        let db = DBService::new_in_memory().await.unwrap();
        let full = TransportationRoute::create(&db.pool, &route(3, 2), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(full.occupancy_percent(), 66);
        let empty = TransportationRoute::create(&db.pool, &route(0, 0), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(empty.occupancy_percent(), 0);
    }

    #[tokio::test]
    async fn occupancy_of_huge_routes_does_not_overflow() {
        let db = DBService::new_in_memory().await.unwrap();
        let huge = TransportationRoute::create(
            &db.pool,
            &route(30_000_000, 25_000_000),
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(huge.occupancy_percent(), 83);

        let overbooked = TransportationRoute::create(&db.pool, &route(1, i32::MAX), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(overbooked.occupancy_percent(), i32::MAX);
    }
}
