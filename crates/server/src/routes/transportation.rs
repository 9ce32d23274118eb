use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::transportation_route::TransportationRoute;
use deployment::Deployment;
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::resources;
use crate::DeploymentImpl;

#[derive(Debug, Serialize, TS)]
pub struct RouteOccupancy {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub current_children: i32,
    pub occupancy_percent: i32,
}

/// Seats taken on every route.
pub async fn occupancy(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<Vec<RouteOccupancy>>> {
    let snapshot = deployment.data_provider().snapshot().await;
    let routes = snapshot
        .transportation
        .iter()
        .map(|route| RouteOccupancy {
            id: route.id,
            name: route.name.clone(),
            capacity: route.capacity,
            current_children: route.current_children,
            occupancy_percent: route.occupancy_percent(),
        })
        .collect();
    ResponseJson(ApiResponse::success(routes))
}

pub fn router() -> Router<DeploymentImpl> {
    resources::router::<TransportationRoute>(Router::new().route("/occupancy", get(occupancy)))
}
