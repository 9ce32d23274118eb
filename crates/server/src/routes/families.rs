use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::family::{ChildRow, Family};
use deployment::Deployment;
use utils::response::ApiResponse;

use super::resources;
use crate::DeploymentImpl;

/// Every enrolled child with their parent's contact details.
pub async fn children(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<Vec<ChildRow>>> {
    let snapshot = deployment.data_provider().snapshot().await;
    ResponseJson(ApiResponse::success(Family::child_rows(&snapshot.families)))
}

pub fn router() -> Router<DeploymentImpl> {
    resources::router::<Family>(Router::new().route("/children", get(children)))
}
