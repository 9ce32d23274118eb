use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use deployment::Deployment;
use serde::Serialize;
use services::services::{
    auth::Session,
    data_provider::{Overview, ProviderState, Snapshot},
};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub username: String,
    pub overview: Overview,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Dashboard landing data: counts plus loading and error state.
pub async fn overview(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
) -> ResponseJson<ApiResponse<DashboardOverview>> {
    let state = deployment.data_provider().state().await;
    ResponseJson(ApiResponse::success(DashboardOverview {
        username: session.username,
        overview: state.snapshot.overview(),
        is_loading: state.is_loading,
        error: state.error,
    }))
}

/// The whole cached snapshot with its generation.
pub async fn snapshot(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<ProviderState>> {
    ResponseJson(ApiResponse::success(
        deployment.data_provider().state().await,
    ))
}

/// Reload every collection now.
pub async fn refresh(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Arc<Snapshot>>>, ApiError> {
    let snapshot = deployment.data_provider().refresh().await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new()
        .route("/snapshot", get(snapshot))
        .route("/snapshot/refresh", post(refresh))
}
