//! Database setup page: sample content and schema status.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use deployment::Deployment;
use services::services::{database_validator::ValidationResult, seed::SeedReport};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

/// Insert sample content into empty collections.
pub async fn seed(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<SeedReport>>, ApiError> {
    let report = deployment.seed().await?;
    let message = format!("Inserted {} sample records", report.total_inserted());
    Ok(ResponseJson(ApiResponse::success_with_message(report, message)))
}

/// Report which tables exist.
pub async fn status(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<ValidationResult>>, ApiError> {
    let result = deployment.database_validator().validate().await?;
    let summary = result.summary();
    Ok(ResponseJson(ApiResponse::success_with_message(result, summary)))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().nest(
        "/setup",
        Router::new()
            .route("/seed", post(seed))
            .route("/status", get(status)),
    )
}
