use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::site_settings::{SiteSettings, UpdateSiteSettings};
use deployment::Deployment;
use services::services::{auth::Session, settings::PasswordChange};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

/// Current site details and notification preferences.
pub async fn get_settings(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<SiteSettings>>, ApiError> {
    let settings = deployment.settings().load().await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

/// Replace the submitted sections.
pub async fn update_settings(
    State(deployment): State<DeploymentImpl>,
    axum::Json(patch): axum::Json<UpdateSiteSettings>,
) -> Result<ResponseJson<ApiResponse<SiteSettings>>, ApiError> {
    let saved = deployment.settings().update(patch).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        saved,
        "Settings saved",
    )))
}

/// Change the signed-in operator's password.
pub async fn change_password(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(change): axum::Json<PasswordChange>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment
        .settings()
        .change_password(deployment.auth().as_ref(), &session.username, &change)
        .await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Password updated",
    )))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().nest(
        "/settings",
        Router::new()
            .route("/", get(get_settings).put(update_settings))
            .route("/password", post(change_password)),
    )
}
