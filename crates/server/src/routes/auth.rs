use axum::{
    Router,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::auth::Session;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl, assets,
    error::ApiError,
    middleware::{cleared_session_cookie, session_cookie, session_token},
};

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// Check the admin pair and set the session cookie.
pub async fn login(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = deployment
        .auth()
        .login(&payload.username, &payload.password)
        .await?;
    let cookie = session_cookie(&session.token, deployment.config().secure_cookies());
    Ok((
        [(SET_COOKIE, cookie)],
        ResponseJson(ApiResponse::<Session>::success(session)),
    )
        .into_response())
}

/// Close the session and clear the cookie.
pub async fn logout(State(deployment): State<DeploymentImpl>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        deployment.auth().close_session(&token).await;
    }
    let cookie = cleared_session_cookie(deployment.config().secure_cookies());
    (
        [(SET_COOKIE, cookie)],
        ResponseJson(ApiResponse::success(AuthStatus {
            authenticated: false,
            username: None,
        })),
    )
        .into_response()
}

/// Whether the request carries a live session.
pub async fn check(
    State(deployment): State<DeploymentImpl>,
    headers: HeaderMap,
) -> ResponseJson<ApiResponse<AuthStatus>> {
    let session = match session_token(&headers) {
        Some(token) => deployment.auth().validate_session(&token).await,
        None => None,
    };
    ResponseJson(ApiResponse::success(AuthStatus {
        authenticated: session.is_some(),
        username: session.map(|s| s.username),
    }))
}

/// Serve the login page.
pub async fn login_page() -> Response {
    assets::serve("login.html")
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/api/auth", post(login).delete(logout))
        .route("/api/auth/check", get(check))
        .route("/login", get(login_page))
}
