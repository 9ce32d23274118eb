//! Marketing site: landing page, content feed and contact form.

use axum::{
    Router,
    extract::{Path, State},
    response::{Json as ResponseJson, Response},
    routing::{get, post},
};
use db::models::{
    activity::Activity, gallery_image::GalleryImage, menu_item::MenuItem, message::Message,
    program::Program, site_settings::SiteInfo, staff_member::StaffMember,
};
use deployment::Deployment;
use serde::Serialize;
use services::services::contact::ContactRequest;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, assets, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct PublicSite {
    /// Contact details only; notification preferences stay on the dashboard.
    pub settings: SiteInfo,
    pub programs: Vec<Program>,
    pub staff: Vec<StaffMember>,
    pub activities: Vec<Activity>,
    pub gallery: Vec<GalleryImage>,
    pub menu: Vec<MenuItem>,
}

/// Serve the landing page.
pub async fn index() -> Response {
    assets::serve("index.html")
}

/// Serve an embedded static asset.
pub async fn asset(Path(path): Path<String>) -> Response {
    assets::serve(&path)
}

/// Serve the placeholder image.
pub async fn placeholder() -> Response {
    assets::serve("placeholder.svg")
}

/// Everything the public site renders: stored site details plus the cached snapshot.
pub async fn site(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<PublicSite>>, ApiError> {
    let settings = deployment.settings().load().await?;
    let snapshot = deployment.data_provider().snapshot().await;
    Ok(ResponseJson(ApiResponse::success(PublicSite {
        settings: settings.info,
        programs: snapshot.programs.clone(),
        staff: snapshot.staff.clone(),
        activities: snapshot.activities.clone(),
        gallery: snapshot.gallery.clone(),
        menu: snapshot.menu.clone(),
    })))
}

/// Store a contact form submission in the inbox.
pub async fn contact(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<ContactRequest>,
) -> Result<ResponseJson<ApiResponse<Message>>, ApiError> {
    let message = deployment.contact().submit(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        message,
        "Thank you for reaching out",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/", get(index))
        .route("/placeholder.svg", get(placeholder))
        .route("/assets/{*path}", get(asset))
        .route("/api/public/site", get(site))
        .route("/api/contact", post(contact))
}
