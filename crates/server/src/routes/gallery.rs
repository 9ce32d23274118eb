use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json as ResponseJson,
    routing::post,
};
use db::models::gallery_image::{CreateGalleryImage, GalleryImage};
use deployment::Deployment;
use services::services::crud::CrudOutcome;
use utils::response::ApiResponse;

use super::{
    media::{UPLOAD_LIMIT_BYTES, read_upload},
    resources,
};
use crate::{DeploymentImpl, error::ApiError};

/// Upload a photo to the image host and record it in the gallery.
pub async fn upload(
    State(deployment): State<DeploymentImpl>,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<CrudOutcome<GalleryImage>>>, ApiError> {
    let mut form = read_upload(multipart).await?;
    let bytes = std::mem::take(&mut form.bytes);
    let asset = deployment
        .media()
        .upload_bytes(
            bytes,
            &form.file_name,
            &form.content_type,
            form.field("folder"),
        )
        .await?;
    let outcome = deployment
        .controller::<GalleryImage>()
        .create(CreateGalleryImage {
            url: asset.secure_url,
            public_id: Some(asset.public_id),
            title: form.field("title").map(str::to_string),
            description: form.field("description").map(str::to_string),
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub fn router() -> Router<DeploymentImpl> {
    resources::router::<GalleryImage>(
        Router::new().route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        ),
    )
}
