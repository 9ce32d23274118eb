//! Image host proxy. Uploads are forwarded as-is; nothing is validated locally.

use std::collections::HashMap;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::media::{DeleteOutcome, MediaError, Transform, UploadedAsset};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// A multipart upload: the `file` part plus any plain text fields.
pub struct UploadForm {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file = None;
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| {
                    mime_guess::from_path(&file_name)
                        .first_or_octet_stream()
                        .to_string()
                });
            let bytes = field.bytes().await?;
            file = Some((bytes.to_vec(), file_name, content_type));
        } else {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }
    let (bytes, file_name, content_type) =
        file.ok_or_else(|| ApiError::BadRequest("file is required".to_string()))?;
    Ok(UploadForm {
        bytes,
        file_name,
        content_type,
        fields,
    })
}

/// Upload one multipart file to the image host.
pub async fn upload(
    State(deployment): State<DeploymentImpl>,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<UploadedAsset>>, ApiError> {
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
    Ok(ResponseJson(ApiResponse::success(asset)))
}

#[derive(Debug, Deserialize, TS)]
pub struct DataUriUpload {
    pub data_uri: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Upload a base64 data URI to the image host.
pub async fn upload_data_uri(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<DataUriUpload>,
) -> Result<ResponseJson<ApiResponse<UploadedAsset>>, ApiError> {
    let asset = deployment
        .media()
        .upload_data_uri(&payload.data_uri, payload.folder.as_deref())
        .await?;
    Ok(ResponseJson(ApiResponse::success(asset)))
}

#[derive(Debug, Deserialize, TS)]
pub struct DeleteAsset {
    pub public_id: String,
}

#[derive(Debug, Serialize, TS)]
pub struct DeleteResult {
    pub public_id: String,
    pub outcome: DeleteOutcome,
}

/// Remove an asset from the image host.
pub async fn delete(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<DeleteAsset>,
) -> Result<ResponseJson<ApiResponse<DeleteResult>>, ApiError> {
    let outcome = deployment.media().delete(&payload.public_id).await?;
    Ok(ResponseJson(ApiResponse::success(DeleteResult {
        public_id: payload.public_id,
        outcome,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<String>,
    pub quality: Option<u8>,
}

/// Build a transformed delivery URL for a hosted asset.
pub async fn delivery_url(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<DeliveryQuery>,
) -> Result<ResponseJson<ApiResponse<String>>, ApiError> {
    let defaults = Transform::default();
    let transform = Transform {
        width: query.width,
        height: query.height,
        crop: query.crop.or(defaults.crop),
        quality: query.quality.unwrap_or(defaults.quality),
    };
    let url = deployment
        .media()
        .delivery_url(&query.public_id, &transform)
        .ok_or(MediaError::NotConfigured)?;
    Ok(ResponseJson(ApiResponse::success(url)))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().nest(
        "/media",
        Router::new()
            .route("/upload", post(upload))
            .route("/upload-data-uri", post(upload_data_uri))
            .route("/delete", post(delete))
            .route("/url", get(delivery_url))
            .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
    )
}
