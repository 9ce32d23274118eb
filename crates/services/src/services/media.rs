//! Image hosting client used for uploads from the dashboard.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};
use ts_rs::TS;

use super::config::CloudinaryConfig;

pub const DEFAULT_FOLDER: &str = "daycare";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image hosting is not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("image host returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected image host response: {0}")]
    Serde(String),
    #[error("not a data URI")]
    InvalidDataUri,
}

/// What the image host reports for a stored asset.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Placeholder or local path; nothing was sent to the host.
    Skipped,
}

/// CDN delivery options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<String>,
    pub quality: u8,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            crop: Some("fill".to_string()),
            quality: 80,
        }
    }
}

impl Transform {
    pub fn to_segment(&self) -> String {
        let mut segment = format!("q_{},f_auto", self.quality);
        if let Some(width) = self.width {
            segment.push_str(&format!(",w_{width}"));
        }
        if let Some(height) = self.height {
            segment.push_str(&format!(",h_{height}"));
        }
        if let Some(crop) = self.crop.as_deref().filter(|c| !c.is_empty()) {
            segment.push_str(&format!(",c_{crop}"));
        }
        segment
    }
}

/// Assets that live in the site bundle rather than on the image host.
pub fn is_local_asset(public_id: &str) -> bool {
    public_id.contains("placeholder.svg") || public_id.starts_with('/')
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload_data_uri(
        &self,
        data_uri: &str,
        folder: Option<&str>,
    ) -> Result<UploadedAsset, MediaError>;

    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        folder: Option<&str>,
    ) -> Result<UploadedAsset, MediaError>;

    /// Remove a hosted asset. Callers go through [`ImageHost::delete`].
    async fn destroy(&self, public_id: &str) -> Result<DeleteOutcome, MediaError>;

    fn delivery_url(&self, public_id: &str, transform: &Transform) -> Option<String>;

    async fn delete(&self, public_id: &str) -> Result<DeleteOutcome, MediaError> {
        if is_local_asset(public_id) {
            debug!(public_id, "Skipping delete of local asset");
            return Ok(DeleteOutcome::Skipped);
        }
        self.destroy(public_id).await
    }
}

/// Stand-in used when no image host credentials are configured.
pub struct UnconfiguredHost;

#[async_trait]
impl ImageHost for UnconfiguredHost {
    async fn upload_data_uri(&self, _: &str, _: Option<&str>) -> Result<UploadedAsset, MediaError> {
        Err(MediaError::NotConfigured)
    }

    async fn upload_bytes(
        &self,
        _: Vec<u8>,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> Result<UploadedAsset, MediaError> {
        Err(MediaError::NotConfigured)
    }

    async fn destroy(&self, _: &str) -> Result<DeleteOutcome, MediaError> {
        Err(MediaError::NotConfigured)
    }

    fn delivery_url(&self, _: &str, _: &Transform) -> Option<String> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct HostErrorBody {
    error: HostErrorMessage,
}

#[derive(Debug, Deserialize)]
struct HostErrorMessage {
    message: String,
}

/// Cloudinary upload API client. Requests are signed with SHA-256.
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    http: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    api_base: String,
    delivery_base: String,
}

impl CloudinaryHost {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(config: &CloudinaryConfig) -> Result<Self, MediaError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("daycare-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            delivery_base: config.delivery_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", self.api_base, self.cloud_name, resource_type, action)
    }

    /// Signed parameters plus credentials, ready to send.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = api_signature(&params, self.api_secret.expose_secret());
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn read_upload(&self, res: reqwest::Response) -> Result<UploadedAsset, MediaError> {
        let res = check_status(res).await?;
        let asset = res
            .json::<UploadedAsset>()
            .await
            .map_err(|e| MediaError::Serde(e.to_string()))?;
        info!(
            public_id = %asset.public_id,
            bytes = asset.bytes.unwrap_or_default(),
            "Uploaded asset"
        );
        Ok(asset)
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload_data_uri(
        &self,
        data_uri: &str,
        folder: Option<&str>,
    ) -> Result<UploadedAsset, MediaError> {
        if !data_uri.starts_with("data:") {
            return Err(MediaError::InvalidDataUri);
        }
        let mut params =
            self.signed_params(vec![("folder", folder.unwrap_or(DEFAULT_FOLDER).to_string())]);
        params.push(("file", data_uri.to_string()));

        let res = self
            .http
            .post(self.endpoint("auto", "upload"))
            .form(&params)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_upload(res).await
    }

    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        folder: Option<&str>,
    ) -> Result<UploadedAsset, MediaError> {
        let params =
            self.signed_params(vec![("folder", folder.unwrap_or(DEFAULT_FOLDER).to_string())]);
        let size = bytes.len();
        let file = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(map_reqwest_error)?;
        let form = params
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("file", file);

        debug!(file_name, size, "Uploading file");
        let res = self
            .http
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_upload(res).await
    }

    async fn destroy(&self, public_id: &str) -> Result<DeleteOutcome, MediaError> {
        let params = self.signed_params(vec![("public_id", public_id.to_string())]);
        let res = self
            .http
            .post(self.endpoint("image", "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = check_status(res)
            .await?
            .json::<DestroyResponse>()
            .await
            .map_err(|e| MediaError::Serde(e.to_string()))?;

        match body.result.as_str() {
            "ok" => {
                info!(public_id, "Deleted asset");
                Ok(DeleteOutcome::Deleted)
            }
            "not found" => {
                warn!(public_id, "Asset already gone from image host");
                Ok(DeleteOutcome::NotFound)
            }
            other => Err(MediaError::Serde(format!("unexpected destroy result {other:?}"))),
        }
    }

    fn delivery_url(&self, public_id: &str, transform: &Transform) -> Option<String> {
        Some(format!(
            "{}/{}/image/upload/{}/{}",
            self.delivery_base,
            self.cloud_name,
            transform.to_segment(),
            public_id
        ))
    }
}

/// Hex SHA-256 of `k=v` pairs sorted by key and joined with `&`, followed by the secret.
pub fn api_signature(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{to_sign}{secret}").as_bytes()))
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, MediaError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let body = serde_json::from_str::<HostErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    Err(MediaError::Http { status, body })
}

fn map_reqwest_error(e: reqwest::Error) -> MediaError {
    if e.is_timeout() {
        MediaError::Timeout
    } else {
        MediaError::Transport(e.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::{Form as AxumForm, Multipart, Path, State},
        http::StatusCode,
        routing::post,
    };
    use serde_json::json;

    use super::*;

    /// Minimal image host recording what it received.
    #[derive(Clone, Default)]
    pub(crate) struct FakeHost {
        pub uploads: Arc<Mutex<Vec<HashMap<String, String>>>>,
        pub destroyed: Arc<Mutex<Vec<String>>>,
    }

    async fn upload_form(
        State(host): State<FakeHost>,
        Path(cloud): Path<String>,
        AxumForm(params): AxumForm<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if cloud == "broken" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"message": "Invalid image file"}})),
            );
        }
        let folder = params.get("folder").cloned().unwrap_or_default();
        host.uploads.lock().unwrap().push(params);
        (StatusCode::OK, Json(asset_json(&folder, "photo")))
    }

    async fn upload_multipart(
        State(host): State<FakeHost>,
        mut multipart: Multipart,
    ) -> Json<serde_json::Value> {
        let mut params = HashMap::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                params.insert("file_name".to_string(), file_name);
                params.insert("file_len".to_string(), bytes.len().to_string());
            } else {
                params.insert(name, field.text().await.unwrap());
            }
        }
        let folder = params.get("folder").cloned().unwrap_or_default();
        host.uploads.lock().unwrap().push(params);
        Json(asset_json(&folder, "upload"))
    }

    async fn destroy(
        State(host): State<FakeHost>,
        AxumForm(params): AxumForm<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let public_id = params.get("public_id").cloned().unwrap_or_default();
        let result = if public_id.starts_with("missing") { "not found" } else { "ok" };
        host.destroyed.lock().unwrap().push(public_id);
        Json(json!({ "result": result }))
    }

    fn asset_json(folder: &str, name: &str) -> serde_json::Value {
        json!({
            "public_id": format!("{folder}/{name}"),
            "secure_url": format!("https://res.example.com/{folder}/{name}.jpg"),
            "url": format!("http://res.example.com/{folder}/{name}.jpg"),
            "format": "jpg",
            "bytes": 1234,
            "width": 640,
            "height": 480,
            "resource_type": "image"
        })
    }

    pub(crate) async fn spawn_fake_host() -> (FakeHost, SocketAddr) {
        let host = FakeHost::default();
        let app = Router::new()
            .route("/{cloud}/auto/upload", post(upload_form))
            .route("/multipart/auto/upload", post(upload_multipart))
            .route("/{cloud}/image/destroy", post(destroy))
            .with_state(host.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (host, addr)
    }

    pub(crate) fn config_for(addr: SocketAddr, cloud_name: &str) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: cloud_name.to_string(),
            api_key: "key".to_string(),
            api_secret: SecretString::from("abcd"),
            api_base: format!("http://{addr}"),
            delivery_base: "https://res.cloudinary.com".to_string(),
        }
    }

    #[test]
    fn signature_covers_sorted_params_and_secret() {
        let params = vec![
            ("timestamp", "1315060510".to_string()),
            ("folder", "daycare".to_string()),
        ];
        assert_eq!(
            api_signature(&params, "abcd"),
            "3007ee298f65c9c69cc1da5e0cabc1bc5aab100a69dbb2af934f72e16545abbb"
        );
    }

    #[test]
    fn delivery_url_lists_transformations_in_order() {
        let host = CloudinaryHost::new(&config_for("127.0.0.1:1".parse().unwrap(), "demo")).unwrap();
        let url = host
            .delivery_url(
                "daycare/art",
                &Transform {
                    width: Some(400),
                    height: Some(300),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/q_80,f_auto,w_400,h_300,c_fill/daycare/art"
        );
        assert_eq!(Transform::default().to_segment(), "q_80,f_auto,c_fill");
    }

    #[tokio::test]
    async fn data_uri_upload_is_signed_and_defaults_folder() {
        let (fake, addr) = spawn_fake_host().await;
        let host = CloudinaryHost::new(&config_for(addr, "demo")).unwrap();

        let asset = host
            .upload_data_uri("data:image/png;base64,iVBORw0KGgo=", None)
            .await
            .unwrap();
        assert_eq!(asset.public_id, "daycare/photo");
        assert_eq!(asset.bytes, Some(1234));

        let uploads = fake.uploads.lock().unwrap();
        let sent = &uploads[0];
        assert_eq!(sent["folder"], "daycare");
        assert_eq!(sent["api_key"], "key");
        assert_eq!(sent["signature_algorithm"], "sha256");
        let expected = api_signature(
            &[
                ("folder", "daycare".to_string()),
                ("timestamp", sent["timestamp"].clone()),
            ],
            "abcd",
        );
        assert_eq!(sent["signature"], expected);
    }

    #[tokio::test]
    async fn multipart_upload_sends_the_file() {
        let (fake, addr) = spawn_fake_host().await;
        let host = CloudinaryHost::new(&config_for(addr, "multipart")).unwrap();

        let asset = host
            .upload_bytes(vec![7; 2048], "art.jpg", "image/jpeg", Some("gallery"))
            .await
            .unwrap();
        assert_eq!(asset.public_id, "gallery/upload");
        let uploads = fake.uploads.lock().unwrap();
        assert_eq!(uploads[0]["file_name"], "art.jpg");
        assert_eq!(uploads[0]["file_len"], "2048");
    }

    #[tokio::test]
    async fn host_errors_surface_without_partial_state() {
        let (fake, addr) = spawn_fake_host().await;
        let host = CloudinaryHost::new(&config_for(addr, "broken")).unwrap();
        let err = host
            .upload_data_uri("data:image/png;base64,AAAA", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Http { status: 400, ref body } if body == "Invalid image file"));
        assert!(fake.uploads.lock().unwrap().is_empty());

        assert!(matches!(
            host.upload_data_uri("https://example.com/a.png", None).await,
            Err(MediaError::InvalidDataUri)
        ));
    }

    #[tokio::test]
    async fn delete_skips_local_assets() {
        let (fake, addr) = spawn_fake_host().await;
        let host = CloudinaryHost::new(&config_for(addr, "demo")).unwrap();

        assert_eq!(
            host.delete("/placeholder.svg?height=400&width=600").await.unwrap(),
            DeleteOutcome::Skipped
        );
        assert_eq!(host.delete("/images/logo.png").await.unwrap(), DeleteOutcome::Skipped);
        assert_eq!(host.delete("daycare/art").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(host.delete("missing/art").await.unwrap(), DeleteOutcome::NotFound);
        assert_eq!(*fake.destroyed.lock().unwrap(), vec!["daycare/art", "missing/art"]);

        assert!(matches!(
            UnconfiguredHost.delete("daycare/art").await,
            Err(MediaError::NotConfigured)
        ));
        assert_eq!(
            UnconfiguredHost.delete("placeholder.svg").await.unwrap(),
            DeleteOutcome::Skipped
        );
    }
}
