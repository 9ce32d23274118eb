use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use db::models::{
    activity::Activity, menu_item::MenuItem, program::Program, staff_member::StaffMember,
};
use tower_http::trace::TraceLayer;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, middleware::require_session};

pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod families;
pub mod gallery;
pub mod media;
pub mod messages;
pub mod public;
pub mod resources;
pub mod settings;
pub mod setup;
pub mod transportation;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(dashboard::router())
        .merge(resources::router::<Activity>(Router::new()))
        .merge(resources::router::<Program>(Router::new()))
        .merge(resources::router::<StaffMember>(Router::new()))
        .merge(resources::router::<MenuItem>(Router::new()))
        .merge(families::router())
        .merge(documents::router())
        .merge(messages::router())
        .merge(transportation::router())
        .merge(gallery::router())
        .merge(media::router())
        .merge(settings::router())
        .merge(setup::router());

    let gated = Router::new()
        .route("/", get(dashboard::overview))
        .nest("/api", api);

    // The gate sits on the outer router so unmatched `/dashboard/*` paths
    // are redirected too, not answered by the fallback.
    Router::new()
        .merge(public::router(&deployment))
        .merge(auth::router(&deployment))
        .nest("/dashboard", gated)
        .fallback(not_found)
        .layer(from_fn_with_state(deployment.clone(), require_session))
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

/// JSON 404 for anything no route claims.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        ResponseJson(ApiResponse::<()>::error("Not found")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use db::DBService;
    use local_deployment::LocalDeployment;
    use serde_json::{Value, json};
    use services::services::{
        config::Config,
        media::{DeleteOutcome, ImageHost, MediaError, Transform, UnconfiguredHost, UploadedAsset},
    };
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageHost for RecordingHost {
        async fn upload_data_uri(
            &self,
            _data_uri: &str,
            folder: Option<&str>,
        ) -> Result<UploadedAsset, MediaError> {
            self.upload_bytes(Vec::new(), "inline.png", "image/png", folder)
                .await
        }

        async fn upload_bytes(
            &self,
            bytes: Vec<u8>,
            file_name: &str,
            _content_type: &str,
            folder: Option<&str>,
        ) -> Result<UploadedAsset, MediaError> {
            let public_id = format!(
                "{}/{}",
                folder.unwrap_or("daycare"),
                file_name.trim_end_matches(".png")
            );
            Ok(UploadedAsset {
                secure_url: format!("https://cdn.test/{public_id}.png"),
                url: format!("http://cdn.test/{public_id}.png"),
                public_id,
                format: Some("png".to_string()),
                bytes: Some(bytes.len() as u64),
                width: None,
                height: None,
                resource_type: Some("image".to_string()),
                created_at: None,
            })
        }

        async fn destroy(&self, public_id: &str) -> Result<DeleteOutcome, MediaError> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(DeleteOutcome::Deleted)
        }

        fn delivery_url(&self, public_id: &str, transform: &Transform) -> Option<String> {
            Some(format!("https://cdn.test/{}/{public_id}", transform.to_segment()))
        }
    }

    async fn app_with(media: Arc<dyn ImageHost>) -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let db = DBService::new_in_memory().await.unwrap();
        router(LocalDeployment::from_parts(config, db, media))
    }

    async fn app() -> Router {
        app_with(Arc::new(UnconfiguredHost)).await
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn fetch(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = send(
            app,
            json_request(
                "POST",
                "/api/auth",
                None,
                json!({ "username": "admin", "password": "admin123" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn login_opens_the_dashboard() {
        let app = app().await;
        let cookie = login(&app).await;
        assert!(cookie.starts_with("auth="));

        let response = send(&app, fetch("/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["username"], "admin");
        assert_eq!(body["data"]["overview"]["programs"], 0);

        let check = body_json(send(&app, fetch("/api/auth/check", Some(&cookie))).await).await;
        assert_eq!(check["data"]["authenticated"], true);
    }

    #[tokio::test]
    async fn wrong_password_sets_no_cookie_and_keeps_the_gate_shut() {
        let app = app().await;
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/auth",
                None,
                json!({ "username": "admin", "password": "wrong" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await["message"], "Invalid credentials");

        let response = send(&app, fetch("/dashboard/api/programs?page=1", None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?from=%2Fdashboard%2Fapi%2Fprograms%3Fpage%3D1"
        );
    }

    #[tokio::test]
    async fn unmatched_dashboard_paths_are_gated_too() {
        let app = app().await;
        for (uri, from) in [
            ("/dashboard/programs", "%2Fdashboard%2Fprograms"),
            ("/dashboard/", "%2Fdashboard%2F"),
            ("/dashboard", "%2Fdashboard"),
        ] {
            let response = send(&app, fetch(uri, None)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                response.headers()[header::LOCATION],
                format!("/login?from={from}").as_str(),
                "{uri}"
            );
        }

        let cookie = login(&app).await;
        let response = send(&app, fetch("/dashboard/programs", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let outside = send(&app, fetch("/nowhere", None)).await;
        assert_eq!(outside.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn forged_and_revoked_cookies_are_redirected() {
        let app = app().await;
        let forged = send(&app, fetch("/dashboard", Some("auth=authenticated"))).await;
        assert_eq!(forged.status(), StatusCode::SEE_OTHER);

        let cookie = login(&app).await;
        let response = send(&app, json_request("DELETE", "/api/auth", Some(&cookie), json!({}))).await;
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
        let after = send(&app, fetch("/dashboard", Some(&cookie))).await;
        assert_eq!(after.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn program_form_keeps_empty_feature_segments() {
        let app = app().await;
        let cookie = login(&app).await;
        let response = send(
            &app,
            form_request(
                "/dashboard/api/programs/form",
                &cookie,
                "name=Toddler+Explorers&age_range=1-2+years&description=Hands-on&capacity=12\
                 &schedule=Mon-Fri&features=Tummy+time%2C+Sensory+play%2C",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["data"]["record"]["features"],
            json!(["Tummy time", "Sensory play", ""])
        );
        assert_eq!(body["data"]["record"]["tuition"], "$300/week");
        assert_eq!(body["data"]["notice"]["title"], "Program added");
        assert_eq!(body["data"]["collection"].as_array().unwrap().len(), 1);

        let table = body_json(send(&app, fetch("/dashboard/api/programs?search=toddler", Some(&cookie))).await).await;
        assert_eq!(table["data"]["total"], 1);
    }

    #[tokio::test]
    async fn invalid_forms_and_unknown_ids_are_rejected() {
        let app = app().await;
        let cookie = login(&app).await;
        let response = send(
            &app,
            form_request(
                "/dashboard/api/programs/form",
                &cookie,
                "name=Preschool&age_range=3-5&description=Ready&schedule=Mon-Fri&features=Art",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Capacity is required");

        let missing = uuid::Uuid::new_v4();
        let response = send(
            &app,
            json_request(
                "PATCH",
                &format!("/dashboard/api/programs/{missing}"),
                Some(&cookie),
                json!({ "capacity": 3 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["message"],
            "Failed to update program. Please try again."
        );
    }

    #[tokio::test]
    async fn contact_form_lands_in_the_inbox() {
        let app = app().await;
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/contact",
                None,
                json!({
                    "name": "Dana",
                    "email": "dana@example.com",
                    "message": "Do you have openings in September?"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let cookie = login(&app).await;
        let unread = body_json(
            send(&app, fetch("/dashboard/api/messages/inbox?tab=unread&q=openings", Some(&cookie))).await,
        )
        .await;
        assert_eq!(unread["data"]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(unread["data"]["unread"], 1);

        let starred = send(
            &app,
            json_request("POST", &format!("/dashboard/api/messages/{id}/star"), Some(&cookie), json!({})),
        )
        .await;
        assert_eq!(starred.status(), StatusCode::OK);
        let read = send(
            &app,
            json_request("POST", &format!("/dashboard/api/messages/{id}/read"), Some(&cookie), json!({})),
        )
        .await;
        let read = body_json(read).await;
        assert_eq!(read["data"]["record"]["read"], true);
        assert_eq!(read["data"]["record"]["starred"], true);
    }

    #[tokio::test]
    async fn gallery_upload_and_delete_reach_the_image_host() {
        let host = Arc::new(RecordingHost::default());
        let app = app_with(host.clone()).await;
        let cookie = login(&app).await;

        let boundary = "daycare-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nSandbox\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sandbox.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/dashboard/api/gallery/upload")
            .header(header::COOKIE, &cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await["data"]["record"].clone();
        assert_eq!(record["public_id"], "daycare/sandbox");
        assert_eq!(record["url"], "https://cdn.test/daycare/sandbox.png");
        assert_eq!(record["title"], "Sandbox");

        let id = record["id"].as_str().unwrap();
        let response = send(
            &app,
            json_request("DELETE", &format!("/dashboard/api/gallery/{id}"), Some(&cookie), json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*host.deleted.lock().unwrap(), vec!["daycare/sandbox".to_string()]);

        let placeholder = send(
            &app,
            json_request(
                "POST",
                "/dashboard/api/media/delete",
                Some(&cookie),
                json!({ "public_id": "/placeholder.svg?height=300&width=400" }),
            ),
        )
        .await;
        assert_eq!(body_json(placeholder).await["data"]["outcome"], "skipped");
        assert_eq!(host.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uploads_fail_cleanly_without_an_image_host() {
        let app = app().await;
        let cookie = login(&app).await;
        let response = send(
            &app,
            json_request(
                "POST",
                "/dashboard/api/media/upload-data-uri",
                Some(&cookie),
                json!({ "data_uri": "data:image/png;base64,AAAA" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn seeding_feeds_the_public_site() {
        let app = app().await;
        let cookie = login(&app).await;
        let response = send(
            &app,
            json_request("POST", "/dashboard/api/setup/seed", Some(&cookie), json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let site = body_json(send(&app, fetch("/api/public/site", None)).await).await;
        assert_eq!(site["data"]["programs"].as_array().unwrap().len(), 4);

        let status = body_json(send(&app, fetch("/dashboard/api/setup/status", Some(&cookie))).await).await;
        assert_eq!(status["data"]["is_initialized"], true);
        assert!(status["data"]["missing_tables"].as_array().unwrap().is_empty());

        let children = body_json(
            send(&app, fetch("/dashboard/api/families/children", Some(&cookie))).await,
        )
        .await;
        assert_eq!(children["data"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn saved_settings_reach_the_public_site() {
        let app = app().await;
        let site = body_json(send(&app, fetch("/api/public/site", None)).await).await;
        assert_eq!(site["data"]["settings"]["daycare_name"], "Laly's Family Group Daycare");

        let anonymous = send(&app, fetch("/dashboard/api/settings", None)).await;
        assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);

        let cookie = login(&app).await;
        let mut settings = body_json(send(&app, fetch("/dashboard/api/settings", Some(&cookie))).await).await;
        assert_eq!(settings["data"]["notifications"]["email_notifications"], true);

        let mut info = settings["data"]["info"].take();
        info["hours"] = json!("7:00 am - 6:30 pm");
        let response = send(
            &app,
            json_request("PUT", "/dashboard/api/settings", Some(&cookie), json!({ "info": info })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Settings saved");

        let site = body_json(send(&app, fetch("/api/public/site", None)).await).await;
        assert_eq!(site["data"]["settings"]["hours"], "7:00 am - 6:30 pm");
        assert!(site["data"]["settings"].get("email_notifications").is_none());
    }

    #[tokio::test]
    async fn password_change_is_validated_then_applied() {
        let app = app().await;
        let cookie = login(&app).await;
        let change = |current: &str, new: &str, confirm: &str| {
            json_request(
                "POST",
                "/dashboard/api/settings/password",
                Some(&cookie),
                json!({
                    "current_password": current,
                    "new_password": new,
                    "confirm_password": confirm
                }),
            )
        };

        for (request, message) in [
            (change("admin123", "sunshine42", "sunshine24"), "Passwords do not match"),
            (change("admin123", "sun", "sun"), "Password must be at least 8 characters long"),
            (change("admin12", "sunshine42", "sunshine42"), "Current password is incorrect"),
        ] {
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["message"], message);
        }

        let response = send(&app, change("admin123", "sunshine42", "sunshine42")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let old = send(
            &app,
            json_request(
                "POST",
                "/api/auth",
                None,
                json!({ "username": "admin", "password": "admin123" }),
            ),
        )
        .await;
        assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
        let new = send(
            &app,
            json_request(
                "POST",
                "/api/auth",
                None,
                json!({ "username": "admin", "password": "sunshine42" }),
            ),
        )
        .await;
        assert_eq!(new.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn landing_and_login_pages_are_served() {
        let app = app().await;
        for uri in ["/", "/login", "/placeholder.svg"] {
            let response = send(&app, fetch(uri, None)).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
