//! Session gate for the dashboard route tree.
//!
//! Requests under `/dashboard` must carry the `auth` cookie naming a live
//! session. Anything else is sent to `/login` with the original path in
//! `from`. The validated [`Session`] is stored in request extensions.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, Uri, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use deployment::Deployment;
use services::services::auth::{AUTH_COOKIE, Session, session_ttl};
use url::form_urlencoded;

use crate::DeploymentImpl;

/// Value of the `auth` cookie, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{AUTH_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        session_ttl().num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cleared_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{AUTH_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn login_redirect(from: &str) -> Redirect {
    let from: String = form_urlencoded::byte_serialize(from.as_bytes()).collect();
    Redirect::to(&format!("/login?from={from}"))
}

/// `/dashboard` itself and everything below it, matched route or not.
pub fn is_gated(path: &str) -> bool {
    path == "/dashboard" || path.starts_with("/dashboard/")
}

/// The URI as the client sent it, before any nest stripped a prefix.
fn requested_uri(request: &Request) -> &Uri {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri())
}

fn requested_path(request: &Request) -> String {
    let uri = requested_uri(request);
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

pub async fn require_session(
    State(deployment): State<DeploymentImpl>,
    mut request: Request,
    next: Next,
) -> Response {
    if !is_gated(requested_uri(&request).path()) {
        return next.run(request).await;
    }

    let session: Option<Session> = match session_token(request.headers()) {
        Some(token) => deployment.auth().validate_session(&token).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            let from = requested_path(&request);
            tracing::debug!(path = %from, "Unauthenticated dashboard request");
            login_redirect(&from).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn auth_cookie_is_picked_out_of_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth=authenticated; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("authenticated"));

        headers.insert(COOKIE, HeaderValue::from_static("auth="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookie_lasts_a_week_and_is_secure_in_production() {
        let cookie = session_cookie("abc", true);
        assert!(cookie.starts_with("auth=abc; HttpOnly; Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("; Secure"));
        assert!(!session_cookie("abc", false).contains("Secure"));
    }

    #[test]
    fn only_the_dashboard_tree_is_gated() {
        assert!(is_gated("/dashboard"));
        assert!(is_gated("/dashboard/"));
        assert!(is_gated("/dashboard/programs"));
        assert!(!is_gated("/dashboards"));
        assert!(!is_gated("/login"));
        assert!(!is_gated("/api/public/site"));
    }

    #[test]
    fn original_uri_wins_over_the_stripped_one() {
        let mut request = axum::http::Request::builder()
            .uri("/api/programs?page=1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(requested_path(&request), "/api/programs?page=1");
        request.extensions_mut().insert(OriginalUri(
            "/dashboard/api/programs?page=1".parse().unwrap(),
        ));
        assert_eq!(requested_path(&request), "/dashboard/api/programs?page=1");
    }

    #[test]
    fn redirect_keeps_the_requested_path() {
        let response = login_redirect("/dashboard/programs?page=2").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/login?from=%2Fdashboard%2Fprograms%3Fpage%3D2"
        );
    }
}
