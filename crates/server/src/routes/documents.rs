use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::document::{ALL_CATEGORIES, Document};
use deployment::Deployment;
use serde::Deserialize;
use utils::response::ApiResponse;

use super::resources;
use crate::DeploymentImpl;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LibraryQuery {
    pub category: Option<String>,
}

/// Documents filtered by category and search text.
pub async fn library(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<LibraryQuery>,
) -> ResponseJson<ApiResponse<Vec<Document>>> {
    let snapshot = deployment.data_provider().snapshot().await;
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(ALL_CATEGORIES);
    ResponseJson(ApiResponse::success(Document::in_category(
        &snapshot.documents,
        category,
    )))
}

pub fn router() -> Router<DeploymentImpl> {
    resources::router::<Document>(Router::new().route("/library", get(library)))
}
