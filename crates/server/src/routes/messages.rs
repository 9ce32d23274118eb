use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::message::{Message, MessageFolder, UpdateMessage};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::crud::CrudOutcome;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::resources;
use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InboxQuery {
    pub tab: MessageFolder,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct InboxView {
    pub folder: MessageFolder,
    pub messages: Vec<Message>,
    /// Unread across every folder, for the inbox badge.
    pub unread: usize,
}

/// One inbox tab, filtered by the search text.
pub async fn inbox(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<InboxQuery>,
) -> ResponseJson<ApiResponse<InboxView>> {
    let snapshot = deployment.data_provider().snapshot().await;
    let messages = Message::inbox(
        &snapshot.messages,
        query.tab,
        query.q.as_deref().unwrap_or_default(),
    );
    ResponseJson(ApiResponse::success(InboxView {
        folder: query.tab,
        messages,
        unread: Message::unread_count(&snapshot.messages),
    }))
}

/// Mark a message as read.
pub async fn mark_read(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CrudOutcome<Message>>>, ApiError> {
    let patch = UpdateMessage {
        read: Some(true),
        ..Default::default()
    };
    let outcome = deployment.controller::<Message>().update(id, patch).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

/// Flip the starred flag on a message.
pub async fn toggle_star(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CrudOutcome<Message>>>, ApiError> {
    let controller = deployment.controller::<Message>();
    let current = controller.current(id).await?;
    let patch = UpdateMessage {
        starred: Some(!current.starred),
        ..Default::default()
    };
    let outcome = controller.update(id, patch).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub fn router() -> Router<DeploymentImpl> {
    resources::router::<Message>(
        Router::new()
            .route("/inbox", get(inbox))
            .route("/{id}/read", post(mark_read))
            .route("/{id}/star", post(toggle_star)),
    )
}
