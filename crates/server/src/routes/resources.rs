//! Routes shared by every dashboard collection.
//!
//! Each collection gets the same table, typed JSON and dialog-form endpoints,
//! plus whatever collection-specific routes are merged in by the caller.

use std::collections::HashMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use deployment::Deployment;
use serde::Serialize;
use services::services::{
    crud::CrudOutcome,
    form::FormSchema,
    record_store::{RecordStore, RecordStoreError},
    resource_forms::DashboardResource,
    table::{TableQuery, TableView},
};
use tracing::warn;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// Dialog description: the fields to render and their initial values.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub schema: FormSchema,
    pub values: HashMap<String, String>,
}

type OutcomeResponse<R> = Result<ResponseJson<ApiResponse<CrudOutcome<R>>>, ApiError>;

/// Snapshot copy first, then the store.
pub(crate) async fn find<R: DashboardResource>(
    deployment: &DeploymentImpl,
    id: Uuid,
) -> Result<R, ApiError> {
    let snapshot = deployment.data_provider().snapshot().await;
    if let Some(record) = snapshot.collection::<R>().iter().find(|r| r.id() == id) {
        return Ok(record.clone());
    }
    deployment
        .data_provider()
        .store()
        .get::<R>(id)
        .await?
        .ok_or_else(|| {
            RecordStoreError::NotFound {
                collection: R::COLLECTION,
                id,
            }
            .into()
        })
}

fn respond<R>(outcome: CrudOutcome<R>) -> ResponseJson<ApiResponse<CrudOutcome<R>>> {
    let title = outcome.notice.title.clone();
    ResponseJson(ApiResponse::success_with_message(outcome, title))
}

/// One page of the collection table.
pub async fn list<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<TableQuery>,
) -> ResponseJson<ApiResponse<TableView<R>>> {
    let snapshot = deployment.data_provider().snapshot().await;
    let view = query.apply(snapshot.collection::<R>(), R::SEARCH_FIELD);
    ResponseJson(ApiResponse::success(view))
}

/// Create a record from typed JSON.
pub async fn create<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<R::Create>,
) -> OutcomeResponse<R> {
    let outcome = deployment.controller::<R>().create(payload).await?;
    Ok(respond(outcome))
}

/// Empty dialog with field defaults.
pub async fn new_form<R: DashboardResource>() -> ResponseJson<ApiResponse<FormView>> {
    let schema = R::schema();
    let values = schema
        .fields
        .iter()
        .filter_map(|f| f.default.clone().map(|d| (f.name.to_string(), d)))
        .collect();
    ResponseJson(ApiResponse::success(FormView { schema, values }))
}

/// Create a record from submitted dialog fields.
pub async fn create_from_form<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Form(raw): Form<HashMap<String, String>>,
) -> OutcomeResponse<R> {
    let outcome = deployment.controller::<R>().create_from_form(&raw).await?;
    Ok(respond(outcome))
}

/// Fetch one record.
pub async fn get_record<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<R>>, ApiError> {
    let record = find::<R>(&deployment, id).await?;
    Ok(ResponseJson(ApiResponse::success(record)))
}

/// Apply a typed JSON patch.
pub async fn update<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<R::Update>,
) -> OutcomeResponse<R> {
    let outcome = deployment.controller::<R>().update(id, payload).await?;
    Ok(respond(outcome))
}

/// Removes the record, then its hosted image if it has one. Image host
/// failures are logged only; the record is already gone.
pub async fn delete<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> OutcomeResponse<R> {
    let existing = find::<R>(&deployment, id).await.ok();
    let outcome = deployment.controller::<R>().delete(id).await?;

    if let Some(public_id) = existing.as_ref().and_then(|r| r.remote_asset()) {
        if let Err(e) = deployment.media().delete(public_id).await {
            warn!(
                collection = R::COLLECTION,
                %id,
                public_id,
                error = %e,
                "Record deleted but its hosted image was not"
            );
        }
    }
    Ok(respond(outcome))
}

/// Dialog prefilled from an existing record.
pub async fn edit_form<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FormView>>, ApiError> {
    let record = find::<R>(&deployment, id).await?;
    Ok(ResponseJson(ApiResponse::success(FormView {
        schema: R::schema(),
        values: R::form_defaults(&record),
    })))
}

/// Update a record from submitted dialog fields.
pub async fn update_from_form<R: DashboardResource>(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    Form(raw): Form<HashMap<String, String>>,
) -> OutcomeResponse<R> {
    let outcome = deployment
        .controller::<R>()
        .update_from_form(id, &raw)
        .await?;
    Ok(respond(outcome))
}

/// Mount the shared routes and `extra` under `/{collection}`.
pub fn router<R: DashboardResource>(extra: Router<DeploymentImpl>) -> Router<DeploymentImpl> {
    let routes = Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/form", get(new_form::<R>).post(create_from_form::<R>))
        .route(
            "/{id}",
            get(get_record::<R>).patch(update::<R>).delete(delete::<R>),
        )
        .route(
            "/{id}/form",
            get(edit_form::<R>).post(update_from_form::<R>),
        )
        .merge(extra);
    Router::new().nest(&format!("/{}", R::COLLECTION), routes)
}
