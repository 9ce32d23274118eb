use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deployment::DeploymentError;
use services::services::{
    auth::AuthError,
    contact::ContactError,
    crud::{CrudError, CrudFailure},
    data_provider::DataProviderError,
    database_validator::DatabaseValidationError,
    media::MediaError,
    record_store::RecordStoreError,
    settings::SettingsError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Crud(#[from] CrudFailure),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error(transparent)]
    DataProvider(#[from] DataProviderError),
    #[error(transparent)]
    RecordStore(#[from] RecordStoreError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

fn store_status(err: &RecordStoreError) -> StatusCode {
    match err {
        RecordStoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        RecordStoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Crud(failure) => match &failure.cause {
                CrudError::Form(_) => StatusCode::BAD_REQUEST,
                CrudError::Store(e) => store_status(e),
                CrudError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::Hash(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Settings(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Media(e) => match e {
                MediaError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                MediaError::InvalidDataUri => StatusCode::BAD_REQUEST,
                MediaError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                MediaError::Transport(_) | MediaError::Http { .. } | MediaError::Serde(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Contact(ContactError::MissingField(_)) => StatusCode::BAD_REQUEST,
            ApiError::Contact(ContactError::Store(e)) => store_status(e),
            ApiError::RecordStore(e) => store_status(e),
            ApiError::Multipart(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DataProvider(_)
            | ApiError::DatabaseValidation(_)
            | ApiError::Deployment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        let message = match &self {
            // Store and provider internals stay in the log.
            ApiError::RecordStore(RecordStoreError::Database(_))
            | ApiError::Contact(ContactError::Store(RecordStoreError::Database(_)))
            | ApiError::Auth(AuthError::Hash(_))
            | ApiError::Settings(SettingsError::Auth(_) | SettingsError::Database(_))
            | ApiError::DataProvider(_)
            | ApiError::DatabaseValidation(_)
            | ApiError::Deployment(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}
