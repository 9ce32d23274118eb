use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use services::services::{
    auth::AuthService,
    config::{Config, ConfigError},
    contact::ContactService,
    crud::ResourceController,
    data_provider::DataProvider,
    database_validator::DatabaseValidator,
    media::{ImageHost, MediaError},
    record_store::{RecordStore, RecordStoreError},
    resource_forms::DashboardResource,
    seed::{SeedReport, seed_sample_data},
    settings::{SettingsError, SettingsService},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Everything a request handler may reach for.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    type Store: RecordStore;

    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn auth(&self) -> &Arc<dyn AuthService>;

    fn media(&self) -> &Arc<dyn ImageHost>;

    fn data_provider(&self) -> &Arc<DataProvider<Self::Store>>;

    fn controller<R: DashboardResource>(&self) -> ResourceController<R, Self::Store> {
        ResourceController::new(self.data_provider().clone())
    }

    fn contact(&self) -> ContactService<Self::Store> {
        ContactService::new(self.data_provider().clone())
    }

    fn settings(&self) -> SettingsService {
        SettingsService::new(self.db().pool.clone())
    }

    fn database_validator(&self) -> DatabaseValidator {
        DatabaseValidator::new(self.db().pool.clone())
    }

    /// Fill empty collections with sample content, then refresh the snapshot.
    async fn seed(&self) -> Result<SeedReport, DeploymentError> {
        let report = seed_sample_data(self.data_provider().store().as_ref()).await?;
        if let Err(e) = self.data_provider().refresh().await {
            tracing::warn!(error = %e, "Seeded but snapshot refresh failed");
        }
        Ok(report)
    }

    fn shutdown(&self) {
        info!("Deployment shutting down");
        self.data_provider().shutdown();
    }
}
