use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    auth::{AuthService, SentinelAuth, SessionStoreAuth},
    config::{AuthMode, Config},
    data_provider::DataProvider,
    media::{CloudinaryHost, ImageHost, UnconfiguredHost},
};
use tracing::{info, warn};

/// Single-process deployment: SQLite on disk, Cloudinary for images, in-memory sessions.
#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    auth: Arc<dyn AuthService>,
    media: Arc<dyn ImageHost>,
    data_provider: Arc<DataProvider<DBService>>,
}

impl LocalDeployment {
    pub async fn with_config(config: Config) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        let media: Arc<dyn ImageHost> = match &config.cloudinary {
            Some(cloudinary) => Arc::new(CloudinaryHost::new(cloudinary)?),
            None => Arc::new(UnconfiguredHost),
        };
        let deployment = Self::from_parts(config, db, media);
        let admin = &deployment.config.admin.username;
        if deployment
            .settings()
            .restore_password(deployment.auth.as_ref(), admin)
            .await?
        {
            info!(username = %admin, "Using the admin password changed from the dashboard");
        }

        if deployment.config.seed_on_start {
            let report = deployment.seed().await?;
            info!(inserted = report.total_inserted(), "Seeded on start");
        } else if let Err(e) = deployment.data_provider.refresh().await {
            warn!(error = %e, "Initial snapshot load failed");
        }
        Ok(deployment)
    }

    /// Assemble from ready-made parts; the snapshot starts empty.
    pub fn from_parts(config: Config, db: DBService, media: Arc<dyn ImageHost>) -> Self {
        let auth: Arc<dyn AuthService> = match config.auth_mode {
            AuthMode::Session => Arc::new(SessionStoreAuth::new(&config.admin)),
            AuthMode::Sentinel => Arc::new(SentinelAuth::new(&config.admin)),
        };
        info!(auth_mode = %config.auth_mode, environment = %config.environment, "Deployment ready");
        let data_provider = Arc::new(DataProvider::new(Arc::new(db.clone())));
        Self {
            config: Arc::new(config),
            db,
            auth,
            media,
            data_provider,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    type Store = DBService;

    async fn new() -> Result<Self, DeploymentError> {
        Self::with_config(Config::from_env()?).await
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn auth(&self) -> &Arc<dyn AuthService> {
        &self.auth
    }

    fn media(&self) -> &Arc<dyn ImageHost> {
        &self.media
    }

    fn data_provider(&self) -> &Arc<DataProvider<DBService>> {
        &self.data_provider
    }
}
