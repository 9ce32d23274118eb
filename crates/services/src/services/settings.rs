//! Dashboard settings: site details, notification preferences and the admin
//! password.
//!
//! Site details are one persisted row served to the public site. A password
//! change is stored as an argon2id hash and takes over from the configured
//! password, both in the running auth service and on later starts.

use db::models::site_settings::{AdminCredential, SiteInfo, SiteSettings, UpdateSiteSettings};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::auth::{AuthError, AuthService, hash_password};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl SettingsError {
    /// Whether the operator can fix this by correcting the submitted form.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, SettingsError::Auth(_) | SettingsError::Database(_))
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Confirmation must match before length is looked at.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.new_password != self.confirm_password {
            return Err(SettingsError::PasswordMismatch);
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SettingsError::PasswordTooShort);
        }
        Ok(())
    }
}

fn validate_info(info: &SiteInfo) -> Result<(), SettingsError> {
    if info.daycare_name.trim().is_empty() {
        return Err(SettingsError::MissingField("Daycare name"));
    }
    let email = info.email.trim();
    if email.is_empty() {
        return Err(SettingsError::MissingField("Email"));
    }
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(SettingsError::InvalidEmail),
    }
}

pub struct SettingsService {
    pool: SqlitePool,
}

impl SettingsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> Result<SiteSettings, SettingsError> {
        Ok(SiteSettings::load(&self.pool).await?)
    }

    pub async fn update(&self, patch: UpdateSiteSettings) -> Result<SiteSettings, SettingsError> {
        if let Some(info) = &patch.info {
            validate_info(info)?;
        }
        let saved = self.load().await?.apply(patch).save(&self.pool).await?;
        info!(daycare = %saved.info.daycare_name, "Site settings saved");
        Ok(saved)
    }

    pub async fn change_password(
        &self,
        auth: &dyn AuthService,
        username: &str,
        change: &PasswordChange,
    ) -> Result<(), SettingsError> {
        change.validate()?;
        if !auth.verify_credentials(username, &change.current_password) {
            return Err(SettingsError::WrongPassword);
        }
        let hash = hash_password(&change.new_password)?;
        AdminCredential::save(&self.pool, username, &hash).await?;
        auth.replace_password_hash(hash);
        info!(username, "Admin password changed");
        Ok(())
    }

    /// Hand a previously changed password to a freshly built auth service.
    /// Returns whether one was stored.
    pub async fn restore_password(
        &self,
        auth: &dyn AuthService,
        username: &str,
    ) -> Result<bool, SettingsError> {
        match AdminCredential::find(&self.pool, username).await? {
            Some(stored) => {
                auth.replace_password_hash(stored.password_hash);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
