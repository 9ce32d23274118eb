//! Runtime configuration read from the process environment.

use std::{env, fmt::Display, str::FromStr};

use secrecy::SecretString;
use strum_macros::{Display as StrumDisplay, EnumString};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_CLOUDINARY_DELIVERY_BASE: &str = "https://res.cloudinary.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthMode {
    /// Random tokens kept in a server-side session store.
    #[default]
    Session,
    /// Fixed `auth=authenticated` cookie.
    Sentinel,
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub api_base: String,
    pub delivery_base: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub environment: Environment,
    pub auth_mode: AuthMode,
    pub admin: AdminCredentials,
    /// `None` when no cloud name/key/secret are configured; uploads then fail.
    pub cloudinary: Option<CloudinaryConfig>,
    pub seed_on_start: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let admin = match (var("DAYCARE_ADMIN_USERNAME"), var("DAYCARE_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => AdminCredentials {
                username,
                password: SecretString::from(password),
            },
            _ => {
                warn!(
                    "DAYCARE_ADMIN_USERNAME/DAYCARE_ADMIN_PASSWORD not set, falling back to the default admin login"
                );
                AdminCredentials {
                    username: DEFAULT_ADMIN_USERNAME.to_string(),
                    password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
                }
            }
        };

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret: SecretString::from(api_secret),
                api_base: var("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
                delivery_base: DEFAULT_CLOUDINARY_DELIVERY_BASE.to_string(),
            }),
            _ => {
                warn!("Cloudinary credentials not set, image uploads are disabled");
                None
            }
        };

        Ok(Self {
            host: var("DAYCARE_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("DAYCARE_PORT", var("DAYCARE_PORT"), 3000)?,
            database_url: var("DATABASE_URL").unwrap_or_else(|| {
                info!("DATABASE_URL not set, using sqlite://daycare.db");
                "sqlite://daycare.db".to_string()
            }),
            environment: parse_or("DAYCARE_ENV", var("DAYCARE_ENV"), Environment::default())?,
            auth_mode: parse_or("DAYCARE_AUTH_MODE", var("DAYCARE_AUTH_MODE"), AuthMode::default())?,
            admin,
            cloudinary,
            seed_on_start: parse_or("DAYCARE_SEED_ON_START", var("DAYCARE_SEED_ON_START"), false)?,
        })
    }

    /// Cookies carry `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: format!("{value:?}: {e}"),
        }),
    }
}
