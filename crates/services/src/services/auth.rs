//! Operator login and session tracking for the dashboard gate.

use std::sync::RwLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::AdminCredentials;

pub const AUTH_COOKIE: &str = "auth";
pub const SENTINEL_TOKEN: &str = "authenticated";

pub fn session_ttl() -> Duration {
    Duration::days(7)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Could not hash password: {0}")]
    Hash(String),
}

/// Hash a plain password with argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against an argon2id hash. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// An authenticated operator, attached to gated requests.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub username: String,
    #[serde(skip)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    fn verify_credentials(&self, username: &str, password: &str) -> bool;

    async fn open_session(&self, username: &str) -> Session;

    async fn validate_session(&self, token: &str) -> Option<Session>;

    async fn close_session(&self, token: &str);

    /// Swap the admin password for a changed one, given as an argon2id hash.
    fn replace_password_hash(&self, hash: String);

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if !self.verify_credentials(username, password) {
            warn!(username, "Rejected dashboard login");
            return Err(AuthError::InvalidCredentials);
        }
        let session = self.open_session(username).await;
        info!(username, "Dashboard login");
        Ok(session)
    }
}

#[derive(Debug)]
enum StoredPassword {
    Configured(SecretString),
    Hashed(String),
}

/// Check against the admin pair: the configured password until it is changed,
/// then the stored hash.
#[derive(Debug)]
struct CredentialCheck {
    username: String,
    password: RwLock<StoredPassword>,
}

impl CredentialCheck {
    fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok: bool = self.username.as_bytes().ct_eq(username.as_bytes()).into();
        let pass_ok = match &*self.password.read().unwrap_or_else(|e| e.into_inner()) {
            StoredPassword::Configured(secret) => secret
                .expose_secret()
                .as_bytes()
                .ct_eq(password.as_bytes())
                .into(),
            StoredPassword::Hashed(hash) => verify_password(password, hash),
        };
        user_ok & pass_ok
    }

    fn replace(&self, hash: String) {
        *self.password.write().unwrap_or_else(|e| e.into_inner()) = StoredPassword::Hashed(hash);
        info!(username = %self.username, "Admin password replaced");
    }
}

impl From<&AdminCredentials> for CredentialCheck {
    fn from(admin: &AdminCredentials) -> Self {
        Self {
            username: admin.username.clone(),
            password: RwLock::new(StoredPassword::Configured(admin.password.clone())),
        }
    }
}

/// Every login hands out the same fixed token and logout revokes nothing.
pub struct SentinelAuth {
    credentials: CredentialCheck,
}

impl SentinelAuth {
    pub fn new(admin: &AdminCredentials) -> Self {
        Self {
            credentials: admin.into(),
        }
    }
}

#[async_trait]
impl AuthService for SentinelAuth {
    fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.credentials.matches(username, password)
    }

    async fn open_session(&self, username: &str) -> Session {
        Session {
            username: username.to_string(),
            token: SENTINEL_TOKEN.to_string(),
            expires_at: Utc::now() + session_ttl(),
        }
    }

    async fn validate_session(&self, token: &str) -> Option<Session> {
        (token == SENTINEL_TOKEN).then(|| Session {
            username: self.credentials.username.clone(),
            token: SENTINEL_TOKEN.to_string(),
            expires_at: Utc::now() + session_ttl(),
        })
    }

    async fn close_session(&self, _token: &str) {}

    fn replace_password_hash(&self, hash: String) {
        self.credentials.replace(hash);
    }
}

/// Random per-login tokens held in memory until logout or expiry.
pub struct SessionStoreAuth {
    credentials: CredentialCheck,
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStoreAuth {
    pub fn new(admin: &AdminCredentials) -> Self {
        Self::with_ttl(admin, session_ttl())
    }

    pub fn with_ttl(admin: &AdminCredentials, ttl: Duration) -> Self {
        Self {
            credentials: admin.into(),
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.sessions.iter().filter(|s| !s.is_expired(now)).count()
    }

    fn new_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[async_trait]
impl AuthService for SessionStoreAuth {
    fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.credentials.matches(username, password)
    }

    async fn open_session(&self, username: &str) -> Session {
        let now = Utc::now();
        self.sessions.retain(|_, session| !session.is_expired(now));
        let session = Session {
            username: username.to_string(),
            token: Self::new_token(),
            expires_at: now + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        debug!(username, "Session opened");
        session
    }

    async fn validate_session(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token).map(|s| s.clone())?;
        if session.is_expired(Utc::now()) {
            self.sessions.remove(token);
            debug!(username = %session.username, "Session expired");
            return None;
        }
        Some(session)
    }

    async fn close_session(&self, token: &str) {
        if let Some((_, session)) = self.sessions.remove(token) {
            debug!(username = %session.username, "Session closed");
        }
    }

    fn replace_password_hash(&self, hash: String) {
        self.credentials.replace(hash);
    }
}
