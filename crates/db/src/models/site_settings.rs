use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// What the public site shows about the daycare itself.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct SiteInfo {
    pub daycare_name: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub hours: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            daycare_name: "Laly's Family Group Daycare".to_string(),
            description: "A safe and fun place for your child's development".to_string(),
            email: "info@lalysdaycare.com".to_string(),
            phone: "(123) 456-7890".to_string(),
            address: "Bronx, New York".to_string(),
            hours: "7:30 am - 6:00 pm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize, TS, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub marketing_emails: bool,
    pub new_enrollment_alerts: bool,
    pub payment_reminders: bool,
    pub event_reminders: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            marketing_emails: false,
            new_enrollment_alerts: true,
            payment_reminders: true,
            event_reminders: true,
        }
    }
}

#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct SiteSettings {
    #[sqlx(flatten)]
    pub info: SiteInfo,
    #[sqlx(flatten)]
    pub notifications: NotificationPreferences,
    /// `None` until the operator first saves.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Each section is replaced whole, the way the settings tabs submit them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateSiteSettings {
    pub info: Option<SiteInfo>,
    pub notifications: Option<NotificationPreferences>,
}

impl SiteSettings {
    /// The stored row, or the defaults when nothing was saved yet.
    pub async fn load(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let stored = sqlx::query_as::<_, SiteSettings>("SELECT * FROM site_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?;
        Ok(stored.unwrap_or_default())
    }

    pub fn apply(mut self, patch: UpdateSiteSettings) -> Self {
        if let Some(info) = patch.info {
            self.info = info;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        self
    }

    pub async fn save(&self, pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let info = &self.info;
        let prefs = &self.notifications;
        sqlx::query_as::<_, SiteSettings>(
            r#"INSERT INTO site_settings (id, daycare_name, description, email, phone, address, hours,
                   email_notifications, sms_notifications, marketing_emails, new_enrollment_alerts,
                   payment_reminders, event_reminders, updated_at)
               VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
               ON CONFLICT(id) DO UPDATE SET
                   daycare_name          = excluded.daycare_name,
                   description           = excluded.description,
                   email                 = excluded.email,
                   phone                 = excluded.phone,
                   address               = excluded.address,
                   hours                 = excluded.hours,
                   email_notifications   = excluded.email_notifications,
                   sms_notifications     = excluded.sms_notifications,
                   marketing_emails      = excluded.marketing_emails,
                   new_enrollment_alerts = excluded.new_enrollment_alerts,
                   payment_reminders     = excluded.payment_reminders,
                   event_reminders       = excluded.event_reminders,
                   updated_at            = excluded.updated_at
               RETURNING *"#,
        )
        .bind(&info.daycare_name)
        .bind(&info.description)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(&info.address)
        .bind(&info.hours)
        .bind(prefs.email_notifications)
        .bind(prefs.sms_notifications)
        .bind(prefs.marketing_emails)
        .bind(prefs.new_enrollment_alerts)
        .bind(prefs.payment_reminders)
        .bind(prefs.event_reminders)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}

/// A changed admin password. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct AdminCredential {
    pub username: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

impl AdminCredential {
    pub async fn find(pool: &SqlitePool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AdminCredential>("SELECT * FROM admin_credentials WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn save(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AdminCredential>(
            r#"INSERT INTO admin_credentials (username, password_hash, updated_at)
               VALUES ($1, $2, $3)
               ON CONFLICT(username) DO UPDATE SET
                   password_hash = excluded.password_hash,
                   updated_at    = excluded.updated_at
               RETURNING *"#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}
