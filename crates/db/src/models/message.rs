use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::resource::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub read: bool,
    pub starred: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbox tabs. Archived messages only show under `Archived`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageFolder {
    #[default]
    Inbox,
    Starred,
    Unread,
    Archived,
}

impl MessageFolder {
    pub fn contains(self, message: &Message) -> bool {
        match self {
            MessageFolder::Inbox => !message.archived,
            MessageFolder::Starred => message.starred && !message.archived,
            MessageFolder::Unread => !message.read && !message.archived,
            MessageFolder::Archived => message.archived,
        }
    }
}

impl Message {
    /// Case-insensitive match over subject, sender and body.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.subject, &self.sender, &self.body]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }

    pub fn inbox(messages: &[Message], folder: MessageFolder, query: &str) -> Vec<Message> {
        messages
            .iter()
            .filter(|m| folder.contains(m) && m.matches(query))
            .cloned()
            .collect()
    }

    /// Size of the Unread folder; archived threads never count.
    pub fn unread_count(messages: &[Message]) -> usize {
        messages
            .iter()
            .filter(|m| MessageFolder::Unread.contains(m))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMessage {
    pub sender: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateMessage {
    pub sender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub read: Option<bool>,
    pub starred: Option<bool>,
    pub archived: Option<bool>,
}

#[async_trait]
impl Resource for Message {
    const COLLECTION: &'static str = "messages";
    const LABEL: &'static str = "message";

    type Create = CreateMessage;
    type Update = UpdateMessage;

    fn id(&self) -> Uuid {
        self.id
    }

    async fn create(pool: &SqlitePool, data: &CreateMessage, id: Uuid) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages (id, sender, email, phone, subject, body, received_at, read, starred, archived, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, $7, $7)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.sender)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.subject)
        .bind(&data.body)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateMessage) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE messages
               SET sender     = COALESCE($2, sender),
                   email      = COALESCE($3, email),
                   phone      = COALESCE($4, phone),
                   subject    = COALESCE($5, subject),
                   body       = COALESCE($6, body),
                   read       = COALESCE($7, read),
                   starred    = COALESCE($8, starred),
                   archived   = COALESCE($9, archived),
                   updated_at = $10
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.sender)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.subject)
        .bind(&data.body)
        .bind(data.read)
        .bind(data.starred)
        .bind(data.archived)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::DBService;

    fn inquiry(subject: &str) -> CreateMessage {
        CreateMessage {
            sender: "Jennifer Adams".to_string(),
            email: "jennifer@example.com".to_string(),
            phone: None,
            subject: subject.to_string(),
            body: "Is there space in the toddler room?".to_string(),
        }
    }

    #[tokio::test]
    async fn new_messages_are_unread_and_unflagged() {
        let db = DBService::new_in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let message = Message::create(&db.pool, &inquiry("Enrollment"), id).await.unwrap();
        assert!(!message.read);
        assert!(!message.starred);
        assert!(!message.archived);
        assert_eq!(message.received_at, message.created_at);
    }

    #[tokio::test]
    async fn folders_partition_by_flags() {
        let db = DBService::new_in_memory().await.unwrap();
        let starred = Uuid::new_v4();
        let archived = Uuid::new_v4();
        Message::create(&db.pool, &inquiry("Tour request"), starred).await.unwrap();
        Message::create(&db.pool, &inquiry("Old thread"), archived).await.unwrap();
        Message::update(
            &db.pool,
            starred,
            &UpdateMessage {
                starred: Some(true),
                read: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        Message::update(
            &db.pool,
            archived,
            &UpdateMessage {
                archived: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let all = Message::find_all(&db.pool).await.unwrap();
        let ids = |folder| {
            Message::inbox(&all, folder, "")
                .into_iter()
                .map(|m| m.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(MessageFolder::Inbox), vec![starred]);
        assert_eq!(ids(MessageFolder::Starred), vec![starred]);
        assert!(ids(MessageFolder::Unread).is_empty());
        assert_eq!(ids(MessageFolder::Archived), vec![archived]);
        assert_eq!(Message::unread_count(&all), 0);

        let fresh = Uuid::new_v4();
        Message::create(&db.pool, &inquiry("Enrollment question"), fresh).await.unwrap();
        let all = Message::find_all(&db.pool).await.unwrap();
        assert_eq!(Message::unread_count(&all), 1);
        assert_eq!(Message::inbox(&all, MessageFolder::Unread, "").len(), 1);
    }

    #[test]
    fn folder_names_parse_lowercase() {
        assert_eq!(MessageFolder::from_str("unread").unwrap(), MessageFolder::Unread);
        assert_eq!(MessageFolder::Archived.to_string(), "archived");
        assert!(MessageFolder::from_str("spam").is_err());
    }
}
