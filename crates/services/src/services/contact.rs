//! Public contact form intake. Submissions land in the dashboard inbox.

use std::sync::Arc;

use db::models::message::{CreateMessage, Message};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

use super::{
    data_provider::DataProvider,
    record_store::{RecordStore, RecordStoreError},
};

pub const CONTACT_SUBJECT: &str = "Website inquiry";

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct ContactRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    fn into_message(self) -> Result<CreateMessage, ContactError> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("message", &self.message)] {
            if value.trim().is_empty() {
                return Err(ContactError::MissingField(field));
            }
        }
        Ok(CreateMessage {
            sender: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            subject: CONTACT_SUBJECT.to_string(),
            body: self.message,
        })
    }
}

pub struct ContactService<S> {
    provider: Arc<DataProvider<S>>,
}

impl<S: RecordStore> ContactService<S> {
    pub fn new(provider: Arc<DataProvider<S>>) -> Self {
        Self { provider }
    }

    /// Store the inquiry as an unread message and refresh the snapshot.
    pub async fn submit(&self, request: ContactRequest) -> Result<Message, ContactError> {
        let data = request.into_message()?;
        let message: Message = self.provider.store().create(data).await?;
        info!(message_id = %message.id, "Contact form received");
        if let Err(e) = self.provider.refresh().await {
            warn!(error = %e, "Contact stored but snapshot refresh failed");
        }
        Ok(message)
    }
}
