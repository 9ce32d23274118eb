//! Write path shared by every dashboard collection, and the page reducer
//! driving the list/dialog cycle on top of it.

use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    data_provider::{DataProvider, DataProviderError},
    form::FormError,
    record_store::{RecordStore, RecordStoreError},
    resource_forms::DashboardResource,
    table::{TableQuery, TableView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CrudAction {
    Add,
    Update,
    Delete,
}

impl CrudAction {
    fn past_tense(self) -> &'static str {
        match self {
            CrudAction::Add => "added",
            CrudAction::Update => "updated",
            CrudAction::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(label: &str, action: CrudAction) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: format!("{} {}", capitalize(label), action.past_tense()),
            description: format!("The {label} has been {} successfully", action.past_tense()),
        }
    }

    pub fn failure(label: &str, action: CrudAction) -> Self {
        Self::error(format!("Failed to {action} {label}. Please try again."))
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum CrudError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    #[error(transparent)]
    Provider(#[from] DataProviderError),
}

/// A failed action together with the notice the operator sees.
#[derive(Debug, Error)]
#[error("{}", .notice.description)]
pub struct CrudFailure {
    pub action: CrudAction,
    pub notice: Notice,
    #[source]
    pub cause: CrudError,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrudOutcome<R> {
    /// The stored record for add/update; `None` after a delete.
    pub record: Option<R>,
    /// The collection as of the post-write refresh.
    pub collection: Vec<R>,
    pub notice: Notice,
}

/// Calls the record store, then refreshes the data provider before reporting
/// success.
pub struct ResourceController<R, S> {
    provider: Arc<DataProvider<S>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S> Clone for ResourceController<R, S> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R, S> ResourceController<R, S>
where
    R: DashboardResource,
    S: RecordStore,
{
    pub fn new(provider: Arc<DataProvider<S>>) -> Self {
        Self {
            provider,
            _resource: PhantomData,
        }
    }

    pub async fn create_from_form(
        &self,
        raw: &HashMap<String, String>,
    ) -> Result<CrudOutcome<R>, CrudFailure> {
        let data = R::schema()
            .collect(raw)
            .and_then(|values| R::create_from_form(&values))
            .map_err(|e| self.invalid(CrudAction::Add, e))?;
        self.create(data).await
    }

    pub async fn create(&self, data: R::Create) -> Result<CrudOutcome<R>, CrudFailure> {
        let record = self
            .provider
            .store()
            .create::<R>(data)
            .await
            .map_err(|e| self.failed(CrudAction::Add, e.into()))?;
        info!(collection = R::COLLECTION, id = %record.id(), "Record added");
        Ok(self.finish(CrudAction::Add, Some(record)).await)
    }

    /// Apply the edit dialog to the record as last seen in the snapshot.
    pub async fn update_from_form(
        &self,
        id: Uuid,
        raw: &HashMap<String, String>,
    ) -> Result<CrudOutcome<R>, CrudFailure> {
        let current = self.current(id).await?;
        let data = R::schema()
            .collect(raw)
            .and_then(|values| R::update_from_form(&current, &values))
            .map_err(|e| self.invalid(CrudAction::Update, e))?;
        self.update(id, data).await
    }

    pub async fn update(&self, id: Uuid, data: R::Update) -> Result<CrudOutcome<R>, CrudFailure> {
        self.provider
            .store()
            .update::<R>(id, data)
            .await
            .map_err(|e| self.failed(CrudAction::Update, e.into()))?;
        info!(collection = R::COLLECTION, id = %id, "Record updated");
        let outcome = self.finish(CrudAction::Update, None).await;
        let record = outcome.collection.iter().find(|r| r.id() == id).cloned();
        Ok(CrudOutcome { record, ..outcome })
    }

    pub async fn delete(&self, id: Uuid) -> Result<CrudOutcome<R>, CrudFailure> {
        self.provider
            .store()
            .delete::<R>(id)
            .await
            .map_err(|e| self.failed(CrudAction::Delete, e.into()))?;
        info!(collection = R::COLLECTION, id = %id, "Record deleted");
        Ok(self.finish(CrudAction::Delete, None).await)
    }

    /// Record as held in the current snapshot, falling back to the store.
    pub async fn current(&self, id: Uuid) -> Result<R, CrudFailure> {
        let snapshot = self.provider.snapshot().await;
        if let Some(record) = snapshot.collection::<R>().iter().find(|r| r.id() == id) {
            return Ok(record.clone());
        }
        match self.provider.store().get::<R>(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(self.failed(
                CrudAction::Update,
                RecordStoreError::NotFound {
                    collection: R::COLLECTION,
                    id,
                }
                .into(),
            )),
            Err(e) => Err(self.failed(CrudAction::Update, e.into())),
        }
    }

    async fn finish(&self, action: CrudAction, record: Option<R>) -> CrudOutcome<R> {
        let snapshot = match self.provider.refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    collection = R::COLLECTION,
                    error = %e,
                    "Write succeeded but refresh failed, serving the previous snapshot"
                );
                self.provider.snapshot().await
            }
        };
        CrudOutcome {
            record,
            collection: snapshot.collection::<R>().to_vec(),
            notice: Notice::success(R::LABEL, action),
        }
    }

    fn failed(&self, action: CrudAction, cause: CrudError) -> CrudFailure {
        CrudFailure {
            action,
            notice: Notice::failure(R::LABEL, action),
            cause,
        }
    }

    /// Validation failures name the offending field instead of the generic text.
    fn invalid(&self, action: CrudAction, error: FormError) -> CrudFailure {
        CrudFailure {
            action,
            notice: Notice::error(error.to_string()),
            cause: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "mode", content = "id", rename_all = "lowercase")]
pub enum DialogMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct Dialog {
    pub mode: DialogMode,
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "state", content = "dialog", rename_all = "lowercase")]
pub enum PageState {
    Loading,
    Ready,
    Submitting(Dialog),
}

#[derive(Debug, Clone)]
pub enum Intent {
    Load,
    Search(String),
    GoToPage(usize),
    OpenCreate,
    OpenEdit(Uuid),
    Submit(HashMap<String, String>),
    CloseDialog,
    Delete(Uuid),
}

/// One dashboard page: the list, the table query and the dialog.
pub struct ResourcePage<R, S> {
    controller: ResourceController<R, S>,
    state: PageState,
    records: Vec<R>,
    query: TableQuery,
    notices: Vec<Notice>,
}

impl<R, S> ResourcePage<R, S>
where
    R: DashboardResource,
    S: RecordStore,
{
    pub fn new(controller: ResourceController<R, S>) -> Self {
        Self {
            controller,
            state: PageState::Loading,
            records: Vec::new(),
            query: TableQuery::default(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn view(&self) -> TableView<R> {
        self.query.apply(&self.records, R::SEARCH_FIELD)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn dispatch(&mut self, intent: Intent) -> &PageState {
        match intent {
            Intent::Load => self.load().await,
            _ if self.state == PageState::Loading => {}
            Intent::Search(search) => {
                self.query.search = Some(search).filter(|s| !s.trim().is_empty());
                self.query.page = 0;
            }
            Intent::GoToPage(page) => {
                let last = self.view().page_count.saturating_sub(1);
                self.query.page = page.min(last);
            }
            Intent::OpenCreate => {
                let values = R::schema()
                    .fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.default.clone().unwrap_or_default()))
                    .collect();
                self.state = PageState::Submitting(Dialog {
                    mode: DialogMode::Create,
                    values,
                });
            }
            Intent::OpenEdit(id) => match self.records.iter().find(|r| r.id() == id) {
                Some(record) => {
                    self.state = PageState::Submitting(Dialog {
                        mode: DialogMode::Edit(id),
                        values: R::form_defaults(record),
                    });
                }
                None => self
                    .notices
                    .push(Notice::error(format!("That {} no longer exists", R::LABEL))),
            },
            Intent::Submit(raw) => self.submit(raw).await,
            Intent::CloseDialog => self.state = PageState::Ready,
            Intent::Delete(id) => match self.controller.delete(id).await {
                Ok(outcome) => {
                    self.records = outcome.collection;
                    self.notices.push(outcome.notice);
                }
                Err(failure) => self.notices.push(failure.notice),
            },
        }
        &self.state
    }

    async fn load(&mut self) {
        self.state = PageState::Loading;
        match self.controller.provider.refresh().await {
            Ok(snapshot) => self.records = snapshot.collection::<R>().to_vec(),
            Err(e) => {
                warn!(collection = R::COLLECTION, error = %e, "Page load failed");
                self.records = self
                    .controller
                    .provider
                    .snapshot()
                    .await
                    .collection::<R>()
                    .to_vec();
                self.notices
                    .push(Notice::error(format!("Failed to load {}", R::COLLECTION)));
            }
        }
        self.state = PageState::Ready;
    }

    async fn submit(&mut self, raw: HashMap<String, String>) {
        let PageState::Submitting(dialog) = &self.state else {
            return;
        };
        let result = match dialog.mode {
            DialogMode::Create => self.controller.create_from_form(&raw).await,
            DialogMode::Edit(id) => self.controller.update_from_form(id, &raw).await,
        };
        match result {
            Ok(outcome) => {
                self.records = outcome.collection;
                self.notices.push(outcome.notice);
                self.state = PageState::Ready;
            }
            Err(failure) => {
                self.notices.push(failure.notice);
                if let PageState::Submitting(dialog) = &mut self.state {
                    dialog.values = raw;
                }
            }
        }
    }
}
