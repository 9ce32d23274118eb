//! Process-wide cache of every collection, refreshed after each write.
//!
//! A refresh loads all collections concurrently and publishes a new
//! [`Snapshot`] only when every load succeeded. Refreshes are numbered; a
//! refresh that finishes after a newer one has already completed, whether that
//! one published or failed, is dropped, and nothing is published once [`DataProvider::shutdown`] has been called.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use db::models::{
    Resource,
    activity::Activity,
    document::Document,
    family::Family,
    gallery_image::GalleryImage,
    menu_item::MenuItem,
    message::Message,
    program::Program,
    staff_member::StaffMember,
    transportation_route::TransportationRoute,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use ts_rs::TS;

use super::record_store::RecordStore;

#[derive(Debug, Clone, Error)]
pub enum DataProviderError {
    #[error("failed to load {collection}: {message}")]
    Fetch {
        collection: &'static str,
        message: String,
    },
    #[error("data provider is shut down")]
    ShutDown,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct Snapshot {
    pub activities: Vec<Activity>,
    pub programs: Vec<Program>,
    pub staff: Vec<StaffMember>,
    pub families: Vec<Family>,
    pub menu: Vec<MenuItem>,
    pub documents: Vec<Document>,
    pub messages: Vec<Message>,
    pub transportation: Vec<TransportationRoute>,
    pub gallery: Vec<GalleryImage>,
}

/// Dashboard landing counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct Overview {
    pub activities: usize,
    pub programs: usize,
    pub staff: usize,
    pub families: usize,
    pub enrolled_children: usize,
    pub menu_days: usize,
    pub documents: usize,
    pub messages: usize,
    pub unread_messages: usize,
    pub routes: usize,
    pub gallery_images: usize,
    pub program_capacity: i64,
}

impl Snapshot {
    pub fn overview(&self) -> Overview {
        Overview {
            activities: self.activities.len(),
            programs: self.programs.len(),
            staff: self.staff.len(),
            families: self.families.len(),
            enrolled_children: self.families.iter().map(|f| f.children.len()).sum(),
            menu_days: self.menu.len(),
            documents: self.documents.len(),
            messages: self.messages.len(),
            unread_messages: Message::unread_count(&self.messages),
            routes: self.transportation.len(),
            gallery_images: self.gallery.len(),
            program_capacity: self.programs.iter().map(|p| i64::from(p.capacity)).sum(),
        }
    }

    pub fn collection<R: SnapshotCollection>(&self) -> &[R] {
        R::slice(self)
    }
}

/// Resources that have a slot in the [`Snapshot`].
pub trait SnapshotCollection: Resource {
    fn slice(snapshot: &Snapshot) -> &[Self];
}

macro_rules! snapshot_collection {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl SnapshotCollection for $ty {
                fn slice(snapshot: &Snapshot) -> &[Self] {
                    &snapshot.$field
                }
            }
        )*
    };
}

snapshot_collection! {
    Activity => activities,
    Program => programs,
    StaffMember => staff,
    Family => families,
    MenuItem => menu,
    Document => documents,
    Message => messages,
    TransportationRoute => transportation,
    GalleryImage => gallery,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderState {
    pub snapshot: Arc<Snapshot>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Number of the refresh that produced `snapshot`; 0 before the first one.
    pub generation: u64,
}

#[derive(Default)]
struct Inner {
    snapshot: Arc<Snapshot>,
    published: u64,
    /// Newest refresh to finish, successfully or not.
    completed: u64,
    in_flight: usize,
    error: Option<String>,
}

pub struct DataProvider<S> {
    store: Arc<S>,
    inner: RwLock<Inner>,
    next_generation: AtomicU64,
    shutdown: CancellationToken,
}

impl<S: RecordStore> DataProvider<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner::default()),
            next_generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn state(&self) -> ProviderState {
        let inner = self.inner.read().await;
        ProviderState {
            snapshot: inner.snapshot.clone(),
            is_loading: inner.in_flight > 0,
            error: inner.error.clone(),
            generation: inner.published,
        }
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.snapshot.clone()
    }

    /// Reload every collection.
    ///
    /// Returns the newest published snapshot, which is this refresh's own result
    /// unless a later refresh overtook it.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, DataProviderError> {
        if self.shutdown.is_cancelled() {
            return Err(DataProviderError::ShutDown);
        }
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.write().await.in_flight += 1;

        let result = tokio::select! {
            _ = self.shutdown.cancelled() => Err(DataProviderError::ShutDown),
            loaded = self.load_all() => loaded,
        };

        let mut inner = self.inner.write().await;
        inner.in_flight -= 1;
        if self.shutdown.is_cancelled() {
            debug!(generation, "Dropping refresh result after shutdown");
            return Err(DataProviderError::ShutDown);
        }

        if generation <= inner.completed {
            debug!(
                generation,
                completed = inner.completed,
                "Discarding refresh overtaken by a newer one"
            );
            return result.map(|_| inner.snapshot.clone());
        }
        inner.completed = generation;

        match result {
            Ok(snapshot) => {
                inner.snapshot = Arc::new(snapshot);
                inner.published = generation;
                inner.error = None;
                debug!(generation, "Snapshot published");
                Ok(inner.snapshot.clone())
            }
            Err(e) => {
                error!(generation, error = %e, "Snapshot refresh failed");
                inner.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Stop accepting refreshes and abandon the ones in flight.
    pub fn shutdown(&self) {
        info!("Shutting down data provider");
        self.shutdown.cancel();
    }

    async fn load_all(&self) -> Result<Snapshot, DataProviderError> {
        let (activities, programs, staff, families, menu, documents, messages, transportation, gallery) = tokio::try_join!(
            self.load::<Activity>(),
            self.load::<Program>(),
            self.load::<StaffMember>(),
            self.load::<Family>(),
            self.load::<MenuItem>(),
            self.load::<Document>(),
            self.load::<Message>(),
            self.load::<TransportationRoute>(),
            self.load::<GalleryImage>(),
        )?;
        Ok(Snapshot {
            activities,
            programs,
            staff,
            families,
            menu,
            documents,
            messages,
            transportation,
            gallery,
        })
    }

    async fn load<R: Resource>(&self) -> Result<Vec<R>, DataProviderError> {
        self.store
            .list::<R>()
            .await
            .map_err(|e| DataProviderError::Fetch {
                collection: R::COLLECTION,
                message: e.to_string(),
            })
    }
}
