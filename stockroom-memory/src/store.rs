//! In-memory storage implementation for document stores.
//!
//! Documents live in insertion-ordered maps behind an async-aware read-write lock.
//! Every write takes the write lock for its whole duration, which is what makes
//! [`StoreBackend::insert_unique`] atomic.

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, Uuid};
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};
use tracing::{debug, info, trace};

use stockroom_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query},
};

use crate::{config::MemoryStoreConfig, evaluator::{Comparable, DocumentEvaluator}, snapshot::Snapshot};

pub(crate) type StoreMap = BTreeMap<String, CollectionMap>;

/// Documents of one collection, iterated in insertion order.
#[derive(Debug, Default, Clone)]
pub(crate) struct CollectionMap {
    entries: BTreeMap<u64, (Uuid, BsonDocument)>,
    positions: HashMap<Uuid, u64>,
    next_position: u64,
}

impl CollectionMap {
    /// Appends a document. Returns `false` and leaves the map untouched if the ID exists.
    pub fn insert(&mut self, id: Uuid, document: BsonDocument) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }

        let position = self.next_position;
        self.next_position += 1;
        self.positions.insert(id, position);
        self.entries.insert(position, (id, document));

        true
    }

    /// Replaces a document in place. Returns `false` if the ID is absent.
    pub fn replace(&mut self, id: &Uuid, document: BsonDocument) -> bool {
        match self
            .positions
            .get(id)
            .and_then(|position| self.entries.get_mut(position))
        {
            Some(entry) => {
                entry.1 = document;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<BsonDocument> {
        let position = self.positions.remove(id)?;

        self.entries
            .remove(&position)
            .map(|(_, document)| document)
    }

    pub fn get(&self, id: &Uuid) -> Option<&BsonDocument> {
        self.positions
            .get(id)
            .and_then(|position| self.entries.get(position))
            .map(|(_, document)| document)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &BsonDocument)> {
        self.entries
            .values()
            .map(|(id, document)| (id, document))
    }
}

fn into_document(bson: Bson, collection: &str) -> DocumentStoreResult<BsonDocument> {
    match bson {
        Bson::Document(document) => Ok(document),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a document in collection {collection}, got {:?}",
            other.element_type()
        ))),
    }
}

/// Thread-safe local document storage backend.
///
/// Cloning an `InMemoryStore` shares the same underlying data. When opened with a
/// snapshot path the store reloads its contents on build and writes them back on
/// [`flush`](StoreBackend::flush) and [`shutdown`](StoreBackend::shutdown).
///
/// # Performance
///
/// Queries scan every document of a collection (no secondary indexes).
///
/// # Example
///
/// ```ignore
/// use stockroom_memory::InMemoryStore;
/// use stockroom_core::backend::StoreBackend;
/// use bson::{Uuid, Bson, doc};
///
/// let store = InMemoryStore::new();
/// let id = Uuid::new();
/// store.insert_documents(vec![(id, Bson::Document(doc! { "name": "Acme" }))], "providers").await?;
/// assert_eq!(store.get_documents(vec![id], "providers").await?.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> ordered documents
    store: Arc<RwLock<StoreMap>>,
    snapshot_path: Option<Arc<PathBuf>>,
    flush_on_write: bool,
}

impl InMemoryStore {
    /// Creates a new empty store with no snapshot file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for opening an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the number of live documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(collection)
            .map_or(0, CollectionMap::len)
    }

    fn persist(&self, store: &StoreMap) -> DocumentStoreResult<()> {
        if let Some(path) = &self.snapshot_path {
            Snapshot::capture(store).save(path)?;
            debug!(path = %path.display(), collections = store.len(), "snapshot written");
        }

        Ok(())
    }

    /// Applies a write to the live map.
    ///
    /// With `flush_on_write` the write goes to a staged copy that only replaces the live
    /// map once its snapshot is on disk, so a failed flush leaves the store unchanged.
    fn commit<T>(
        &self,
        store: &mut StoreMap,
        write: impl FnOnce(&mut StoreMap) -> DocumentStoreResult<T>,
    ) -> DocumentStoreResult<T> {
        if !self.flush_on_write || self.snapshot_path.is_none() {
            return write(store);
        }

        let mut staged = store.clone();
        let output = write(&mut staged)?;

        self.persist(&staged)?;
        *store = staged;

        Ok(output)
    }
}

fn not_found(id: &Uuid, collection: &str) -> DocumentStoreError {
    DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string())
}

/// Returns the ID of the live document holding `key` in `field`, if any.
fn holder_of(collection_map: &CollectionMap, field: &str, key: &Bson) -> Option<Uuid> {
    let key = Comparable::from(key);

    collection_map
        .iter()
        .find(|(_, existing)| {
            existing
                .get(field)
                .is_some_and(|value| Comparable::from(value) == key)
        })
        .map(|(id, _)| *id)
}

fn unique_violation(field: &str, key: &Bson, collection: &str) -> DocumentStoreError {
    let value = match key {
        Bson::String(value) => value.clone(),
        other => other.to_string(),
    };

    DocumentStoreError::UniqueViolation(field.to_string(), value, collection.to_string())
}

fn unique_key<'d>(document: &'d BsonDocument, field: &str) -> DocumentStoreResult<&'d Bson> {
    document
        .get(field)
        .ok_or_else(|| DocumentStoreError::InvalidDocument(format!("missing unique field {field}")))
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> DocumentStoreResult<()> {
        let documents = documents
            .into_iter()
            .map(|(id, doc)| into_document(doc, collection).map(|doc| (id, doc)))
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let collection_map = store
                .entry(collection.to_string())
                .or_default();

            // Check everything before touching anything so a failed batch writes nothing.
            let mut incoming = HashSet::with_capacity(documents.len());
            if let Some((id, _)) = documents
                .iter()
                .find(|(id, _)| collection_map.contains(id) || !incoming.insert(*id))
            {
                return Err(DocumentStoreError::DocumentAlreadyExists(id.to_string(), collection.to_string()));
            }

            for (id, doc) in documents {
                collection_map.insert(id, doc);
                debug!(%id, collection, "document inserted");
            }

            Ok(())
        })
    }

    async fn insert_unique(&self, id: Uuid, document: Bson, field: &str, collection: &str) -> DocumentStoreResult<()> {
        let document = into_document(document, collection)?;
        let key = unique_key(&document, field)?.clone();

        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let collection_map = store
                .entry(collection.to_string())
                .or_default();

            if holder_of(collection_map, field, &key).is_some() {
                return Err(unique_violation(field, &key, collection));
            }

            if !collection_map.insert(id, document) {
                return Err(DocumentStoreError::DocumentAlreadyExists(id.to_string(), collection.to_string()));
            }

            debug!(%id, collection, field, "document inserted under unique key");
            Ok(())
        })
    }

    async fn update_documents(&self, documents: Vec<(Uuid, Bson)>, collection: &str) -> DocumentStoreResult<()> {
        let documents = documents
            .into_iter()
            .map(|(id, doc)| into_document(doc, collection).map(|doc| (id, doc)))
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let Some(collection_map) = store.get_mut(collection) else {
                return match documents.first() {
                    Some((id, _)) => Err(not_found(id, collection)),
                    None => Ok(()),
                };
            };

            if let Some((missing, _)) = documents
                .iter()
                .find(|(id, _)| !collection_map.contains(id))
            {
                return Err(not_found(missing, collection));
            }

            for (id, doc) in documents {
                collection_map.replace(&id, doc);
                debug!(%id, collection, "document updated");
            }

            Ok(())
        })
    }

    async fn update_unique(&self, id: Uuid, document: Bson, field: &str, collection: &str) -> DocumentStoreResult<()> {
        let document = into_document(document, collection)?;
        let key = unique_key(&document, field)?.clone();

        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let collection_map = store
                .get_mut(collection)
                .filter(|collection_map| collection_map.contains(&id))
                .ok_or_else(|| not_found(&id, collection))?;

            if holder_of(collection_map, field, &key).is_some_and(|holder| holder != id) {
                return Err(unique_violation(field, &key, collection));
            }

            collection_map.replace(&id, document);
            debug!(%id, collection, field, "document updated under unique key");

            Ok(())
        })
    }

    async fn update_if(&self, id: Uuid, document: Bson, condition: &Expr, collection: &str) -> DocumentStoreResult<bool> {
        let document = into_document(document, collection)?;

        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let collection_map = store
                .get_mut(collection)
                .ok_or_else(|| not_found(&id, collection))?;
            let current = collection_map
                .get(&id)
                .ok_or_else(|| not_found(&id, collection))?;

            if !DocumentEvaluator::matches(current, condition) {
                trace!(%id, collection, "conditional update skipped");
                return Ok(false);
            }

            collection_map.replace(&id, document);
            debug!(%id, collection, "document conditionally updated");

            Ok(true)
        })
    }

    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            let Some(collection_map) = store.get_mut(collection) else {
                return match ids.first() {
                    Some(id) => Err(not_found(id, collection)),
                    None => Ok(()),
                };
            };

            if let Some(missing) = ids.iter().find(|id| !collection_map.contains(id)) {
                return Err(not_found(missing, collection));
            }

            for id in ids {
                collection_map.remove(&id);
                debug!(%id, collection, "document deleted");
            }

            Ok(())
        })
    }

    async fn get_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        Ok(ids
            .iter()
            .filter_map(|id| collection_map.get(id))
            .cloned()
            .map(Bson::Document)
            .collect())
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let limit = query.limit.unwrap_or(usize::MAX);
        let mut matched = Vec::new();

        for (_, document) in collection_map.iter() {
            if matched.len() >= limit {
                break;
            }

            let accepted = match &query.filter {
                Some(filter) => DocumentEvaluator::matches(document, filter),
                None => true,
            };

            if accepted {
                matched.push(Bson::Document(document.clone()));
            }
        }

        trace!(collection, scanned = collection_map.len(), matched = matched.len(), "query scan");

        Ok(matched)
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        if store.contains_key(name) {
            return Ok(());
        }

        self.commit(&mut store, |store| {
            store.insert(name.to_string(), CollectionMap::default());
            Ok(())
        })
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        self.commit(&mut store, |store| {
            store
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| DocumentStoreError::CollectionNotFound(name.to_string()))
        })
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(self
            .store
            .read()
            .await
            .keys()
            .cloned()
            .collect())
    }

    async fn flush(&self) -> DocumentStoreResult<()> {
        let store = self.store.read().await;

        self.persist(&store)
    }

    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        self.flush().await?;
        info!(snapshot = self.snapshot_path.is_some(), "in-memory store shut down");

        Ok(())
    }
}

/// Builder for opening [`InMemoryStore`] instances.
///
/// ```ignore
/// use stockroom_memory::InMemoryStore;
/// use stockroom_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_snapshot_path("data/stockroom.bson")
///     .flush_on_write(true)
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    snapshot_path: Option<PathBuf>,
    flush_on_write: bool,
}

impl InMemoryStoreBuilder {
    pub fn from_config(config: MemoryStoreConfig) -> Self {
        Self {
            snapshot_path: config.snapshot_path,
            flush_on_write: config.flush_on_write,
        }
    }

    /// Loads from and persists to the given file.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Persists after every successful write.
    pub fn flush_on_write(mut self, enabled: bool) -> Self {
        self.flush_on_write = enabled;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let contents = match &self.snapshot_path {
            Some(path) => match Snapshot::load(path)? {
                Some(snapshot) => {
                    let contents = snapshot.restore()?;
                    info!(path = %path.display(), collections = contents.len(), "snapshot loaded");
                    contents
                }
                None => {
                    info!(path = %path.display(), "no snapshot yet, starting empty");
                    StoreMap::new()
                }
            },
            None => StoreMap::new(),
        };

        Ok(InMemoryStore {
            store: Arc::new(RwLock::new(contents)),
            snapshot_path: self.snapshot_path.map(Arc::new),
            flush_on_write: self.flush_on_write,
        })
    }
}
