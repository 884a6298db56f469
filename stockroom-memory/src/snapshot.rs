//! On-disk snapshot of the whole store.
//!
//! The snapshot is a single BSON file listing every collection with its documents in
//! insertion order, so a reopened store scans in the same order as before.

use bson::{Document as BsonDocument, Uuid, deserialize_from_slice, serialize_to_vec};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use stockroom_core::error::{DocumentStoreError, DocumentStoreResult};

use crate::store::{CollectionMap, StoreMap};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    collections: Vec<SnapshotCollection>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotCollection {
    name: String,
    documents: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    id: String,
    document: BsonDocument,
}

impl Snapshot {
    pub fn capture(store: &StoreMap) -> Self {
        Self {
            collections: store
                .iter()
                .map(|(name, collection)| SnapshotCollection {
                    name: name.clone(),
                    documents: collection
                        .iter()
                        .map(|(id, document)| SnapshotEntry {
                            id: id.to_string(),
                            document: document.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn restore(self) -> DocumentStoreResult<StoreMap> {
        let mut store = StoreMap::new();

        for collection in self.collections {
            let mut map = CollectionMap::default();

            for entry in collection.documents {
                let id = Uuid::parse_str(&entry.id).map_err(|err| {
                    DocumentStoreError::Initialization(format!(
                        "bad id {} in snapshot collection {}: {err}",
                        entry.id, collection.name
                    ))
                })?;

                if !map.insert(id, entry.document) {
                    return Err(DocumentStoreError::Initialization(format!(
                        "duplicate id {} in snapshot collection {}",
                        entry.id, collection.name
                    )));
                }
            }

            store.insert(collection.name, map);
        }

        Ok(store)
    }

    /// Reads a snapshot, or `None` when the file does not exist yet.
    pub fn load(path: &Path) -> DocumentStoreResult<Option<Self>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(DocumentStoreError::Initialization(err.to_string())),
        };

        deserialize_from_slice(&bytes)
            .map(Some)
            .map_err(|err| DocumentStoreError::Initialization(format!("unreadable snapshot: {err}")))
    }

    /// Writes the snapshot next to `path` and renames it into place.
    pub fn save(&self, path: &Path) -> DocumentStoreResult<()> {
        let bytes = serialize_to_vec(self)?;
        let staging = path.with_extension("tmp");

        fs::write(&staging, bytes)?;
        fs::rename(&staging, path)?;

        Ok(())
    }
}
