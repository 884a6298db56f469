//! Configuration for the local store.

use serde::Deserialize;
use std::path::PathBuf;

/// Settings for opening an [`InMemoryStore`](crate::InMemoryStore).
///
/// Deserializes from any serde format; every field has a default, so an empty
/// document yields a purely in-memory store.
///
/// ```ignore
/// let config: MemoryStoreConfig = serde_json::from_str(r#"{ "snapshot_path": "data/store.bson" }"#)?;
/// let store = InMemoryStoreBuilder::from_config(config).build().await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// File the store is loaded from on open and written to on flush.
    /// `None` keeps everything in memory.
    pub snapshot_path: Option<PathBuf>,
    /// Flush after every successful write instead of only on explicit flush and shutdown.
    pub flush_on_write: bool,
}
