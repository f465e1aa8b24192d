//! In-memory bundles of schemas and data documents
//!
//! A bundle is the closed resolution universe of one validation run. The
//! schema bundle is a read-through cache: a lookup miss on a network
//! identifier is filled by the [`SchemaFetcher`] exactly once and the
//! fetched schema stays in the bundle for the rest of the run.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{BundleError, Result};
use crate::fetch::SchemaFetcher;

/// The on-disk bundle envelope: `{"schemas": {...}, "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct BundleEnvelope {
    pub schemas: Map<String, Value>,
    pub data: Map<String, Value>,
}

impl BundleEnvelope {
    /// Parse an envelope from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| BundleError::InvalidBundle(e.to_string()))
    }

    /// Parse an envelope from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[derive(Default)]
struct SchemaStore {
    /// Bundled identifiers in envelope order
    bundled: Vec<String>,
    /// Fetched identifiers in fetch order
    fetched: Vec<String>,
    by_id: HashMap<String, Arc<Value>>,
}

impl SchemaStore {
    fn insert_if_absent(&mut self, id: &str, schema: Arc<Value>, fetched: bool) -> Arc<Value> {
        if let Some(existing) = self.by_id.get(id) {
            return Arc::clone(existing);
        }
        if fetched {
            self.fetched.push(id.to_string());
        } else {
            self.bundled.push(id.to_string());
        }
        self.by_id.insert(id.to_string(), Arc::clone(&schema));
        schema
    }
}

/// Schemas keyed by identifier, with fetch-on-miss for network identifiers
///
/// Cloning yields another handle to the same store. Inserts are
/// insert-if-absent under a single writer lock, so concurrent misses on
/// the same identifier fetch it only once.
#[derive(Clone)]
pub struct SchemaBundle {
    store: Arc<RwLock<SchemaStore>>,
    fetcher: Arc<dyn SchemaFetcher>,
}

impl SchemaBundle {
    /// Build a bundle from parsed schemas, keeping their order
    pub fn new(schemas: Map<String, Value>, fetcher: Arc<dyn SchemaFetcher>) -> Self {
        let mut store = SchemaStore::default();
        for (id, schema) in schemas {
            store.insert_if_absent(&id, Arc::new(schema), false);
        }
        Self {
            store: Arc::new(RwLock::new(store)),
            fetcher,
        }
    }

    /// Look up a schema without fetching
    pub fn get(&self, id: &str) -> Option<Arc<Value>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.by_id.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up a schema, fetching and caching it on a miss
    pub fn get_or_fetch(&self, id: &str) -> Result<Arc<Value>> {
        if let Some(schema) = self.get(id) {
            return Ok(schema);
        }

        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have filled it while we waited for the lock.
        if let Some(schema) = store.by_id.get(id) {
            return Ok(Arc::clone(schema));
        }

        let fetched = Arc::new(self.fetcher.fetch(id)?);
        info!("cached fetched schema: {}", id);
        Ok(store.insert_if_absent(id, fetched, true))
    }

    /// Identifiers of the bundled schemas, in envelope order
    ///
    /// Fetched schemas are resolvable but never listed here.
    pub fn identifiers(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.bundled.clone()
    }

    /// Identifiers filled in by the fetcher so far
    pub fn fetched(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.fetched.clone()
    }

    /// Number of bundled schemas
    pub fn len(&self) -> usize {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.bundled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SchemaBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaBundle")
            .field("schemas", &self.identifiers())
            .field("fetched", &self.fetched())
            .finish()
    }
}

/// Data documents keyed by filename; immutable for the run
#[derive(Debug, Clone, Default)]
pub struct DataBundle {
    documents: Map<String, Value>,
}

impl DataBundle {
    pub fn new(documents: Map<String, Value>) -> Self {
        Self { documents }
    }

    pub fn get(&self, filename: &str) -> Option<&Value> {
        self.documents.get(filename)
    }

    /// Documents in bundle order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
