//! Schema acquisition: the upstream side of a diagram.
//!
//! A provider maps a connection identifier to a list of table descriptors. It
//! may answer from its cache unless asked to refresh.

mod file;
mod memory;

pub use file::{FileProvider, SchemaSource, SourceFormat};
pub use memory::MemoryProvider;

use crate::schema::TableDescriptor;
use crate::sql::SqlParseError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("SQL error: {0}")]
    Sql(#[from] SqlParseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Schema for `connection_id`. With `force_refresh` the cache is bypassed
    /// and overwritten.
    async fn get_schema(
        &self,
        connection_id: &str,
        force_refresh: bool,
    ) -> Result<Vec<TableDescriptor>, ProviderError>;

    /// Drop any cached schema for `connection_id`.
    fn clear_schema_cache(&self, connection_id: &str);
}

/// Per-connection schema cache shared by the providers.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<String, Vec<TableDescriptor>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<TableDescriptor>>> {
        // Entries are replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, connection_id: &str) -> Option<Vec<TableDescriptor>> {
        self.lock().get(connection_id).cloned()
    }

    pub fn insert(&self, connection_id: &str, schema: Vec<TableDescriptor>) {
        self.lock().insert(connection_id.to_string(), schema);
    }

    /// Returns whether an entry was present.
    pub fn invalidate(&self, connection_id: &str) -> bool {
        self.lock().remove(connection_id).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_roundtrip() {
        let cache = SchemaCache::new();
        assert!(cache.get("main").is_none());

        cache.insert("main", vec![TableDescriptor::new("users")]);
        assert_eq!(cache.get("main").unwrap()[0].name, "users");
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate("main"));
        assert!(!cache.invalidate("main"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let cache = SchemaCache::new();
        cache.insert("a", Vec::new());
        cache.insert("b", Vec::new());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = ProviderError::UnknownConnection("prod".to_string());
        assert_eq!(err.to_string(), "Unknown connection: prod");

        let err = ProviderError::Io {
            path: PathBuf::from("schema.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Failed to read schema.sql: missing");
    }
}
