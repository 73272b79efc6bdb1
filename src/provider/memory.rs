use super::{ProviderError, SchemaCache, SchemaProvider};
use crate::schema::TableDescriptor;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Provider backed by in-memory schemas, standing in for a live connection.
///
/// The backing schema can change under a cached copy, which is what
/// `refresh` exists to pick up.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    schemas: Mutex<HashMap<String, Vec<TableDescriptor>>>,
    cache: SchemaCache,
    fetches: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(self, connection_id: &str, schema: Vec<TableDescriptor>) -> Self {
        self.insert(connection_id, schema);
        self
    }

    pub fn insert(&self, connection_id: &str, schema: Vec<TableDescriptor>) {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection_id.to_string(), schema);
    }

    /// Swap the backing schema of a known connection, returning the old one.
    /// Cached copies are left untouched.
    pub fn replace(
        &self,
        connection_id: &str,
        schema: Vec<TableDescriptor>,
    ) -> Result<Vec<TableDescriptor>, ProviderError> {
        let mut schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        match schemas.get_mut(connection_id) {
            Some(current) => Ok(std::mem::replace(current, schema)),
            None => Err(ProviderError::UnknownConnection(connection_id.to_string())),
        }
    }

    /// Number of reads that went past the cache.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn fetch(&self, connection_id: &str) -> Result<Vec<TableDescriptor>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(connection_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownConnection(connection_id.to_string()))
    }
}

#[async_trait]
impl SchemaProvider for MemoryProvider {
    async fn get_schema(
        &self,
        connection_id: &str,
        force_refresh: bool,
    ) -> Result<Vec<TableDescriptor>, ProviderError> {
        if !force_refresh {
            if let Some(schema) = self.cache.get(connection_id) {
                debug!("schema cache hit for {}", connection_id);
                return Ok(schema);
            }
        }

        let schema = self.fetch(connection_id)?;
        self.cache.insert(connection_id, schema.clone());
        Ok(schema)
    }

    fn clear_schema_cache(&self, connection_id: &str) {
        self.cache.invalidate(connection_id);
    }
}
