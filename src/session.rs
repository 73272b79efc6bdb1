//! Diagram session: schema acquisition followed by layout.

use crate::layout::{Layout, LayoutEngine};
use crate::provider::{ProviderError, SchemaProvider};
use log::debug;

pub struct DiagramSession<P> {
    provider: P,
    engine: LayoutEngine,
}

impl<P: SchemaProvider> DiagramSession<P> {
    pub fn new(provider: P, engine: LayoutEngine) -> Self {
        Self { provider, engine }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Lay out the schema of `connection_id`, served from cache when possible.
    pub async fn load(&self, connection_id: &str) -> Result<Layout, ProviderError> {
        let schema = self.provider.get_schema(connection_id, false).await?;
        Ok(self.engine.layout(&schema))
    }

    /// Drop the cached schema, fetch it again and lay it out.
    pub async fn refresh(&self, connection_id: &str) -> Result<Layout, ProviderError> {
        debug!("refreshing schema for {}", connection_id);
        self.provider.clear_schema_cache(connection_id);
        let schema = self.provider.get_schema(connection_id, true).await?;
        Ok(self.engine.layout(&schema))
    }
}
