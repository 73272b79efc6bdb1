use super::{ProviderError, SchemaCache, SchemaProvider};
use crate::schema::{self, TableDescriptor};
use crate::sql::{Dialect, parse_sql};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// SQL DDL dump
    Sql(Dialect),
    /// JSON array of table descriptors
    Json,
}

impl SourceFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "sql" | "ddl" => Some(Self::Sql(Dialect::Auto)),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSource {
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl SchemaSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Source whose format follows the file extension, SQL otherwise.
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SourceFormat::from_extension(&path).unwrap_or(SourceFormat::Sql(Dialect::Auto));
        Self { path, format }
    }

    fn load(&self) -> Result<Vec<TableDescriptor>, ProviderError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;

        let tables = match self.format {
            SourceFormat::Sql(dialect) => parse_sql(&content, dialect)?,
            SourceFormat::Json => schema::from_json(&content)?,
        };
        debug!("read {} tables from {}", tables.len(), self.path.display());
        Ok(tables)
    }
}

/// Provider reading schema files, one per connection. Files are re-read on a
/// cache miss or a forced refresh.
#[derive(Debug, Default)]
pub struct FileProvider {
    sources: HashMap<String, SchemaSource>,
    cache: SchemaCache,
}

impl FileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, connection_id: &str, source: SchemaSource) -> Self {
        self.register(connection_id, source);
        self
    }

    pub fn register(&mut self, connection_id: &str, source: SchemaSource) {
        self.cache.invalidate(connection_id);
        self.sources.insert(connection_id.to_string(), source);
    }

    pub fn source(&self, connection_id: &str) -> Option<&SchemaSource> {
        self.sources.get(connection_id)
    }
}

#[async_trait]
impl SchemaProvider for FileProvider {
    async fn get_schema(
        &self,
        connection_id: &str,
        force_refresh: bool,
    ) -> Result<Vec<TableDescriptor>, ProviderError> {
        if !force_refresh {
            if let Some(schema) = self.cache.get(connection_id) {
                return Ok(schema);
            }
        }

        let source = self
            .sources
            .get(connection_id)
            .ok_or_else(|| ProviderError::UnknownConnection(connection_id.to_string()))?;
        let schema = source.load()?;
        self.cache.insert(connection_id, schema.clone());
        Ok(schema)
    }

    fn clear_schema_cache(&self, connection_id: &str) {
        self.cache.invalidate(connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension(Path::new("dump.SQL")),
            Some(SourceFormat::Sql(Dialect::Auto))
        );
        assert_eq!(
            SourceFormat::from_extension(Path::new("schema.json")),
            Some(SourceFormat::Json)
        );
        assert_eq!(SourceFormat::from_extension(Path::new("schema")), None);
        assert_eq!(
            SchemaSource::detect("schema.txt").format,
            SourceFormat::Sql(Dialect::Auto)
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let provider = FileProvider::new().with_source(
            "main",
            SchemaSource::new("/nonexistent/schema.sql", SourceFormat::Sql(Dialect::Generic)),
        );

        let err = block_on(provider.get_schema("main", false)).unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
    }

    #[test]
    fn test_unregistered_connection() {
        let provider = FileProvider::new();
        let err = block_on(provider.get_schema("main", true)).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownConnection(_)));
    }
}
