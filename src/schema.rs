//! Schema descriptors consumed by the layout engine.
//!
//! These are the normalised shape every schema source produces, whether it is
//! a SQL dump, a JSON document or a live connection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDescriptor {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

fn default_nullable() -> bool {
    true
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyDescriptor {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First primary-key column, if any.
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary)
    }
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            length: None,
            precision: None,
            is_primary: false,
            is_nullable: true,
            default_value: None,
        }
    }

    /// Primary-key column: never nullable.
    pub fn primary(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            is_primary: true,
            is_nullable: false,
            ..Self::new(name, typ)
        }
    }
}

/// Parse a JSON array of table descriptors.
pub fn from_json(input: &str) -> Result<Vec<TableDescriptor>, serde_json::Error> {
    serde_json::from_str(input)
}
