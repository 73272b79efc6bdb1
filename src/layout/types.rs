//! Data structures produced by layout computation.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A positioned node: either a synthetic group box or a table inside one.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub position: Position,
    pub size: Size,
    #[serde(flatten)]
    pub data: NodeData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum NodeData {
    Group(GroupData),
    Table(TableData),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub label: String,
    pub color: String,
    /// Member table names
    pub tables: Vec<String>,
    /// True for the merged group of tables without relationships
    pub isolated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub label: String,
    /// Id of the containing group node
    pub group: String,
    pub columns: Vec<ColumnData>,
}

/// Per-column rendering data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnData {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    pub is_primary: bool,
    pub is_nullable: bool,
    pub is_foreign: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Visual anchor on a table node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handle {
    Column { table: String, column: String },
    Table { table: String },
}

impl Handle {
    pub fn table(&self) -> &str {
        match self {
            Handle::Column { table, .. } | Handle::Table { table } => table,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Handle::Column { column, .. } => Some(column),
            Handle::Table { .. } => None,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Column { table, column } => write!(f, "{}.{}", table, column),
            Handle::Table { table } => write!(f, "{}", table),
        }
    }
}

impl Serialize for Handle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One foreign-key relationship, drawn from the referenced table to the owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    /// Referenced table
    pub source: String,
    /// Owning table
    pub target: String,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub color: String,
    pub label: String,
}

/// Non-fatal anomalies found while laying out a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutWarning {
    #[error("foreign key {table}.{column} references missing table {referenced_table}")]
    #[serde(rename_all = "camelCase")]
    MissingReference {
        table: String,
        column: String,
        referenced_table: String,
    },
    #[error("duplicate table {name} ignored")]
    DuplicateTable { name: String },
}

/// The complete layout result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub warnings: Vec<LayoutWarning>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&LayoutNode, &GroupData)> {
        self.nodes.iter().filter_map(|n| match &n.data {
            NodeData::Group(g) => Some((n, g)),
            NodeData::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = (&LayoutNode, &TableData)> {
        self.nodes.iter().filter_map(|n| match &n.data {
            NodeData::Table(t) => Some((n, t)),
            NodeData::Group(_) => None,
        })
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Axis-aligned box used while placing groups and tables.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl LayoutNode {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.position.x,
            y: self.position.y,
            width: self.size.width,
            height: self.size.height,
        }
    }
}
