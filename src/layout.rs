//! Schema graph layout: tables grouped by foreign keys, groups placed on a
//! grid, tables arranged inside each group.

pub mod anchors;
pub mod arrange;
pub mod components;
pub mod engine;
pub mod groups;
pub mod placement;
pub mod types;

pub use engine::LayoutEngine;
pub use types::{
    ColumnData, GroupData, Handle, Layout, LayoutEdge, LayoutNode, LayoutWarning, NodeData,
    Position, Rect, Size, TableData,
};

use crate::schema::TableDescriptor;

/// Lay out `schema` with the default configuration.
pub fn compute_layout(schema: &[TableDescriptor]) -> Layout {
    LayoutEngine::default().layout(schema)
}
