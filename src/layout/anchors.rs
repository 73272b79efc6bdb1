//! Foreign-key edge resolution and foreign-column marking.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::config::LayoutConfig;
use crate::schema::TableDescriptor;

use super::types::{ColumnData, Handle, LayoutEdge, LayoutWarning};

/// Columns on the owning side of any foreign key, whether or not the
/// referenced table exists.
pub fn foreign_columns<'a>(tables: &[&'a TableDescriptor]) -> HashSet<(&'a str, &'a str)> {
    tables
        .iter()
        .flat_map(|&t| {
            t.foreign_keys
                .iter()
                .map(move |fk| (t.name.as_str(), fk.column.as_str()))
        })
        .collect()
}

/// Rendering data for a table's columns with `is_foreign` filled in.
pub fn column_data(
    table: &TableDescriptor,
    foreign: &HashSet<(&str, &str)>,
) -> Vec<ColumnData> {
    table
        .columns
        .iter()
        .map(|c| ColumnData {
            name: c.name.clone(),
            typ: c.typ.clone(),
            length: c.length,
            precision: c.precision,
            is_primary: c.is_primary,
            is_nullable: c.is_nullable,
            is_foreign: foreign.contains(&(table.name.as_str(), c.name.as_str())),
            default_value: c.default_value.clone(),
        })
        .collect()
}

/// Handle on the referenced side: the column itself when it is the
/// referenced table's primary key, otherwise the table header.
fn source_handle(referenced: &TableDescriptor, column: &str) -> Handle {
    match referenced.column(column) {
        Some(c) if c.is_primary => Handle::Column {
            table: referenced.name.clone(),
            column: column.to_string(),
        },
        _ => Handle::Table {
            table: referenced.name.clone(),
        },
    }
}

/// Resolve every foreign key into an edge. Keys pointing at tables outside the
/// schema are skipped and reported.
pub fn resolve_edges(
    tables: &[&TableDescriptor],
    table_index: &HashMap<String, usize>,
    config: &LayoutConfig,
) -> (Vec<LayoutEdge>, Vec<LayoutWarning>) {
    let mut edges: Vec<LayoutEdge> = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_ids: HashMap<String, usize> = HashMap::new();

    for table in tables {
        for fk in &table.foreign_keys {
            let Some(&referenced_idx) = table_index.get(&fk.referenced_table) else {
                warn!(
                    "skipping foreign key {}.{}: table {} not found",
                    table.name, fk.column, fk.referenced_table
                );
                warnings.push(LayoutWarning::MissingReference {
                    table: table.name.clone(),
                    column: fk.column.clone(),
                    referenced_table: fk.referenced_table.clone(),
                });
                continue;
            };
            let referenced = tables[referenced_idx];

            let base_id = format!(
                "fk-{}.{}-{}.{}",
                table.name, fk.column, fk.referenced_table, fk.referenced_column
            );
            let id = match seen_ids.get_mut(&base_id) {
                Some(n) => {
                    *n += 1;
                    format!("{}-{}", base_id, n)
                }
                None => {
                    seen_ids.insert(base_id.clone(), 0);
                    base_id
                }
            };

            let color = config.color(edges.len()).to_string();
            edges.push(LayoutEdge {
                id,
                source: referenced.name.clone(),
                target: table.name.clone(),
                source_handle: source_handle(referenced, &fk.referenced_column),
                target_handle: Handle::Column {
                    table: table.name.clone(),
                    column: fk.column.clone(),
                },
                color,
                label: format!("{} -> {}", fk.column, fk.referenced_column),
            });
        }
    }

    (edges, warnings)
}
