//! Layout engine core implementation.

use std::collections::HashSet;

use log::{debug, warn};

use crate::config::LayoutConfig;
use crate::schema::TableDescriptor;

use super::anchors::{column_data, foreign_columns, resolve_edges};
use super::arrange::{Strategy, arrange, fit_group};
use super::components::{build_adjacency, build_table_index, connected_components};
use super::groups::{Group, build_groups};
use super::placement::place_groups;
use super::types::{
    GroupData, Layout, LayoutNode, LayoutWarning, NodeData, Position, Size, TableData,
};

/// Layout engine configuration and computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute layout for the given schema. Never fails: anomalies end up in
    /// `Layout::warnings`.
    pub fn layout(&self, schema: &[TableDescriptor]) -> Layout {
        let config = &self.config;

        // Phase 1: Drop duplicate table names (first one wins)
        let (tables, mut warnings) = dedupe_tables(schema);
        if tables.is_empty() {
            return Layout {
                warnings,
                ..Layout::default()
            };
        }

        // Phase 2: Dimension estimation
        let sizes: Vec<(f64, f64)> = tables.iter().map(|t| config.metrics.size_of(t)).collect();

        // Phase 3: Connected components
        let table_index = build_table_index(&tables);
        let adjacency = build_adjacency(&tables, &table_index);
        let components = connected_components(&adjacency);

        // Phase 4: Grouping, naming, coloring and sizing
        let mut groups = build_groups(components, &tables, &sizes, config);

        // Phase 5: Table placement within each group
        let arrangements: Vec<Vec<(f64, f64)>> = groups
            .iter_mut()
            .map(|group| {
                let strategy = Strategy::for_group(group, config);
                let member_sizes: Vec<(f64, f64)> =
                    group.members.iter().map(|&m| sizes[m]).collect();
                debug!(
                    "{}: {} tables, {:?} arrangement",
                    group.label,
                    group.members.len(),
                    strategy
                );

                let positions =
                    arrange(strategy, group.width, group.height, &member_sizes, config);
                fit_group(group, &positions, &member_sizes, config.group_padding);
                positions
            })
            .collect();

        // Phase 6: Group placement
        let (rects, width, height) = place_groups(
            &groups,
            config.canvas_margin,
            config.group_gap_x,
            config.group_gap_y,
        );

        // Phase 7: Nodes, each group followed by its tables
        let foreign = foreign_columns(&tables);
        let mut nodes = Vec::with_capacity(groups.len() + tables.len());

        for (index, ((group, rect), positions)) in
            groups.iter().zip(&rects).zip(&arrangements).enumerate()
        {
            let group_id = Group::id(index);
            nodes.push(LayoutNode {
                id: group_id.clone(),
                position: Position {
                    x: rect.x,
                    y: rect.y,
                },
                size: Size {
                    width: rect.width,
                    height: rect.height,
                },
                data: NodeData::Group(GroupData {
                    label: group.label.clone(),
                    color: group.color.clone(),
                    tables: group
                        .members
                        .iter()
                        .map(|&m| tables[m].name.clone())
                        .collect(),
                    isolated: group.isolated,
                }),
            });

            for (&member, &(rel_x, rel_y)) in group.members.iter().zip(positions) {
                let table = tables[member];
                let (w, h) = sizes[member];
                nodes.push(LayoutNode {
                    id: table.name.clone(),
                    position: Position {
                        x: rect.x + rel_x,
                        y: rect.y + rel_y,
                    },
                    size: Size {
                        width: w,
                        height: h,
                    },
                    data: NodeData::Table(TableData {
                        label: table.name.clone(),
                        group: group_id.clone(),
                        columns: column_data(table, &foreign),
                    }),
                });
            }
        }

        // Phase 8: Foreign-key edges
        let (edges, edge_warnings) = resolve_edges(&tables, &table_index, config);
        warnings.extend(edge_warnings);

        Layout {
            nodes,
            edges,
            warnings,
            width,
            height,
        }
    }
}

fn dedupe_tables(schema: &[TableDescriptor]) -> (Vec<&TableDescriptor>, Vec<LayoutWarning>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tables = Vec::with_capacity(schema.len());
    let mut warnings = Vec::new();

    for table in schema {
        if seen.insert(table.name.as_str()) {
            tables.push(table);
        } else {
            warn!("duplicate table {} ignored", table.name);
            warnings.push(LayoutWarning::DuplicateTable {
                name: table.name.clone(),
            });
        }
    }

    (tables, warnings)
}
