//! Connected-component discovery over the foreign-key graph.

use crate::schema::TableDescriptor;
use std::collections::HashMap;

/// Build table name -> index lookup.
pub fn build_table_index(tables: &[&TableDescriptor]) -> HashMap<String, usize> {
    tables
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.name.clone(), idx))
        .collect()
}

/// Undirected adjacency lists. A foreign key links both tables regardless of
/// direction; references to tables outside the schema add nothing.
pub fn build_adjacency(
    tables: &[&TableDescriptor],
    table_index: &HashMap<String, usize>,
) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];

    for (from, table) in tables.iter().enumerate() {
        for fk in &table.foreign_keys {
            let Some(&to) = table_index.get(&fk.referenced_table) else {
                continue;
            };
            if to == from {
                continue;
            }
            if !adjacency[from].contains(&to) {
                adjacency[from].push(to);
            }
            if !adjacency[to].contains(&from) {
                adjacency[to].push(from);
            }
        }
    }

    adjacency
}

/// Partition tables into connected components.
/// Seeds follow input order, so the result is deterministic.
pub fn connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut components = Vec::new();

    for seed in 0..adjacency.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let mut component = Vec::new();
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            component.push(current);
            // Reverse so neighbours are visited in insertion order
            for &next in adjacency[current].iter().rev() {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<TableDescriptor> {
        vec![
            TableDescriptor::new("users"),
            TableDescriptor::new("orders").with_foreign_key("user_id", "users", "id"),
            TableDescriptor::new("tags"),
            TableDescriptor::new("items")
                .with_foreign_key("order_id", "orders", "id")
                .with_foreign_key("ghost_id", "ghost", "id"),
            TableDescriptor::new("nodes").with_foreign_key("parent_id", "nodes", "id"),
        ]
    }

    fn components_of(tables: &[TableDescriptor]) -> Vec<Vec<usize>> {
        let refs: Vec<&TableDescriptor> = tables.iter().collect();
        let index = build_table_index(&refs);
        let adjacency = build_adjacency(&refs, &index);
        connected_components(&adjacency)
    }

    #[test]
    fn test_adjacency_is_undirected() {
        let tables = schema();
        let refs: Vec<&TableDescriptor> = tables.iter().collect();
        let index = build_table_index(&refs);
        let adjacency = build_adjacency(&refs, &index);

        assert_eq!(adjacency[0], vec![1]);
        assert_eq!(adjacency[1], vec![0, 3]);
        assert_eq!(adjacency[3], vec![1]);
    }

    #[test]
    fn test_missing_reference_and_self_reference_add_no_edges() {
        let tables = schema();
        let refs: Vec<&TableDescriptor> = tables.iter().collect();
        let index = build_table_index(&refs);
        let adjacency = build_adjacency(&refs, &index);

        assert!(adjacency[4].is_empty());
        assert!(adjacency[2].is_empty());
    }

    #[test]
    fn test_components_partition_tables() {
        let components = components_of(&schema());

        assert_eq!(components, vec![vec![0, 1, 3], vec![2], vec![4]]);
        let mut all: Vec<usize> = components.into_iter().flatten().collect();
        all.sort();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_transitive_chain_is_one_component() {
        let tables = vec![
            TableDescriptor::new("a").with_foreign_key("b_id", "b", "id"),
            TableDescriptor::new("c"),
            TableDescriptor::new("b").with_foreign_key("c_id", "c", "id"),
        ];
        let components = components_of(&tables);

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn test_empty_schema() {
        assert!(components_of(&[]).is_empty());
    }
}
