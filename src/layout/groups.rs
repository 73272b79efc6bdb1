//! Group formation: isolated-table merge, naming, coloring and sizing.

use crate::config::LayoutConfig;
use crate::schema::TableDescriptor;

/// A group of tables before placement. Member entries index into the
/// deduplicated table list.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub members: Vec<usize>,
    pub isolated: bool,
    pub label: String,
    pub color: String,
    pub width: f64,
    pub height: f64,
}

impl Group {
    pub fn id(index: usize) -> String {
        format!("group-{}", index)
    }
}

/// Split components into multi-table groups followed by one merged group of
/// singletons. With `merge` off every singleton stays on its own.
pub fn merge_isolated(components: Vec<Vec<usize>>, merge: bool) -> Vec<(Vec<usize>, bool)> {
    let (multi, singles): (Vec<_>, Vec<_>) = components.into_iter().partition(|c| c.len() > 1);

    let mut groups: Vec<(Vec<usize>, bool)> = multi.into_iter().map(|c| (c, false)).collect();
    if merge {
        let mut isolated: Vec<usize> = singles.into_iter().flatten().collect();
        if !isolated.is_empty() {
            isolated.sort_unstable();
            groups.push((isolated, true));
        }
    } else {
        groups.extend(singles.into_iter().map(|c| (c, false)));
    }
    groups
}

/// "<shortest table name> Group", earliest table winning ties.
pub fn group_label(
    members: &[usize],
    tables: &[&TableDescriptor],
    isolated: bool,
    config: &LayoutConfig,
) -> String {
    if isolated {
        return config.isolated_group_label.clone();
    }
    members
        .iter()
        .min_by_key(|&&idx| (tables[idx].name.chars().count(), idx))
        .map(|&idx| format!("{} Group", tables[idx].name))
        .unwrap_or_default()
}

/// Closed-form group box for the member tables, picked by table count.
pub fn group_size(member_sizes: &[(f64, f64)], config: &LayoutConfig) -> (f64, f64) {
    let count = member_sizes.len();
    let max_w = member_sizes.iter().map(|s| s.0).fold(0.0, f64::max);
    let max_h = member_sizes.iter().map(|s| s.1).fold(0.0, f64::max);

    let (width, height) = if count <= config.small_group_max_tables {
        (
            max_w * 2.0 + config.small_group_padding,
            max_h * 2.0 + config.small_group_padding,
        )
    } else if count <= config.medium_group_max_tables {
        let cells = (count as f64).sqrt().ceil();
        (
            cells * (max_w + config.grid_cell_padding) + config.group_padding * 2.0,
            cells * (max_h + config.grid_cell_padding) + config.group_padding * 2.0,
        )
    } else {
        let area: f64 = member_sizes.iter().map(|(w, h)| w * h).sum::<f64>()
            * config.area_padding_factor;
        let width = (area * config.group_aspect_ratio).sqrt();
        (width, width / config.group_aspect_ratio)
    };

    (
        width.max(config.min_group_width),
        height.max(config.min_group_height),
    )
}

/// Build named, colored and sized groups from connected components.
pub fn build_groups(
    components: Vec<Vec<usize>>,
    tables: &[&TableDescriptor],
    sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Vec<Group> {
    merge_isolated(components, config.merge_isolated)
        .into_iter()
        .enumerate()
        .map(|(index, (members, isolated))| {
            let member_sizes: Vec<(f64, f64)> = members.iter().map(|&m| sizes[m]).collect();
            let (width, height) = group_size(&member_sizes, config);
            Group {
                label: group_label(&members, tables, isolated, config),
                color: config.color(index).to_string(),
                members,
                isolated,
                width,
                height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_puts_isolated_last() {
        let groups = merge_isolated(vec![vec![3], vec![0, 1], vec![2]], true);

        assert_eq!(groups, vec![(vec![0, 1], false), (vec![2, 3], true)]);
    }

    #[test]
    fn test_merge_without_isolated_tables() {
        let groups = merge_isolated(vec![vec![0, 1], vec![2, 3, 4]], true);

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|(_, isolated)| !isolated));
    }

    #[test]
    fn test_merge_disabled_keeps_singletons() {
        let groups = merge_isolated(vec![vec![0], vec![1, 2], vec![3]], false);

        assert_eq!(
            groups,
            vec![(vec![1, 2], false), (vec![0], false), (vec![3], false)]
        );
    }

    #[test]
    fn test_label_uses_shortest_name() {
        let config = LayoutConfig::default();
        let users = TableDescriptor::new("users");
        let orders = TableDescriptor::new("orders");
        let tags = TableDescriptor::new("tags");
        let item = TableDescriptor::new("item");
        let tables = vec![&users, &orders, &tags, &item];

        assert_eq!(group_label(&[0, 1], &tables, false, &config), "users Group");
        assert_eq!(group_label(&[3, 1, 2], &tables, false, &config), "tags Group");
        assert_eq!(group_label(&[0], &tables, true, &config), "Isolated Tables");
    }

    #[test]
    fn test_small_group_floored_at_minimum() {
        let config = LayoutConfig::default();
        let (w, h) = group_size(&[(100.0, 50.0)], &config);

        assert_eq!(w, config.min_group_width);
        assert_eq!(h, config.min_group_height);
    }

    #[test]
    fn test_small_group_doubles_largest_table() {
        let config = LayoutConfig::default();
        let (w, h) = group_size(&[(250.0, 320.0), (250.0, 96.0)], &config);

        assert_eq!(w, 700.0);
        assert_eq!(h, 840.0);
    }

    #[test]
    fn test_medium_group_uses_grid_cells() {
        let config = LayoutConfig::default();
        let sizes = vec![(250.0, 96.0); 5];
        let (w, h) = group_size(&sizes, &config);

        assert_eq!(w, 3.0 * (250.0 + 80.0) + 120.0);
        assert_eq!(h, 3.0 * (96.0 + 80.0) + 120.0);
    }

    #[test]
    fn test_large_group_uses_area_and_aspect() {
        let config = LayoutConfig::default();
        let sizes = vec![(250.0, 320.0); 12];
        let (w, h) = group_size(&sizes, &config);

        let area = 250.0 * 320.0 * 12.0 * 2.5;
        assert!((w * h - area).abs() < 1e-6);
        assert!((w / h - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_larger_tier_gets_more_area() {
        let config = LayoutConfig::default();
        let small = group_size(&vec![(250.0, 200.0); 12], &config);
        let big = group_size(&vec![(250.0, 200.0); 30], &config);

        assert!(big.0 * big.1 > small.0 * small.1);
    }

    #[test]
    fn test_build_groups_colors_by_index() {
        let config = LayoutConfig::default();
        let a = TableDescriptor::new("a").with_foreign_key("b_id", "b", "id");
        let b = TableDescriptor::new("b");
        let c = TableDescriptor::new("c");
        let tables = vec![&a, &b, &c];
        let sizes = vec![(250.0, 40.0); 3];

        let groups = build_groups(vec![vec![0, 1], vec![2]], &tables, &sizes, &config);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].color, config.palette[0]);
        assert_eq!(groups[1].color, config.palette[1]);
        assert!(groups[1].isolated);
        assert_eq!(groups[0].label, "a Group");
    }
}
