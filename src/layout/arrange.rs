//! Table placement inside a group.
//!
//! Positions are relative to the group's top-left corner.

use std::f64::consts::PI;

use crate::config::LayoutConfig;

use super::groups::Group;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Row-major flow for the merged group of unrelated tables.
    IsolatedGrid,
    Centered,
    /// Equal angular spacing around the group center.
    Circular,
    /// Uniform cells, one table centered in each.
    Grid,
}

impl Strategy {
    pub fn for_group(group: &Group, config: &LayoutConfig) -> Self {
        if group.isolated {
            return Strategy::IsolatedGrid;
        }
        match group.members.len() {
            0 | 1 => Strategy::Centered,
            n if n <= config.circular_max_tables => Strategy::Circular,
            _ => Strategy::Grid,
        }
    }
}

/// Compute relative top-left positions for `sizes` within a `width` x `height` box.
pub fn arrange(
    strategy: Strategy,
    width: f64,
    height: f64,
    sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Vec<(f64, f64)> {
    if sizes.is_empty() {
        return Vec::new();
    }
    match strategy {
        Strategy::IsolatedGrid => isolated_grid(width, sizes, config),
        Strategy::Centered => sizes
            .iter()
            .map(|&(w, h)| ((width - w) / 2.0, (height - h) / 2.0))
            .collect(),
        Strategy::Circular => circular(width, height, sizes, config),
        Strategy::Grid => grid(width, height, sizes, config),
    }
}

fn isolated_grid(width: f64, sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<(f64, f64)> {
    let pad = config.group_padding;
    let gap = config.isolated_table_gap;
    let avg_w = sizes.iter().map(|s| s.0).sum::<f64>() / sizes.len() as f64;
    let max_w = sizes.iter().map(|s| s.0).fold(0.0, f64::max);

    let fit = ((width - pad * 2.0 + gap) / (avg_w + gap)).floor();
    let cols = (fit.max(1.0) as usize).min(sizes.len());

    let mut positions = Vec::with_capacity(sizes.len());
    let mut y = pad;
    for row in sizes.chunks(cols) {
        let mut row_height: f64 = 0.0;
        for (col, &(_, h)) in row.iter().enumerate() {
            positions.push((pad + col as f64 * (max_w + gap), y));
            row_height = row_height.max(h);
        }
        y += row_height + gap;
    }
    positions
}

fn circular(
    width: f64,
    height: f64,
    sizes: &[(f64, f64)],
    config: &LayoutConfig,
) -> Vec<(f64, f64)> {
    let pad = config.group_padding;
    let count = sizes.len() as f64;
    let step = 2.0 * PI / count;

    // Neighbouring centers must be a full table diagonal (plus clearance) apart
    let (max_w, max_h) = largest(sizes);
    let chord = max_w.hypot(max_h) + config.grid_cell_padding;
    let mut radius = width.min(height) / config.circular_radius_divisor;
    if sizes.len() > 1 {
        radius = radius.max(chord / (2.0 * (step / 2.0).sin()));
    }

    let cx = width / 2.0;
    let cy = height / 2.0;
    let ring: Vec<(f64, f64)> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            // Start at twelve o'clock
            let angle = -PI / 2.0 + step * i as f64;
            (cx + radius * angle.cos() - w / 2.0, cy + radius * angle.sin() - h / 2.0)
        })
        .collect();

    // Shift the whole ring past the top-left padding; fit_group covers the far sides
    let min_x = ring.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let min_y = ring.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let dx = (pad - min_x).max(0.0);
    let dy = (pad - min_y).max(0.0);
    ring.into_iter().map(|(x, y)| (x + dx, y + dy)).collect()
}

fn grid(width: f64, height: f64, sizes: &[(f64, f64)], config: &LayoutConfig) -> Vec<(f64, f64)> {
    let pad = config.group_padding;
    let count = sizes.len();
    let aspect = width / height;
    let cols = ((count as f64 * aspect).sqrt().ceil() as usize).clamp(1, count);
    let rows = count.div_ceil(cols);

    let (max_w, max_h) = largest(sizes);
    let cell_w = ((width - pad * 2.0) / cols as f64).max(max_w + config.grid_cell_padding);
    let cell_h = ((height - pad * 2.0) / rows as f64).max(max_h + config.grid_cell_padding);

    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            (
                pad + col * cell_w + (cell_w - w) / 2.0,
                pad + row * cell_h + (cell_h - h) / 2.0,
            )
        })
        .collect()
}

fn largest(sizes: &[(f64, f64)]) -> (f64, f64) {
    sizes
        .iter()
        .fold((0.0, 0.0), |(mw, mh), &(w, h)| (f64::max(mw, w), f64::max(mh, h)))
}

/// Grow (never shrink) the group so every placed table plus padding fits.
pub fn fit_group(group: &mut Group, positions: &[(f64, f64)], sizes: &[(f64, f64)], pad: f64) {
    for (&(x, y), &(w, h)) in positions.iter().zip(sizes) {
        group.width = group.width.max(x + w + pad);
        group.height = group.height.max(y + h + pad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(count: usize, isolated: bool) -> Group {
        Group {
            members: (0..count).collect(),
            isolated,
            label: String::new(),
            color: String::new(),
            width: 800.0,
            height: 600.0,
        }
    }

    fn overlaps(a: (f64, f64), b: (f64, f64), size: (f64, f64)) -> bool {
        a.0 < b.0 + size.0 && b.0 < a.0 + size.0 && a.1 < b.1 + size.1 && b.1 < a.1 + size.1
    }

    #[test]
    fn test_strategy_selection() {
        let config = LayoutConfig::default();

        assert_eq!(Strategy::for_group(&group(12, true), &config), Strategy::IsolatedGrid);
        assert_eq!(Strategy::for_group(&group(1, true), &config), Strategy::IsolatedGrid);
        assert_eq!(Strategy::for_group(&group(1, false), &config), Strategy::Centered);
        assert_eq!(Strategy::for_group(&group(2, false), &config), Strategy::Circular);
        assert_eq!(Strategy::for_group(&group(8, false), &config), Strategy::Circular);
        assert_eq!(Strategy::for_group(&group(9, false), &config), Strategy::Grid);
    }

    #[test]
    fn test_centered() {
        let config = LayoutConfig::default();
        let positions = arrange(Strategy::Centered, 500.0, 400.0, &[(250.0, 100.0)], &config);

        assert_eq!(positions, vec![(125.0, 150.0)]);
    }

    fn assert_disjoint(positions: &[(f64, f64)], sizes: &[(f64, f64)]) {
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let (a, b) = (positions[i], positions[j]);
                let (sa, sb) = (sizes[i], sizes[j]);
                let hit = a.0 < b.0 + sb.0 && b.0 < a.0 + sa.0 && a.1 < b.1 + sb.1 && b.1 < a.1 + sa.1;
                assert!(!hit, "tables {} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn test_circular_first_table_on_top() {
        let config = LayoutConfig::default();
        let sizes = vec![(100.0, 50.0); 4];
        let positions = arrange(Strategy::Circular, 1000.0, 1000.0, &sizes, &config);

        // radius 400; the ring moves 10 right so the left table clears the padding
        assert!((positions[0].0 - 460.0).abs() < 1e-9);
        assert!((positions[0].1 - 75.0).abs() < 1e-9);
        // third table directly below
        assert!((positions[2].0 - 460.0).abs() < 1e-9);
        assert!(positions[2].1 > positions[0].1);
    }

    #[test]
    fn test_circular_stays_inside_padding() {
        let config = LayoutConfig::default();
        let sizes = vec![(250.0, 320.0); 4];
        let mut g = group(4, false);
        (g.width, g.height) = (700.0, 840.0);
        let positions = arrange(Strategy::Circular, g.width, g.height, &sizes, &config);
        fit_group(&mut g, &positions, &sizes, config.group_padding);

        for &(x, y) in &positions {
            assert!(x >= config.group_padding);
            assert!(y >= config.group_padding);
            assert!(x + 250.0 <= g.width - config.group_padding + 1e-9);
            assert!(y + 320.0 <= g.height - config.group_padding + 1e-9);
        }
        assert_disjoint(&positions, &sizes);
    }

    #[test]
    fn test_circular_spreads_small_tables() {
        let config = LayoutConfig::default();
        // eight 3-column tables in a medium-tier box; min(w, h) / 2.5 alone spaces them 224 apart
        let sizes = vec![(250.0, 124.0); 8];
        let positions = arrange(Strategy::Circular, 1110.0, 732.0, &sizes, &config);

        assert_disjoint(&positions, &sizes);
    }

    #[test]
    fn test_grid_cells_grow_for_tall_tables() {
        let config = LayoutConfig::default();
        let sizes = vec![(250.0, 880.0); 9];
        let positions = arrange(Strategy::Grid, 1110.0, 1110.0, &sizes, &config);

        assert_disjoint(&positions, &sizes);
        assert!(positions.iter().all(|&(x, y)| x >= 60.0 && y >= 60.0));
    }

    #[test]
    fn test_grid_cells_do_not_overlap() {
        let config = LayoutConfig::default();
        let size = (250.0, 120.0);
        let sizes = vec![size; 12];
        let positions = arrange(Strategy::Grid, 1800.0, 1350.0, &sizes, &config);

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(!overlaps(positions[i], positions[j], size));
            }
        }
    }

    #[test]
    fn test_isolated_grid_rows() {
        let config = LayoutConfig::default();
        let sizes = vec![(250.0, 100.0), (250.0, 200.0), (250.0, 100.0)];
        // room for two columns
        let positions = arrange(Strategy::IsolatedGrid, 700.0, 500.0, &sizes, &config);

        assert_eq!(positions[0], (60.0, 60.0));
        assert_eq!(positions[1], (350.0, 60.0));
        assert_eq!(positions[2], (60.0, 60.0 + 200.0 + 40.0));
    }

    #[test]
    fn test_fit_group_grows_only() {
        let config = LayoutConfig::default();
        let mut g = group(1, false);
        fit_group(&mut g, &[(60.0, 60.0)], &[(100.0, 100.0)], config.group_padding);
        assert_eq!((g.width, g.height), (800.0, 600.0));

        fit_group(&mut g, &[(60.0, 560.0)], &[(100.0, 100.0)], config.group_padding);
        assert_eq!(g.height, 720.0);
    }
}
