//! Group placement on the canvas.

use super::groups::Group;
use super::types::Rect;

/// Number of group columns for `count` groups.
pub fn grid_columns(count: usize) -> usize {
    match count {
        0..=2 => count.max(1),
        3..=4 => 2,
        _ => ((count as f64).sqrt().ceil() as usize).min(3),
    }
}

/// Place groups row-major. Each row is as tall as its tallest group, so no two
/// boxes can intersect. Returns the group boxes and the canvas extent.
pub fn place_groups(
    groups: &[Group],
    margin: f64,
    gap_x: f64,
    gap_y: f64,
) -> (Vec<Rect>, f64, f64) {
    if groups.is_empty() {
        return (Vec::new(), 0.0, 0.0);
    }

    let cols = grid_columns(groups.len());
    let mut rects = Vec::with_capacity(groups.len());
    let mut y = margin;
    let mut max_right: f64 = 0.0;
    let mut bottom: f64 = 0.0;

    for row in groups.chunks(cols) {
        let mut x = margin;
        let mut row_height: f64 = 0.0;

        for group in row {
            rects.push(Rect {
                x,
                y,
                width: group.width,
                height: group.height,
            });
            max_right = max_right.max(x + group.width);
            x += group.width + gap_x;
            row_height = row_height.max(group.height);
        }

        bottom = y + row_height;
        y += row_height + gap_y;
    }

    (rects, max_right + margin, bottom + margin)
}
