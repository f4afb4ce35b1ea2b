//! Pointer-proximity highlighting.
//!
//! Given a focal point in pixel space, marks every visible cell whose center
//! lies within the influence radius. The result fully replaces the previous
//! highlight set, so repeated calls with an unchanged focal point are
//! idempotent.

use crate::coords::{GridOrigin, GridPos, PixelPoint, RelPos};
use crate::grid::GridStore;

/// Compute the visible cells within `radius_px` of the focal point.
///
/// Scans a square neighbourhood of `ceil(radius / cell_size)` cells around
/// the focal cell and keeps the ones whose pixel-space center passes the
/// Euclidean test. Candidates outside the visible window are skipped
/// silently; the neighbourhood routinely extends past what is materialised.
pub fn cells_within_radius(
    grid: &GridStore,
    focal: PixelPoint,
    radius_px: f32,
    origin: GridOrigin,
    cell_size_px: f32,
) -> Vec<GridPos> {
    if cell_size_px <= 0.0 || radius_px < 0.0 {
        return Vec::new();
    }

    let focal_row = ((focal.y - origin.top) / cell_size_px).floor() as i64;
    let focal_col = ((focal.x - origin.left) / cell_size_px).floor() as i64;
    let radius_cells = (radius_px / cell_size_px).ceil() as i64;

    let mut hits = Vec::new();
    for row in (focal_row - radius_cells)..=(focal_row + radius_cells) {
        for col in (focal_col - radius_cells)..=(focal_col + radius_cells) {
            let rel = RelPos::new(row, col);
            if !grid.contains_relative(rel) {
                continue;
            }

            let center_x = origin.left + (col as f32 + 0.5) * cell_size_px;
            let center_y = origin.top + (row as f32 + 0.5) * cell_size_px;
            let dx = focal.x - center_x;
            let dy = focal.y - center_y;
            if (dx * dx + dy * dy).sqrt() <= radius_px {
                hits.push(grid.viewport().to_absolute(rel));
            }
        }
    }
    hits
}

/// Highlight exactly the cells within radius of the focal point, clearing
/// every other visible cell. Returns whether the highlight set changed.
pub fn highlight_around(
    grid: &mut GridStore,
    focal: PixelPoint,
    radius_px: f32,
    origin: GridOrigin,
    cell_size_px: f32,
) -> bool {
    let hits = cells_within_radius(grid, focal, radius_px, origin, cell_size_px);
    grid.apply_highlight(&hits)
}
