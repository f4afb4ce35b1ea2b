//! Grid state store: the authoritative visible window over the infinite
//! grid.
//!
//! The store owns the cell cache and the viewport. The visible set is a list
//! of absolute coordinates; cell state is always read and written through
//! the cache key, so projections handed to callers can never drift from the
//! owned cells.

use rand::rngs::SmallRng;

use crate::cache::CellCache;
use crate::cell::{Cell, Temper};
use crate::coords::{Direction, GridPos, RelPos, SurfaceSize, Viewport};

/// Error raised when a caller explicitly requests a cell the store does not
/// currently hold. Neighbourhood scans should bounds-check instead of
/// relying on this.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("relative position ({row}, {col}) is outside the visible window")]
    OutOfView { row: i64, col: i64 },
}

#[derive(Debug, Default)]
pub struct GridStore {
    cache: CellCache,
    viewport: Viewport,
    visible: Vec<GridPos>,
    visible_rows: i64,
    visible_cols: i64,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn visible_rows(&self) -> i64 {
        self.visible_rows
    }

    pub fn visible_cols(&self) -> i64 {
        self.visible_cols
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Rebuild the visible set for the given surface dimensions.
    ///
    /// Row/col counts are the ceiling of surface extent over cell size, so a
    /// partially covered trailing row still materialises. This is the only
    /// operation that changes the size of the visible set and must run after
    /// every viewport move or layout change.
    pub fn regenerate(&mut self, surface: SurfaceSize, cell_size_px: f32, rng: &mut SmallRng) {
        self.visible_rows = cells_to_cover(surface.height, cell_size_px);
        self.visible_cols = cells_to_cover(surface.width, cell_size_px);

        self.visible.clear();
        for row in 0..self.visible_rows {
            for col in 0..self.visible_cols {
                let pos = GridPos::new(
                    self.viewport.start_row + row,
                    self.viewport.start_col + col,
                );
                self.cache.get_or_create(pos, rng);
                self.visible.push(pos);
            }
        }
    }

    /// Move the viewport origin by a fixed step. Callers regenerate
    /// afterwards; the in-flight transfer guard lives with the session,
    /// which is the only caller.
    pub fn shift_viewport(&mut self, direction: Direction, step: i64) {
        self.viewport.shift(direction, step);
    }

    pub fn contains_relative(&self, rel: RelPos) -> bool {
        rel.row >= 0 && rel.row < self.visible_rows && rel.col >= 0 && rel.col < self.visible_cols
    }

    /// Iterate the visible cells with their viewport-relative positions.
    pub fn visible_cells(&self) -> impl Iterator<Item = (RelPos, &Cell)> {
        self.visible
            .iter()
            .filter_map(|&pos| self.cache.get(pos).map(|c| (self.viewport.to_relative(pos), c)))
    }

    /// Cell lookup by explicit relative position. Out-of-window lookups are
    /// an error here because the caller named a specific cell.
    pub fn cell_at_relative(&self, rel: RelPos) -> Result<&Cell, GridError> {
        if !self.contains_relative(rel) {
            return Err(GridError::OutOfView {
                row: rel.row,
                col: rel.col,
            });
        }
        let pos = self.viewport.to_absolute(rel);
        self.cache.get(pos).ok_or(GridError::OutOfView {
            row: rel.row,
            col: rel.col,
        })
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.cache.get(pos)
    }

    pub fn set_temper(&mut self, rel: RelPos, temper: Temper) -> Result<(), GridError> {
        self.with_cell_at(rel, |cell| cell.temper = Some(temper))
    }

    pub fn clear_temper(&mut self, rel: RelPos) -> Result<(), GridError> {
        self.with_cell_at(rel, |cell| cell.temper = None)
    }

    fn with_cell_at(
        &mut self,
        rel: RelPos,
        mutate: impl FnOnce(&mut Cell),
    ) -> Result<(), GridError> {
        if !self.contains_relative(rel) {
            return Err(GridError::OutOfView {
                row: rel.row,
                col: rel.col,
            });
        }
        let pos = self.viewport.to_absolute(rel);
        match self.cache.get_mut(pos) {
            Some(cell) => {
                mutate(cell);
                Ok(())
            }
            None => Err(GridError::OutOfView {
                row: rel.row,
                col: rel.col,
            }),
        }
    }

    /// Replace the highlight set wholesale: exactly the cells in `set` end
    /// up highlighted, every other visible cell does not. Returns whether
    /// any cell actually changed.
    pub fn apply_highlight(&mut self, set: &[GridPos]) -> bool {
        let mut changed = false;
        for idx in 0..self.visible.len() {
            let pos = self.visible[idx];
            let should = set.contains(&pos);
            if let Some(cell) = self.cache.get_mut(pos) {
                if cell.highlighted != should {
                    cell.highlighted = should;
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn nth_visible(&self, idx: usize) -> Option<GridPos> {
        self.visible.get(idx).copied()
    }

    /// Fraction of visible cells currently carrying a temper.
    pub fn tempered_fraction(&self) -> f32 {
        if self.visible.is_empty() {
            return 0.0;
        }
        let tempered = self
            .visible
            .iter()
            .filter(|&&pos| self.cache.get(pos).is_some_and(|c| c.is_tempered()))
            .count();
        tempered as f32 / self.visible.len() as f32
    }

    /// Currently highlighted visible cells in stable transfer order:
    /// relative column first, then relative row.
    pub fn highlighted_sorted(&self) -> Vec<GridPos> {
        let mut cells: Vec<GridPos> = self
            .visible
            .iter()
            .copied()
            .filter(|&pos| self.cache.get(pos).is_some_and(|c| c.highlighted))
            .collect();
        cells.sort_by_key(|&pos| {
            let rel = self.viewport.to_relative(pos);
            (rel.col, rel.row)
        });
        cells
    }

    /// Reset a consumed cell to a fresh digit with temper and highlight
    /// cleared.
    pub fn reset_cell(&mut self, pos: GridPos, rng: &mut SmallRng) {
        self.cache.invalidate(pos, rng);
    }
}

fn cells_to_cover(extent_px: f32, cell_size_px: f32) -> i64 {
    if extent_px <= 0.0 || cell_size_px <= 0.0 {
        return 0;
    }
    (extent_px / cell_size_px).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grid_3x3() -> (GridStore, SmallRng) {
        let mut grid = GridStore::new();
        let mut rng = SmallRng::seed_from_u64(11);
        grid.regenerate(SurfaceSize::new(150.0, 150.0), 50.0, &mut rng);
        (grid, rng)
    }

    #[test]
    fn regenerate_covers_the_viewport_rectangle() {
        let (grid, _) = grid_3x3();
        assert_eq!(grid.visible_rows(), 3);
        assert_eq!(grid.visible_cols(), 3);
        assert_eq!(grid.visible_len(), 9);

        let viewport = grid.viewport();
        for (rel, cell) in grid.visible_cells() {
            assert!(grid.contains_relative(rel));
            assert!(cell.pos.row >= viewport.start_row);
            assert!(cell.pos.row < viewport.start_row + grid.visible_rows());
            assert!(cell.pos.col >= viewport.start_col);
            assert!(cell.pos.col < viewport.start_col + grid.visible_cols());
        }
    }

    #[test]
    fn regenerate_rounds_partial_cells_up() {
        let mut grid = GridStore::new();
        let mut rng = SmallRng::seed_from_u64(2);
        grid.regenerate(SurfaceSize::new(101.0, 49.0), 50.0, &mut rng);
        assert_eq!(grid.visible_cols(), 3);
        assert_eq!(grid.visible_rows(), 1);
    }

    #[test]
    fn moving_right_keeps_previously_seen_digits() {
        let (mut grid, mut rng) = grid_3x3();
        let target = GridPos::new(0, 1);
        let digit_before = grid.cell(target).expect("visible cell").digit;

        grid.shift_viewport(Direction::Right, 1);
        grid.regenerate(SurfaceSize::new(150.0, 150.0), 50.0, &mut rng);

        assert_eq!(grid.viewport().start_col, 1);
        let cell = grid
            .cell_at_relative(RelPos::new(0, 0))
            .expect("cell now at relative origin");
        assert_eq!(cell.pos, target);
        assert_eq!(cell.digit, digit_before);
    }

    #[test]
    fn cell_at_relative_errors_outside_the_window() {
        let (grid, _) = grid_3x3();
        assert!(matches!(
            grid.cell_at_relative(RelPos::new(3, 0)),
            Err(GridError::OutOfView { row: 3, col: 0 })
        ));
        assert!(matches!(
            grid.cell_at_relative(RelPos::new(0, -1)),
            Err(GridError::OutOfView { .. })
        ));
    }

    #[test]
    fn apply_highlight_is_a_full_replace() {
        let (mut grid, _) = grid_3x3();
        let a = GridPos::new(0, 0);
        let b = GridPos::new(2, 2);

        assert!(grid.apply_highlight(&[a, b]));
        assert_eq!(grid.highlighted_sorted(), vec![a, b]);

        // Replacing with a different set clears the old members.
        assert!(grid.apply_highlight(&[b]));
        assert_eq!(grid.highlighted_sorted(), vec![b]);

        // Same set again: no change.
        assert!(!grid.apply_highlight(&[b]));
    }

    #[test]
    fn highlighted_sorted_orders_by_column_then_row() {
        let (mut grid, _) = grid_3x3();
        let cells = [
            GridPos::new(2, 1),
            GridPos::new(0, 2),
            GridPos::new(1, 0),
            GridPos::new(0, 1),
        ];
        grid.apply_highlight(&cells);
        assert_eq!(
            grid.highlighted_sorted(),
            vec![
                GridPos::new(1, 0),
                GridPos::new(0, 1),
                GridPos::new(2, 1),
                GridPos::new(0, 2),
            ]
        );
    }

    #[test]
    fn tempered_fraction_tracks_set_and_clear() {
        let (mut grid, _) = grid_3x3();
        assert_eq!(grid.tempered_fraction(), 0.0);

        grid.set_temper(RelPos::new(1, 1), Temper::Woe).unwrap();
        grid.set_temper(RelPos::new(0, 0), Temper::Frolic).unwrap();
        assert!((grid.tempered_fraction() - 2.0 / 9.0).abs() < 1e-6);

        grid.clear_temper(RelPos::new(0, 0)).unwrap();
        assert!((grid.tempered_fraction() - 1.0 / 9.0).abs() < 1e-6);
    }
}
