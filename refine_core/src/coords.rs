//! Coordinate mapping between the infinite absolute grid and the viewport.
//!
//! Absolute coordinates are a cell's permanent identity and are unbounded in
//! both directions. Relative coordinates describe where a cell sits inside
//! the currently visible window and change whenever the viewport moves.

use std::fmt;

/// Absolute position of a cell in the infinite grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: i64,
    pub col: i64,
}

impl GridPos {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Stable cell identifier in the form `r{row}c{col}`.
    ///
    /// The `r`/`c` markers keep the encoding injective for negative
    /// coordinates (`r-3c-7` parses back to exactly (-3, -7)).
    pub fn cell_id(&self) -> String {
        format!("r{}c{}", self.row, self.col)
    }

    /// Parse a cell identifier produced by [`GridPos::cell_id`].
    pub fn parse_cell_id(id: &str) -> Result<Self, CellIdParseError> {
        let body = id
            .strip_prefix('r')
            .ok_or_else(|| CellIdParseError::MissingMarkers(id.to_string()))?;
        let (row, col) = body
            .split_once('c')
            .ok_or_else(|| CellIdParseError::MissingMarkers(id.to_string()))?;
        let row = row
            .parse::<i64>()
            .map_err(|_| CellIdParseError::InvalidCoordinate(id.to_string()))?;
        let col = col
            .parse::<i64>()
            .map_err(|_| CellIdParseError::InvalidCoordinate(id.to_string()))?;
        Ok(Self { row, col })
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Error raised when a cell identifier does not match the `r{row}c{col}`
/// format. Indicates an integration bug, never a user-reversible condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellIdParseError {
    #[error("cell id `{0}` is missing the r/c markers")]
    MissingMarkers(String),
    #[error("cell id `{0}` carries a non-numeric coordinate")]
    InvalidCoordinate(String),
}

/// Position of a cell relative to the viewport origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPos {
    pub row: i64,
    pub col: i64,
}

impl RelPos {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

/// Top-left origin of the visible window, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub start_row: i64,
    pub start_col: i64,
}

impl Viewport {
    pub const ORIGIN: Viewport = Viewport {
        start_row: 0,
        start_col: 0,
    };

    pub fn to_relative(&self, pos: GridPos) -> RelPos {
        RelPos {
            row: pos.row - self.start_row,
            col: pos.col - self.start_col,
        }
    }

    pub fn to_absolute(&self, rel: RelPos) -> GridPos {
        GridPos {
            row: rel.row + self.start_row,
            col: rel.col + self.start_col,
        }
    }

    pub fn shift(&mut self, direction: Direction, step: i64) {
        let (dr, dc) = direction.delta();
        self.start_row += dr * step;
        self.start_col += dc * step;
    }
}

/// One of the four cardinal pan/spread directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit (row, col) delta for this direction.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// A point in screen pixel space, as reported by the layout collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the grid's on-screen bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridOrigin {
    pub left: f32,
    pub top: f32,
}

impl GridOrigin {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_id_round_trips_negative_coordinates() {
        for (row, col) in [(0, 0), (12, 7), (-3, -7), (-1, 44), (1_000_000, -999_999)] {
            let pos = GridPos::new(row, col);
            let id = pos.cell_id();
            assert_eq!(GridPos::parse_cell_id(&id), Ok(pos), "id was {id}");
        }
    }

    #[test]
    fn cell_id_rejects_malformed_input() {
        assert!(matches!(
            GridPos::parse_cell_id("x3c4"),
            Err(CellIdParseError::MissingMarkers(_))
        ));
        assert!(matches!(
            GridPos::parse_cell_id("r3x4"),
            Err(CellIdParseError::MissingMarkers(_))
        ));
        assert!(matches!(
            GridPos::parse_cell_id("r3c4.5"),
            Err(CellIdParseError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            GridPos::parse_cell_id("rc"),
            Err(CellIdParseError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn relative_and_absolute_are_inverses() {
        let viewport = Viewport {
            start_row: -5,
            start_col: 9,
        };
        let pos = GridPos::new(3, -2);
        let rel = viewport.to_relative(pos);
        assert_eq!(rel, RelPos::new(8, -11));
        assert_eq!(viewport.to_absolute(rel), pos);
    }

    #[test]
    fn viewport_shift_moves_one_axis_only() {
        let mut viewport = Viewport::ORIGIN;
        viewport.shift(Direction::Right, 1);
        assert_eq!(viewport.start_col, 1);
        assert_eq!(viewport.start_row, 0);
        viewport.shift(Direction::Up, 2);
        assert_eq!(viewport.start_row, -2);
        assert_eq!(viewport.start_col, 1);
    }
}
