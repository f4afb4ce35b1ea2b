//! Cell data model: a single digit in the infinite grid.

use std::fmt;

use crate::coords::GridPos;

/// Number of temper categories a cell can carry.
pub const TEMPER_COUNT: usize = 4;

/// Categorical temper labels. A cell carries at most one at a time; the
/// label decides which bin counter the cell feeds when refined.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temper {
    Woe,
    Frolic,
    Dread,
    Malice,
}

impl Temper {
    pub const ALL: [Temper; TEMPER_COUNT] = [
        Temper::Woe,
        Temper::Frolic,
        Temper::Dread,
        Temper::Malice,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Two-letter code used in persisted progress records.
    pub fn code(self) -> &'static str {
        match self {
            Temper::Woe => "WO",
            Temper::Frolic => "FC",
            Temper::Dread => "DR",
            Temper::Malice => "MA",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WO" => Some(Temper::Woe),
            "FC" => Some(Temper::Frolic),
            "DR" => Some(Temper::Dread),
            "MA" => Some(Temper::Malice),
            _ => None,
        }
    }
}

impl fmt::Display for Temper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single cell of the grid.
///
/// Identity (`pos`) never changes. The digit is stable from first
/// materialisation until the cell is consumed by a transfer and reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub pos: GridPos,
    pub digit: u8,
    pub temper: Option<Temper>,
    pub highlighted: bool,
}

impl Cell {
    pub fn is_tempered(&self) -> bool {
        self.temper.is_some()
    }
}
