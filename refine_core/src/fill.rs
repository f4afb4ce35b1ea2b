//! Fixed-point fill fraction for bin counters.
//!
//! Counters advance in increments of cell-count / 100, so a fixed-point
//! representation with 4 decimal places keeps every reachable value exact:
//! 0.98 + 0.05 saturates to exactly 1.0, never 1.03 and never 0.9999999.

use std::fmt;
use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// A fill fraction clamped to [0, 1], stored as `value * 10_000`.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Fill(i64);

impl Fill {
    pub const SCALE: i64 = 10_000;
    pub const ZERO: Fill = Fill(0);
    pub const ONE: Fill = Fill(Self::SCALE);

    /// Nearest representable fill, clamped into [0, 1].
    pub fn from_f32(value: f32) -> Self {
        let raw = (value * Self::SCALE as f32).round() as i64;
        Fill(raw.clamp(0, Self::SCALE))
    }

    /// The increment contributed by `count` cells of one temper: count/100.
    pub fn from_count_per_cent(count: usize) -> Self {
        let raw = (count as i64).saturating_mul(Self::SCALE / 100);
        Fill(raw.clamp(0, Self::SCALE))
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    /// Add without ever leaving [0, 1].
    pub fn saturating_add(self, rhs: Fill) -> Fill {
        Fill((self.0 + rhs.0).clamp(0, Self::SCALE))
    }

    pub fn is_full(self) -> bool {
        self.0 == Self::SCALE
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Sum for Fill {
    /// Unclamped accumulation is intentional here; sums above 1 are only
    /// meaningful as progress numerators, read back via [`Fill::raw`].
    fn sum<I: Iterator<Item = Fill>>(iter: I) -> Fill {
        Fill(iter.map(|f| f.0).sum())
    }
}

impl fmt::Debug for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.to_f32() * 100.0)
    }
}
