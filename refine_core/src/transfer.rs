//! Transfer bookkeeping for the assignment protocol.
//!
//! The ledger tracks which bins and cells are mid-transfer so that two
//! overlapping assignment requests can never both commit, and so viewport
//! moves can be refused while a transfer is settling.

use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use crate::bins::BinId;
use crate::cell::TEMPER_COUNT;
use crate::coords::GridPos;

/// Why an assignment request was turned down. Rejections are outcomes, not
/// errors: no state is mutated and the session surfaces them as a denial
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// All four counters of the target bin already sit at 1.
    BinFull,
    /// The target bin has a transfer in flight.
    BinBusy,
    /// No visible cell is highlighted.
    NothingHighlighted,
    /// Highlighted cells exist but none carries a temper.
    NoTemperedCells,
    /// A highlighted cell is mid-transfer to another bin.
    CellsContested,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::BinFull => "bin is already full",
            RejectReason::BinBusy => "bin has a transfer in flight",
            RejectReason::NothingHighlighted => "no cells are highlighted",
            RejectReason::NoTemperedCells => "highlighted cells carry no temper",
            RejectReason::CellsContested => "cells are mid-transfer to another bin",
        };
        write!(f, "{text}")
    }
}

/// Result of an assignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Committed(TransferReceipt),
    Rejected(RejectReason),
}

/// What a committed transfer consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub bin: BinId,
    pub cells: usize,
    /// Consumed cells per temper category, indexed by `Temper::index()`.
    pub tallies: [usize; TEMPER_COUNT],
}

/// A committed transfer waiting out its logical latency window.
///
/// Two phases: at `settle_at` the consumed cells are reset and their
/// in-flight markers released; at `release_at` the bin itself is freed.
#[derive(Debug, Clone)]
pub struct PendingTransfer {
    pub bin: BinId,
    pub cells: Vec<GridPos>,
    pub settle_at: Instant,
    pub release_at: Instant,
    pub settled: bool,
}

/// In-flight markers for bins and cells.
///
/// Additions happen synchronously at the commit point, before any
/// interleaving is possible; removals are owned by the session's transfer
/// settlement (including the teardown flush), so markers cannot stick.
#[derive(Debug, Default)]
pub struct TransferLedger {
    busy_bins: HashSet<BinId>,
    cells_in_flight: HashSet<GridPos>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bin_busy(&self, bin: BinId) -> bool {
        self.busy_bins.contains(&bin)
    }

    pub fn any_bin_busy(&self) -> bool {
        !self.busy_bins.is_empty()
    }

    pub fn mark_bin(&mut self, bin: BinId) {
        self.busy_bins.insert(bin);
    }

    pub fn release_bin(&mut self, bin: BinId) {
        self.busy_bins.remove(&bin);
    }

    pub fn is_cell_in_flight(&self, pos: GridPos) -> bool {
        self.cells_in_flight.contains(&pos)
    }

    pub fn any_cell_contested<'a>(&self, cells: impl IntoIterator<Item = &'a GridPos>) -> bool {
        cells
            .into_iter()
            .any(|pos| self.cells_in_flight.contains(pos))
    }

    pub fn mark_cells(&mut self, cells: &[GridPos]) {
        self.cells_in_flight.extend(cells.iter().copied());
    }

    pub fn release_cells(&mut self, cells: &[GridPos]) {
        for pos in cells {
            self.cells_in_flight.remove(pos);
        }
    }

    pub fn in_flight_cell_count(&self) -> usize {
        self.cells_in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_tracks_bins_and_cells_independently() {
        let mut ledger = TransferLedger::new();
        assert!(!ledger.any_bin_busy());

        ledger.mark_bin(BinId(2));
        assert!(ledger.is_bin_busy(BinId(2)));
        assert!(!ledger.is_bin_busy(BinId(0)));
        assert!(ledger.any_bin_busy());

        let cells = vec![GridPos::new(0, 0), GridPos::new(-1, 4)];
        ledger.mark_cells(&cells);
        assert!(ledger.is_cell_in_flight(GridPos::new(-1, 4)));
        assert!(ledger.any_cell_contested(cells.iter()));
        assert!(!ledger.any_cell_contested([GridPos::new(5, 5)].iter()));

        ledger.release_cells(&cells);
        assert_eq!(ledger.in_flight_cell_count(), 0);
        ledger.release_bin(BinId(2));
        assert!(!ledger.any_bin_busy());
    }
}
