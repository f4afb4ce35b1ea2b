//! The session aggregate: one refinement workstation session.
//!
//! Owns the grid store, temper engine, bin roster, transfer ledger and
//! observer hub, and exposes the command surface the rendering shell drives.
//! Construction is explicit and session-scoped; there is no global instance.
//!
//! Scheduling is cooperative: the shell calls [`RefinementSession::advance`]
//! with the current clock, which fires due temper events, settles committed
//! transfers and runs the periodic progress save.

use std::time::Instant;

use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info};

use crate::bins::{Bin, BinId, BinRoster};
use crate::cell::{Temper, TEMPER_COUNT};
use crate::config::SessionConfig;
use crate::coords::{Direction, GridOrigin, PixelPoint, RelPos, SurfaceSize, Viewport};
use crate::events::{EventHub, SessionEvent};
use crate::fill::Fill;
use crate::grid::{GridError, GridStore};
use crate::highlight;
use crate::metrics::SessionMetrics;
use crate::progress::{ProgressSaver, ProgressStore};
use crate::temper::TemperEngine;
use crate::transfer::{
    AssignOutcome, PendingTransfer, RejectReason, TransferLedger, TransferReceipt,
};

/// Integration bugs surfaced by the session API. Validation rejections are
/// not errors; see [`AssignOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("bin {0} is not part of this session")]
    UnknownBin(BinId),
}

pub struct RefinementSession {
    config: SessionConfig,
    grid: GridStore,
    temper: TemperEngine,
    bins: BinRoster,
    ledger: TransferLedger,
    pending: Vec<PendingTransfer>,
    events: EventHub,
    saver: ProgressSaver,
    metrics: SessionMetrics,
    surface: SurfaceSize,
    rng: SmallRng,
}

impl RefinementSession {
    pub fn new(
        file_id: &str,
        config: SessionConfig,
        store: Box<dyn ProgressStore>,
        now: Instant,
    ) -> Self {
        Self::with_rng(file_id, config, store, now, SmallRng::from_entropy())
    }

    /// Deterministic session for replay and tests.
    pub fn with_seed(
        file_id: &str,
        config: SessionConfig,
        store: Box<dyn ProgressStore>,
        now: Instant,
        seed: u64,
    ) -> Self {
        Self::with_rng(file_id, config, store, now, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        file_id: &str,
        config: SessionConfig,
        store: Box<dyn ProgressStore>,
        now: Instant,
        rng: SmallRng,
    ) -> Self {
        let mut bins = BinRoster::new(config.bin_count);
        let mut saver = ProgressSaver::new(file_id, store, config.save_interval);
        saver.restore(&mut bins);
        saver.schedule(now);

        let mut temper = TemperEngine::new(config.temper);
        temper.start(now);

        info!(file_id, bins = bins.len(), "refinement session opened");
        Self {
            config,
            grid: GridStore::new(),
            temper,
            bins,
            ledger: TransferLedger::new(),
            pending: Vec::new(),
            events: EventHub::new(),
            saver,
            metrics: SessionMetrics::default(),
            surface: SurfaceSize::default(),
            rng,
        }
    }

    // ----- queries ------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn viewport(&self) -> Viewport {
        self.grid.viewport()
    }

    pub fn bins(&self) -> &BinRoster {
        &self.bins
    }

    pub fn bin(&self, id: BinId) -> Option<&Bin> {
        self.bins.get(id)
    }

    pub fn progress(&self) -> f32 {
        self.bins.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.bins.is_complete()
    }

    pub fn metrics(&self) -> SessionMetrics {
        self.metrics
    }

    pub fn pending_transfers(&self) -> usize {
        self.pending.len()
    }

    /// Observer hub; subscribe for redraw and notification signals.
    pub fn events(&mut self) -> &mut EventHub {
        &mut self.events
    }

    // ----- commands -----------------------------------------------------

    /// Rebuild the visible window for the given surface dimensions. Must be
    /// called once at startup and again on every layout change.
    pub fn regenerate(&mut self, surface: SurfaceSize) {
        self.surface = surface;
        self.grid
            .regenerate(surface, self.config.cell_size_px, &mut self.rng);
        self.events.broadcast(&SessionEvent::GridChanged);
    }

    /// Pan the viewport one step. Refused while any transfer is in flight,
    /// so cells cannot be moved out from under a settling transfer. Returns
    /// whether the move happened.
    pub fn move_viewport(&mut self, direction: Direction) -> bool {
        if self.ledger.any_bin_busy() {
            debug!(%direction, "viewport move refused: transfer in flight");
            return false;
        }
        self.grid
            .shift_viewport(direction, self.config.navigation_step);
        self.grid
            .regenerate(self.surface, self.config.cell_size_px, &mut self.rng);
        let viewport = self.grid.viewport();
        self.events
            .broadcast(&SessionEvent::ViewportMoved { viewport });
        self.events.broadcast(&SessionEvent::GridChanged);
        true
    }

    /// Highlight every visible cell within `radius_px` of the focal point,
    /// replacing the previous highlight set.
    pub fn highlight_around(&mut self, focal: PixelPoint, radius_px: f32, origin: GridOrigin) {
        let changed = highlight::highlight_around(
            &mut self.grid,
            focal,
            radius_px,
            origin,
            self.config.cell_size_px,
        );
        if changed {
            self.events.broadcast(&SessionEvent::GridChanged);
        }
    }

    /// Write a temper label through to the cell at a visible position.
    pub fn set_temper(&mut self, rel: RelPos, temper: Temper) -> Result<(), GridError> {
        self.grid.set_temper(rel, temper)
    }

    pub fn clear_temper(&mut self, rel: RelPos) -> Result<(), GridError> {
        self.grid.clear_temper(rel)
    }

    pub fn stop_temper_events(&mut self) {
        self.temper.stop();
    }

    pub fn start_temper_events(&mut self, now: Instant) {
        self.temper.start(now);
    }

    /// Assign the currently highlighted cells to a bin.
    ///
    /// Validation happens in full before any mutation; every rejection
    /// leaves the grid and bins untouched and is surfaced as a
    /// [`SessionEvent::TransferRejected`]. A committed transfer increments
    /// the bin counters immediately and schedules the cell reset and bin
    /// release behind the logical latency window.
    pub fn assign(&mut self, bin_id: BinId, now: Instant) -> Result<AssignOutcome, SessionError> {
        let Some(target) = self.bins.get(bin_id) else {
            return Err(SessionError::UnknownBin(bin_id));
        };

        if target.metrics.is_full() {
            return Ok(self.reject(bin_id, RejectReason::BinFull));
        }
        if self.ledger.is_bin_busy(bin_id) {
            return Ok(self.reject(bin_id, RejectReason::BinBusy));
        }

        let cells = self.grid.highlighted_sorted();
        if cells.is_empty() {
            return Ok(self.reject(bin_id, RejectReason::NothingHighlighted));
        }

        let mut tallies = [0usize; TEMPER_COUNT];
        for &pos in &cells {
            if let Some(temper) = self.grid.cell(pos).and_then(|cell| cell.temper) {
                tallies[temper.index()] += 1;
            }
        }
        if tallies.iter().all(|&count| count == 0) {
            return Ok(self.reject(bin_id, RejectReason::NoTemperedCells));
        }
        if self.ledger.any_cell_contested(cells.iter()) {
            return Ok(self.reject(bin_id, RejectReason::CellsContested));
        }

        // Commit point: in-flight markers go down synchronously, before any
        // interleaving is possible.
        self.ledger.mark_bin(bin_id);
        self.ledger.mark_cells(&cells);

        if let Some(target) = self.bins.get_mut(bin_id) {
            for temper in Temper::ALL {
                let count = tallies[temper.index()];
                if count > 0 {
                    target
                        .metrics
                        .increment(temper, Fill::from_count_per_cent(count));
                }
            }
        }
        self.metrics.transfers_committed += 1;
        self.events.broadcast(&SessionEvent::BinsChanged { bin: bin_id });
        if self.bins.is_complete() {
            info!("all bins saturated, file complete");
            self.events.broadcast(&SessionEvent::FileComplete);
        }

        let receipt = TransferReceipt {
            bin: bin_id,
            cells: cells.len(),
            tallies,
        };
        self.pending.push(PendingTransfer {
            bin: bin_id,
            cells,
            settle_at: now + self.config.transfer_settle,
            release_at: now + self.config.transfer_settle + self.config.transfer_release,
            settled: false,
        });

        debug!(bin = %bin_id, cells = receipt.cells, "transfer committed");
        Ok(AssignOutcome::Committed(receipt))
    }

    fn reject(&mut self, bin: BinId, reason: RejectReason) -> AssignOutcome {
        self.metrics.transfers_rejected += 1;
        debug!(%bin, %reason, "transfer rejected");
        self.events
            .broadcast(&SessionEvent::TransferRejected { bin, reason });
        AssignOutcome::Rejected(reason)
    }

    /// Drive the cooperative clock: due temper events, transfer settlement
    /// and the periodic progress save.
    pub fn advance(&mut self, now: Instant) {
        let activity = self.temper.poll(now, &mut self.grid, &mut self.rng);
        self.metrics.temper_events += u64::from(activity.events);
        self.metrics.cells_tempered += u64::from(activity.cells_tempered);
        if activity.cells_tempered > 0 {
            self.events.broadcast(&SessionEvent::GridChanged);
        }

        self.settle_transfers(now);

        if self.saver.poll(now, &self.bins) {
            self.metrics.saves_completed += 1;
        }
    }

    fn settle_transfers(&mut self, now: Instant) {
        let mut grid_changed = false;
        for transfer in &mut self.pending {
            if !transfer.settled && now >= transfer.settle_at {
                for &pos in &transfer.cells {
                    self.grid.reset_cell(pos, &mut self.rng);
                }
                self.ledger.release_cells(&transfer.cells);
                self.metrics.cells_refined += transfer.cells.len() as u64;
                transfer.settled = true;
                grid_changed = true;
            }
        }

        let ledger = &mut self.ledger;
        self.pending.retain(|transfer| {
            if transfer.settled && now >= transfer.release_at {
                ledger.release_bin(transfer.bin);
                false
            } else {
                true
            }
        });

        if grid_changed {
            self.events.broadcast(&SessionEvent::GridChanged);
        }
    }

    /// Force every committed transfer through both phases immediately.
    /// Used on teardown so effects complete even without further clock
    /// ticks.
    pub fn flush_transfers(&mut self) {
        let mut grid_changed = false;
        for transfer in &self.pending {
            if !transfer.settled {
                for &pos in &transfer.cells {
                    self.grid.reset_cell(pos, &mut self.rng);
                }
                self.ledger.release_cells(&transfer.cells);
                self.metrics.cells_refined += transfer.cells.len() as u64;
                grid_changed = true;
            }
            self.ledger.release_bin(transfer.bin);
        }
        self.pending.clear();
        if grid_changed {
            self.events.broadcast(&SessionEvent::GridChanged);
        }
    }

    /// Orderly teardown: stop the temper engine, complete in-flight
    /// transfers and write a final progress save.
    pub fn shutdown(&mut self) {
        self.temper.stop();
        self.flush_transfers();
        if self.saver.save_now(&self.bins) {
            self.metrics.saves_completed += 1;
        }
        info!(file_id = %self.saver.file_id(), "refinement session closed");
    }
}

impl std::fmt::Debug for RefinementSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefinementSession")
            .field("file_id", &self.saver.file_id())
            .field("viewport", &self.grid.viewport())
            .field("visible", &self.grid.visible_len())
            .field("pending_transfers", &self.pending.len())
            .finish()
    }
}
