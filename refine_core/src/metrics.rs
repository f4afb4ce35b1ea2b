//! Session activity counters, polled by the driving shell.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    /// Temper events that actually fired (skipped ticks excluded).
    pub temper_events: u64,
    /// Cells that received a temper label.
    pub cells_tempered: u64,
    /// Assignments that reached the commit point.
    pub transfers_committed: u64,
    /// Assignments turned down during validation.
    pub transfers_rejected: u64,
    /// Cells consumed and regenerated by settled transfers.
    pub cells_refined: u64,
    /// Successful progress saves.
    pub saves_completed: u64,
}
