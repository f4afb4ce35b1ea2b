//! Session configuration.

use std::time::Duration;

use crate::temper::TemperSettings;

/// Tunables for one refinement session. Defaults reproduce the shipped
/// workstation behaviour.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Edge length of one cell on screen.
    pub cell_size_px: f32,
    /// Default influence radius around the focal point.
    pub pointer_influence_radius_px: f32,
    /// Cells moved per viewport step.
    pub navigation_step: i64,
    /// Fixed number of collection bins.
    pub bin_count: usize,
    pub temper: TemperSettings,
    /// Latency before consumed cells are reset and released.
    pub transfer_settle: Duration,
    /// Additional latency before the bin itself is freed.
    pub transfer_release: Duration,
    /// Cadence of periodic progress saves.
    pub save_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cell_size_px: 50.0,
            pointer_influence_radius_px: 120.0,
            navigation_step: 1,
            bin_count: 5,
            temper: TemperSettings::default(),
            transfer_settle: Duration::from_secs(2),
            transfer_release: Duration::from_secs(4),
            save_interval: Duration::from_secs(1),
        }
    }
}
