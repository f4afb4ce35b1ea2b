use std::time::Instant;

use refine_core::{
    MemoryProgressStore, RefinementSession, SessionConfig, SurfaceSize, TemperSettings,
};

pub const CELL: f32 = 50.0;

/// Session with a deterministic RNG and an always-firing temper engine.
pub fn eager_session(seed: u64, rows: f32, cols: f32) -> (RefinementSession, Instant) {
    let config = SessionConfig {
        temper: TemperSettings {
            chance_of_event: 1.0,
            event_density_ceiling: 1.0,
            spread_density_ceiling: 1.0,
            ..TemperSettings::default()
        },
        ..SessionConfig::default()
    };
    session_with(seed, rows, cols, config)
}

/// Session with the shipped default configuration.
pub fn default_session(seed: u64, rows: f32, cols: f32) -> (RefinementSession, Instant) {
    session_with(seed, rows, cols, SessionConfig::default())
}

fn session_with(
    seed: u64,
    rows: f32,
    cols: f32,
    config: SessionConfig,
) -> (RefinementSession, Instant) {
    let start = Instant::now();
    let mut session = RefinementSession::with_seed(
        "integration",
        config,
        Box::new(MemoryProgressStore::new()),
        start,
        seed,
    );
    session.regenerate(SurfaceSize::new(cols * CELL, rows * CELL));
    (session, start)
}

/// Visible digits in row-major relative order, for snapshot comparisons.
pub fn visible_digits(session: &RefinementSession) -> Vec<(i64, i64, u8)> {
    let mut digits: Vec<(i64, i64, u8)> = session
        .grid()
        .visible_cells()
        .map(|(rel, cell)| (rel.row, rel.col, cell.digit))
        .collect();
    digits.sort();
    digits
}
