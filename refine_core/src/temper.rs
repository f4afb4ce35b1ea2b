//! Temper propagation engine.
//!
//! On a fixed wall-clock cadence the engine rolls for an "event": seeding a
//! random temper on one visible cell and spreading it to neighbours with
//! decaying, direction-excluding probability. The resulting blob shape is an
//! emergent property of the per-edge chain probability; there is no explicit
//! size target.
//!
//! The clock is passed in by the caller (cooperative scheduling, no
//! background timer), so `stop` trivially guarantees that no event fires
//! after it returns.

use std::time::{Duration, Instant};

use rand::{rngs::SmallRng, Rng};
use tracing::{debug, warn};

use crate::cell::Temper;
use crate::coords::{Direction, RelPos};
use crate::grid::GridStore;

/// Tunables for the propagation process. Defaults match the workstation's
/// shipped behaviour.
#[derive(Debug, Clone, Copy)]
pub struct TemperSettings {
    /// Wall-clock gap between event rolls.
    pub event_interval: Duration,
    /// Probability that a due tick actually produces an event.
    pub chance_of_event: f32,
    /// Per-direction probability of chaining to a neighbour.
    pub chance_of_chain: f32,
    /// Tick-level ceiling: skip the whole event when more than this fraction
    /// of visible cells is already tempered.
    pub event_density_ceiling: f32,
    /// Per-spread-step ceiling, re-checked on every work item.
    pub spread_density_ceiling: f32,
}

impl Default for TemperSettings {
    fn default() -> Self {
        Self {
            event_interval: Duration::from_secs(5),
            chance_of_event: 0.5,
            chance_of_chain: 0.35,
            event_density_ceiling: 0.10,
            spread_density_ceiling: 0.05,
        }
    }
}

/// What a poll actually did, for metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemperActivity {
    pub events: u32,
    pub cells_tempered: u32,
}

#[derive(Debug)]
pub struct TemperEngine {
    settings: TemperSettings,
    active: bool,
    next_event: Option<Instant>,
}

impl TemperEngine {
    pub fn new(settings: TemperSettings) -> Self {
        Self {
            settings,
            active: false,
            next_event: None,
        }
    }

    pub fn settings(&self) -> &TemperSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable the engine and schedule the first event one interval out.
    /// Idempotent: restarting resets the schedule.
    pub fn start(&mut self, now: Instant) {
        self.active = true;
        self.next_event = Some(now + self.settings.event_interval);
    }

    /// Disable the engine and drop the pending schedule. No event can fire
    /// after this returns.
    pub fn stop(&mut self) {
        self.active = false;
        self.next_event = None;
    }

    /// Fire every event that has come due since the last poll.
    pub fn poll(
        &mut self,
        now: Instant,
        grid: &mut GridStore,
        rng: &mut SmallRng,
    ) -> TemperActivity {
        let mut activity = TemperActivity::default();
        if !self.active {
            return activity;
        }

        while let Some(due) = self.next_event {
            if due > now {
                break;
            }
            self.next_event = Some(due + self.settings.event_interval);
            if let Some(tempered) = self.run_event(grid, rng) {
                activity.events += 1;
                activity.cells_tempered += tempered;
            }
        }
        activity
    }

    /// One event roll. Returns `None` when the tick was skipped.
    fn run_event(&self, grid: &mut GridStore, rng: &mut SmallRng) -> Option<u32> {
        if grid.is_empty() {
            warn!("temper event skipped: grid not initialised");
            return None;
        }
        let density = grid.tempered_fraction();
        if density > self.settings.event_density_ceiling {
            debug!(density, "temper event skipped: density ceiling reached");
            return None;
        }
        if rng.gen::<f32>() >= self.settings.chance_of_event {
            return None;
        }

        let idx = rng.gen_range(0..grid.visible_len());
        let seed = grid.nth_visible(idx)?;
        let seed_rel = grid.viewport().to_relative(seed);
        let tempered = self.spread(grid, rng, seed_rel);
        debug!(seed = %seed, tempered, "temper event fired");
        Some(tempered)
    }

    /// Spread from a seed with an explicit work list.
    ///
    /// Each item carries the direction it was entered from, which is
    /// excluded from its own chain rolls; only the seed's first hop is
    /// forced. Already-tempered cells stop a branch, which together with the
    /// finite visible window guarantees termination.
    pub fn spread(
        &self,
        grid: &mut GridStore,
        rng: &mut SmallRng,
        seed: RelPos,
    ) -> u32 {
        let mut tempered = 0u32;
        let mut work = vec![(seed, None::<Direction>, true)];

        while let Some((rel, exclude, must_chain)) = work.pop() {
            if !grid.contains_relative(rel) {
                continue;
            }
            if grid.tempered_fraction() > self.settings.spread_density_ceiling {
                continue;
            }
            match grid.cell_at_relative(rel) {
                Ok(cell) if cell.is_tempered() => continue,
                Ok(_) => {}
                // Panning can shrink the window between ticks; a missing
                // cell is a silent no-op here.
                Err(_) => continue,
            }

            let temper = Temper::ALL[rng.gen_range(0..Temper::ALL.len())];
            if grid.set_temper(rel, temper).is_err() {
                continue;
            }
            tempered += 1;

            for direction in Direction::ALL {
                if exclude == Some(direction) {
                    continue;
                }
                let chain = must_chain || rng.gen::<f32>() <= self.settings.chance_of_chain;
                if !chain {
                    continue;
                }
                let next = rel.step(direction);
                if grid.contains_relative(next) {
                    work.push((next, Some(direction), false));
                }
            }
        }
        tempered
    }
}
