//! Bin aggregates: the five collection targets and their fill counters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{Temper, TEMPER_COUNT};
use crate::fill::Fill;

/// Zero-based bin index. Displayed as the workstation label (`01`..`05`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinId(pub u8);

impl BinId {
    pub fn label(self) -> String {
        format!("{:02}", self.0 + 1)
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Persisted form of a bin's four counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BinFillRecord {
    pub wo: f32,
    pub fc: f32,
    pub dr: f32,
    pub ma: f32,
}

/// Four saturating counters, one per temper category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinMetrics {
    counts: [Fill; TEMPER_COUNT],
}

impl BinMetrics {
    pub fn get(&self, temper: Temper) -> Fill {
        self.counts[temper.index()]
    }

    /// Saturating increment: the counter never leaves [0, 1].
    pub fn increment(&mut self, temper: Temper, amount: Fill) {
        let slot = &mut self.counts[temper.index()];
        *slot = slot.saturating_add(amount);
    }

    /// A bin is full once every counter sits at 1.
    pub fn is_full(&self) -> bool {
        self.counts.iter().all(|fill| fill.is_full())
    }

    /// Unclamped sum of the four counters, as raw fixed-point units.
    pub fn total_raw(&self) -> i64 {
        self.counts.iter().copied().sum::<Fill>().raw()
    }

    pub fn snapshot(&self) -> BinFillRecord {
        BinFillRecord {
            wo: self.get(Temper::Woe).to_f32(),
            fc: self.get(Temper::Frolic).to_f32(),
            dr: self.get(Temper::Dread).to_f32(),
            ma: self.get(Temper::Malice).to_f32(),
        }
    }

    pub fn restore(&mut self, record: &BinFillRecord) {
        self.counts[Temper::Woe.index()] = Fill::from_f32(record.wo);
        self.counts[Temper::Frolic.index()] = Fill::from_f32(record.fc);
        self.counts[Temper::Dread.index()] = Fill::from_f32(record.dr);
        self.counts[Temper::Malice.index()] = Fill::from_f32(record.ma);
    }
}

/// One collection bin.
#[derive(Debug, Clone)]
pub struct Bin {
    pub id: BinId,
    pub metrics: BinMetrics,
}

impl Bin {
    pub fn label(&self) -> String {
        self.id.label()
    }
}

/// The fixed set of bins for one session. Created at session start, never
/// resized afterwards.
#[derive(Debug, Clone)]
pub struct BinRoster {
    bins: Vec<Bin>,
}

impl BinRoster {
    pub fn new(count: usize) -> Self {
        let bins = (0..count)
            .map(|idx| Bin {
                id: BinId(idx as u8),
                metrics: BinMetrics::default(),
            })
            .collect();
        Self { bins }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, id: BinId) -> Option<&Bin> {
        self.bins.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: BinId) -> Option<&mut Bin> {
        self.bins.get_mut(id.0 as usize)
    }

    pub fn by_label(&self, label: &str) -> Option<&Bin> {
        self.bins.iter().find(|bin| bin.label() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bin> {
        self.bins.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Bin> {
        self.bins.iter_mut()
    }

    /// The file is complete when every counter of every bin is saturated.
    pub fn is_complete(&self) -> bool {
        self.bins.iter().all(|bin| bin.metrics.is_full())
    }

    /// Overall session progress: mean of all counters across all bins.
    pub fn progress(&self) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let total: i64 = self.bins.iter().map(|bin| bin.metrics.total_raw()).sum();
        let denom = (self.bins.len() * TEMPER_COUNT) as i64 * Fill::SCALE;
        total as f32 / denom as f32
    }
}
