//! Core engine for the macrodata refinement workstation.
//!
//! Models an infinite, pannable grid of digits with consistent procedural
//! regeneration, pointer-proximity highlighting, a probabilistic temper
//! propagation process and a transactional assignment protocol that feeds
//! five collection bins. Rendering, dialog chrome and input capture live in
//! an external shell that drives [`RefinementSession`] and subscribes to its
//! event hub.

pub mod bins;
pub mod cache;
pub mod cell;
pub mod config;
pub mod coords;
pub mod events;
pub mod fill;
pub mod grid;
pub mod highlight;
pub mod metrics;
pub mod progress;
pub mod session;
pub mod temper;
pub mod transfer;

pub use bins::{Bin, BinFillRecord, BinId, BinMetrics, BinRoster};
pub use cache::CellCache;
pub use cell::{Cell, Temper, TEMPER_COUNT};
pub use config::SessionConfig;
pub use coords::{
    CellIdParseError, Direction, GridOrigin, GridPos, PixelPoint, RelPos, SurfaceSize, Viewport,
};
pub use events::{EventHub, SessionEvent, SubscriptionId};
pub use fill::Fill;
pub use grid::{GridError, GridStore};
pub use metrics::SessionMetrics;
pub use progress::{
    JsonProgressStore, MemoryProgressStore, ProgressError, ProgressRecord, ProgressSaver,
    ProgressStore,
};
pub use session::{RefinementSession, SessionError};
pub use temper::{TemperActivity, TemperEngine, TemperSettings};
pub use transfer::{AssignOutcome, PendingTransfer, RejectReason, TransferLedger, TransferReceipt};
