//! Observer hub for state-change notifications.
//!
//! The rendering layer subscribes to redraw reactively; the notification
//! chrome subscribes for denial and completion indicators. Callbacks run
//! synchronously after the mutation they describe has committed, and
//! unsubscription is explicit so torn-down consumers do not leak.

use crate::bins::BinId;
use crate::coords::Viewport;
use crate::transfer::RejectReason;

/// Committed state changes and protocol signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The visible cell set changed (regenerate, highlight, temper, reset).
    GridChanged,
    /// The viewport origin moved.
    ViewportMoved { viewport: Viewport },
    /// A bin's counters changed.
    BinsChanged { bin: BinId },
    /// An assignment request was denied.
    TransferRejected { bin: BinId, reason: RejectReason },
    /// Every counter of every bin reached 1.
    FileComplete,
}

/// Handle returned by [`EventHub::subscribe`]; pass it back to
/// [`EventHub::unsubscribe`] on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false when the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn broadcast(&mut self, event: &SessionEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
