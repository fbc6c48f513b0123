//! Priority queue of scheduled cell transitions.
//!
//! Events are ordered by scheduled time, earliest first. Events scheduled
//! for the same time leave the queue in the order they entered it: each
//! push is stamped with a monotonically increasing sequence number that
//! breaks ties. Times are compared with [`f64::total_cmp`], so the order is
//! total even for pathological inputs.
//!
//! A cell has at most one pending event at a time, so the queue needs no
//! decrease-key or removal by cell.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use excitation_types::{CellPosition, TransitionEvent};

/// Errors that can occur during queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// `pop_min` or `peek_min` was called on an empty queue. Callers check
    /// [`EventQueue::is_empty`] first, so this indicates a logic defect.
    #[error("event queue is empty")]
    Empty,
}

/// An event stamped with its insertion sequence number.
#[derive(Debug, Clone, Copy)]
struct Queued {
    event: TransitionEvent,
    seq: u64,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .event_time
            .total_cmp(&other.event.event_time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-time queue of [`TransitionEvent`]s, stable on equal times.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Queued>>,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. Among events with the same time, it is placed after
    /// every event already queued.
    pub fn push(&mut self, event: TransitionEvent) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.heap.push(Reverse(Queued { event, seq }));
    }

    /// Remove and return the earliest event.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if the queue holds no events.
    pub fn pop_min(&mut self) -> Result<TransitionEvent, QueueError> {
        self.heap
            .pop()
            .map(|Reverse(queued)| queued.event)
            .ok_or(QueueError::Empty)
    }

    /// Return the earliest event without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if the queue holds no events.
    pub fn peek_min(&self) -> Result<TransitionEvent, QueueError> {
        self.heap
            .peek()
            .map(|Reverse(queued)| queued.event)
            .ok_or(QueueError::Empty)
    }

    /// Returns `true` if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Number of queued events for the cell at `position`.
    pub fn pending_for(&self, position: CellPosition) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(queued)| queued.event.position == position)
            .count()
    }
}
