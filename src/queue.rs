//! Packet queues
//!
//! Unbounded FIFO queues shared between client threads and the supervisor.
//! Each queue carries its own lock so the read path and the write path never
//! contend with one another.
//!
//! A queue has an open/closed lifecycle in addition to its contents:
//! `connect()` opens the queues its configuration implies and `disconnect()`
//! closes them, waking every blocked consumer. A closed queue still hands out
//! whatever items remain, then yields `None`.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::packet::Packet;

struct QueueState {
    items: VecDeque<Packet>,
    open: bool,
}

/// Unbounded FIFO packet queue with blocking pop and observable length
pub struct PacketQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl PacketQueue {
    /// Create a new queue in the closed state
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                open: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a packet and wake one blocked consumer
    pub fn push(&self, packet: Packet) {
        let mut state = self.state.lock();
        state.items.push_back(packet);
        self.available.notify_one();
    }

    /// Dequeue the oldest packet, blocking while the queue is open and empty.
    ///
    /// Returns `None` once the queue is closed and drained. Strict FIFO.
    pub fn pop(&self) -> Option<Packet> {
        let mut state = self.state.lock();
        loop {
            if let Some(packet) = state.items.pop_front() {
                return Some(packet);
            }
            if !state.open {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Dequeue without blocking
    pub fn try_pop(&self) -> Option<Packet> {
        self.state.lock().items.pop_front()
    }

    /// Number of queued packets
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// True when no packets are queued
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Discard every queued packet
    pub fn clear(&self) {
        self.state.lock().items.clear();
    }

    /// Open the queue so consumers block instead of observing closure
    pub fn reopen(&self) {
        self.state.lock().open = true;
    }

    /// Close the queue and wake every blocked consumer
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.open = false;
        drop(state);
        self.available.notify_all();
    }

    /// True while the queue accepts blocking waits
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}
