//! Message dispatch
//!
//! Decoded messages are handed to a [`MessageHandler`] right after the
//! frame has been acknowledged. The payload slice borrows the receive
//! buffer, so handlers that process later copy it into a [`MessageQueue`].

use heapless::{Deque, Vec};
use rauchmelder_protocol::RECV_BUF_LEN;

/// Receives decoded messages, checksum byte excluded
pub trait MessageHandler {
    /// Called once per acknowledged frame with at least one payload byte
    fn on_message(&mut self, payload: &[u8]);
}

impl<F: FnMut(&[u8])> MessageHandler for F {
    fn on_message(&mut self, payload: &[u8]) {
        self(payload)
    }
}

/// A received message copied out of the receive buffer
pub type Message = Vec<u8, RECV_BUF_LEN>;

/// Bounded queue of received messages
///
/// Messages arriving while the queue is full are dropped.
#[derive(Debug, Default)]
pub struct MessageQueue<const N: usize> {
    messages: Deque<Message, N>,
    dropped: u32,
}

impl<const N: usize> MessageQueue<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
            dropped: 0,
        }
    }

    /// Take the oldest message
    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop_front()
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no message is queued
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> MessageHandler for MessageQueue<N> {
    fn on_message(&mut self, payload: &[u8]) {
        let message = match Message::from_slice(payload) {
            Ok(message) => message,
            Err(()) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Message of {} bytes exceeds receive buffer", payload.len());
                self.dropped = self.dropped.saturating_add(1);
                return;
            }
        };

        if self.messages.push_back(message).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Message queue full, dropping message");
            self.dropped = self.dropped.saturating_add(1);
        }
    }
}
