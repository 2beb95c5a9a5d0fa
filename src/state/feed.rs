//! Message store for one widget's feed.
//!
//! DESIGN
//! ======
//! Payloads are kept newest-first exactly as received. The store is
//! unbounded unless a cap is configured; with a cap the oldest entries are
//! evicted from the back.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use std::collections::VecDeque;

/// One received payload and its receipt order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Receipt sequence number within this widget instance; stable list key.
    pub seq: u64,
    /// Raw text as delivered by the transport.
    pub payload: String,
}

/// Newest-first message sequence owned by one widget instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedState {
    messages: VecDeque<Message>,
    next_seq: u64,
    cap: Option<usize>,
}

impl FeedState {
    /// Store retaining at most `cap` messages; `None` keeps everything.
    #[must_use]
    pub fn with_cap(cap: Option<usize>) -> Self {
        Self { cap, ..Self::default() }
    }

    /// Insert a payload at the front.
    pub fn push(&mut self, payload: String) {
        self.messages.push_front(Message { seq: self.next_seq, payload });
        self.next_seq += 1;
        if let Some(cap) = self.cap {
            self.messages.truncate(cap);
        }
    }

    /// All messages, newest first.
    pub fn all(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Message> {
        self.messages.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
