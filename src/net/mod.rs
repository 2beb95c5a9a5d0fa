//! Networking modules for the feed websocket.
//!
//! SYSTEM CONTEXT
//! ==============
//! `channel` resolves the subscription key and endpoint URLs, `link` is the
//! pure connection lifecycle state machine, and `driver` runs that machine
//! against a real browser websocket.

pub mod channel;
#[cfg(feature = "csr")]
pub mod driver;
pub mod link;
