//! Connection lifecycle for one widget's feed subscription.
//!
//! `Link` is a pure state machine: it never touches a socket or a timer. The
//! browser driver feeds it transport events and acts on the returned
//! [`Directive`]s, which keeps the retry policy testable on a simulated clock.
//!
//! RECONNECT POLICY
//! ================
//! Any termination (error or close) of the current connection schedules
//! exactly one reconnect after a fixed delay. There is no retry limit and no
//! backoff growth. Events from superseded connections are ignored so a stale
//! socket can never schedule a second retry or inject messages.

#[cfg(test)]
#[path = "link_test.rs"]
mod link_test;

use std::time::Duration;

use super::channel::{ChannelId, Endpoint};

/// Delay between a termination and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Close code reported when a stream ends without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Fixed-delay, retry-forever reconnection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    /// Retry every `delay`, indefinitely.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn delay_ms(&self) -> u64 {
        u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

/// Transport event observed on a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    /// Handshake completed.
    Opened,
    /// Inbound text frame.
    Message(String),
    /// Transport error; always followed by termination.
    Errored(String),
    /// Connection closed, cleanly or not.
    Closed { code: u16, reason: String },
}

/// Where the link is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkState {
    /// `start()` has never been called.
    #[default]
    Idle,
    /// Handshake in flight.
    Connecting,
    /// Connection established.
    Open,
    /// Terminated; a reconnect is due at `due_ms`.
    Waiting { due_ms: u64 },
}

/// A connection attempt handed to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    /// Identifies this attempt's events; bumps on every `start()`.
    pub generation: u64,
    /// Websocket URL to open.
    pub url: String,
}

/// What the driver must do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Ignore,
    /// Push this payload into the message store and re-render.
    Deliver(String),
    /// Schedule one reconnect after the delay.
    Reconnect { after: Duration },
}

/// Result of asking whether a scheduled reconnect may fire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryPoll {
    /// The delay elapsed; a new attempt has been started.
    Due(Attempt),
    /// Still waiting for this long.
    Pending(Duration),
    /// No reconnect is scheduled.
    Idle,
}

/// Owns the connection lifecycle of exactly one widget instance.
#[derive(Clone, Debug)]
pub struct Link {
    channel: ChannelId,
    url: String,
    policy: ReconnectPolicy,
    state: LinkState,
    generation: u64,
    attempts: u64,
}

impl Link {
    pub fn new(channel: ChannelId, endpoint: &Endpoint, policy: ReconnectPolicy) -> Self {
        let url = endpoint.ws_url(&channel);
        Self {
            channel,
            url,
            policy,
            state: LinkState::Idle,
            generation: 0,
            attempts: 0,
        }
    }

    /// Begin a new connection attempt, superseding any previous one.
    pub fn start(&mut self) -> Attempt {
        self.generation += 1;
        self.attempts += 1;
        self.state = LinkState::Connecting;
        Attempt { generation: self.generation, url: self.url.clone() }
    }

    /// Apply a transport event from the attempt identified by `generation`.
    ///
    /// A message arriving before the open event marks the link open first.
    pub fn handle(&mut self, generation: u64, event: LinkEvent, now_ms: u64) -> Directive {
        if generation != self.generation {
            return Directive::Ignore;
        }

        match event {
            LinkEvent::Opened => {
                self.mark_open();
                Directive::Ignore
            }
            LinkEvent::Message(payload) => {
                self.mark_open();
                Directive::Deliver(payload)
            }
            LinkEvent::Errored(detail) => {
                leptos::logging::error!("[WS {}] error observed: {detail}", self.channel);
                self.terminate(now_ms)
            }
            LinkEvent::Closed { code, reason } => {
                leptos::logging::error!("[WS {}] close observed: code={code} reason={reason:?}", self.channel);
                self.terminate(now_ms)
            }
        }
    }

    /// The attempt's stream ended without a close or error event.
    pub fn end_of_stream(&mut self, generation: u64, now_ms: u64) -> Directive {
        let event = LinkEvent::Closed { code: ABNORMAL_CLOSURE, reason: "stream ended".to_owned() };
        self.handle(generation, event, now_ms)
    }

    /// Make sure a reconnect is pending, scheduling one a full delay from
    /// `now_ms` if none is. Returns the remaining wait.
    pub fn ensure_retry(&mut self, now_ms: u64) -> Duration {
        match self.state {
            LinkState::Waiting { due_ms } => Duration::from_millis(due_ms.saturating_sub(now_ms)),
            _ => {
                self.state = LinkState::Waiting { due_ms: now_ms.saturating_add(self.policy.delay_ms()) };
                self.policy.delay()
            }
        }
    }

    /// Start the scheduled reconnect if its delay has elapsed.
    pub fn poll_retry(&mut self, now_ms: u64) -> RetryPoll {
        match self.state {
            LinkState::Waiting { due_ms } if now_ms >= due_ms => RetryPoll::Due(self.start()),
            LinkState::Waiting { due_ms } => RetryPoll::Pending(Duration::from_millis(due_ms - now_ms)),
            _ => RetryPoll::Idle,
        }
    }

    fn mark_open(&mut self) {
        if self.state == LinkState::Connecting {
            leptos::logging::error!("[WS {}] Connected: {}", self.channel, self.url);
            self.state = LinkState::Open;
        }
    }

    fn terminate(&mut self, now_ms: u64) -> Directive {
        match self.state {
            LinkState::Connecting | LinkState::Open => {
                self.state = LinkState::Waiting { due_ms: now_ms.saturating_add(self.policy.delay_ms()) };
                Directive::Reconnect { after: self.policy.delay() }
            }
            LinkState::Idle | LinkState::Waiting { .. } => Directive::Ignore,
        }
    }

    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Number of `start()` calls so far.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
