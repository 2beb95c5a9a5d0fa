//! Channel identifier resolution and feed endpoint URLs.
//!
//! A widget subscribes to exactly one channel for its whole lifetime. The
//! empty identifier is the wildcard subscription that receives all traffic.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::fmt;

/// Header placeholder shown for the wildcard channel.
pub const WILDCARD_LABEL: &str = "[all]";

/// Path prefix for feed subscriptions on the server.
pub const FEED_PATH_PREFIX: &str = "/thing/";

/// Key selecting which message stream a widget subscribes to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Resolve the identifier from the optional `thing-id` attribute.
    ///
    /// Absence yields the wildcard. No validation or normalization happens.
    pub fn resolve(attr: Option<&str>) -> Self {
        Self(attr.unwrap_or_default().to_owned())
    }

    /// True when this widget receives every channel's traffic.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    /// Label for the panel header.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.is_wildcard() { WILDCARD_LABEL } else { &self.0 }
    }

    /// Subscription path, e.g. `/thing/42` or `/thing/` for the wildcard.
    #[must_use]
    pub fn endpoint_path(&self) -> String {
        format!("{FEED_PATH_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Server location a widget talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Host with optional port, e.g. `localhost:8000`.
    pub host: String,
    /// Use `wss`/`https` instead of `ws`/`http`.
    pub secure: bool,
}

impl Endpoint {
    /// Websocket URL for the given channel.
    #[must_use]
    pub fn ws_url(&self, channel: &ChannelId) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}{}", self.host, channel.endpoint_path())
    }

    /// Protocol-relative link for manual inspection of the channel.
    #[must_use]
    pub fn inspect_href(&self, channel: &ChannelId) -> String {
        format!("//{}{}", self.host, channel.endpoint_path())
    }
}
