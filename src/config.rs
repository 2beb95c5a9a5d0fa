//! Widget configuration read from host element attributes.
//!
//! Attributes are read once when the element attaches. Every setting has a
//! default, so configuration never prevents a widget from starting; values
//! that fail to parse are logged and replaced by the default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::net::channel::{ChannelId, Endpoint};
use crate::net::link::ReconnectPolicy;

/// Channel to subscribe to; absent means all channels.
pub const ATTR_CHANNEL: &str = "thing-id";
/// Override for the feed server host.
pub const ATTR_HOST: &str = "feed-host";
/// Presence forces `wss`/`https`.
pub const ATTR_SECURE: &str = "feed-secure";
/// Reconnect delay in milliseconds.
pub const ATTR_RECONNECT_MS: &str = "reconnect-ms";
/// Maximum number of retained messages.
pub const ATTR_HISTORY_CAP: &str = "history-cap";

/// Host used when neither the attribute nor the page provides one.
pub const FALLBACK_HOST: &str = "localhost:8000";

/// How much of the newest message's color is applied to the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Styling {
    /// Label color and border color.
    LabelAndBorder,
    /// Label color, border color and a glow of the same color.
    LabelBorderGlow,
}

/// A registered widget type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variant {
    /// Custom element tag name.
    pub tag: &'static str,
    /// Header text preceding the channel label.
    pub title: &'static str,
    /// Payload field holding the item label.
    pub label_field: &'static str,
    pub styling: Styling,
}

pub const DOODAD_VIEWER: Variant = Variant {
    tag: "doodad-viewer",
    title: "Doodad",
    label_field: "type",
    styling: Styling::LabelBorderGlow,
};

pub const THING_VIEWER: Variant = Variant {
    tag: "thing-viewer",
    title: "Thing",
    label_field: "thing",
    styling: Styling::LabelAndBorder,
};

/// Every widget type defined at startup.
pub const BUILTIN_VARIANTS: [Variant; 2] = [DOODAD_VIEWER, THING_VIEWER];

/// Facts about the hosting page used for defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLocation {
    /// `location.host`, empty or absent outside a served page.
    pub host: Option<String>,
    /// Page was loaded over `https:`.
    pub secure: bool,
}

/// Settings for one widget instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    pub channel: ChannelId,
    pub endpoint: Endpoint,
    pub policy: ReconnectPolicy,
    pub history_cap: Option<usize>,
}

impl WidgetConfig {
    /// Build the config from an attribute lookup and the page location.
    pub fn from_attrs(attr: impl Fn(&str) -> Option<String>, page: &PageLocation) -> Self {
        let channel = ChannelId::resolve(attr(ATTR_CHANNEL).as_deref());

        let host = attr(ATTR_HOST)
            .filter(|h| !h.trim().is_empty())
            .or_else(|| page.host.clone().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| FALLBACK_HOST.to_owned());
        let secure = attr(ATTR_SECURE).is_some() || page.secure;

        let policy = parse_attr::<u64>(ATTR_RECONNECT_MS, attr(ATTR_RECONNECT_MS))
            .filter(|ms| *ms > 0)
            .map(|ms| ReconnectPolicy::fixed(Duration::from_millis(ms)))
            .unwrap_or_default();
        let history_cap = parse_attr::<usize>(ATTR_HISTORY_CAP, attr(ATTR_HISTORY_CAP)).filter(|cap| *cap > 0);

        Self {
            channel,
            endpoint: Endpoint { host, secure },
            policy,
            history_cap,
        }
    }
}

fn parse_attr<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            leptos::logging::warn!("ignoring invalid {name}={raw:?}; using default");
            None
        }
    }
}
