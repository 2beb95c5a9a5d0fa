//! Projection from widget state to what the panel displays.
//!
//! SYSTEM CONTEXT
//! ==============
//! `project` is a pure function of {channel, feed, variant, endpoint}; the
//! `FeedPanel` component re-runs it after every store mutation. Only the
//! newest payload is interpreted, and only for non-wildcard channels.
//!
//! ERROR HANDLING
//! ==============
//! A newest payload that is not a JSON object with the expected fields is
//! not fatal: the panel renders without metadata-derived styling and the
//! failure is logged.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde_json::{Map, Value};

use crate::config::{Styling, Variant};
use crate::net::channel::{ChannelId, Endpoint};
use crate::state::feed::FeedState;

/// Base stylesheet injected with every panel.
pub const PANEL_CSS: &str = "\
h1 { margin-top: 0; color: #FFF; font-family: sans-serif; }
h1 a { color: #FFF; }
.container { width: 400px; background-color: #111; border-radius: 10px; border: 3px solid #000; \
box-shadow: 0 0 10px 1px #000000; margin: 10px; padding: 20px; }
.message-list { height: 200px; overflow-x: hidden; overflow-y: scroll; }
ul.message-list { color: #FFF; list-style-type: none; margin: 0; padding: 0; }
";

/// Why the newest payload yielded no metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Not JSON, or JSON that is not an object.
    #[error("payload is not a JSON object: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required field is absent or null.
    #[error("payload has no `{0}` field")]
    MissingField(String),
}

/// Display metadata carried by the newest message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    /// Kind of the most recent item, e.g. `car`.
    pub label: String,
    /// CSS color string, passed through untouched.
    pub color: String,
    pub id: Option<String>,
    pub created: Option<String>,
}

impl Metadata {
    /// Parse `payload` and pull out the label (from `label_field`) and color.
    pub fn extract(payload: &str, label_field: &str) -> Result<Self, MetadataError> {
        let fields: Map<String, Value> = serde_json::from_str(payload)?;
        let field = |name: &str| fields.get(name).filter(|v| !v.is_null());
        let required = |name: &str| {
            field(name)
                .map(field_text)
                .ok_or_else(|| MetadataError::MissingField(name.to_owned()))
        };
        let label = required(label_field)?;
        let color = required("color")?;
        Ok(Self {
            label,
            color,
            id: field("id").map(field_text),
            created: field("created").map(field_text),
        })
    }

    /// Plain-text description, e.g. `Doodad a which is a red car`.
    ///
    /// Only available when the payload names its item id.
    #[must_use]
    pub fn summary(&self, title: &str) -> Option<String> {
        let id = self.id.as_deref()?;
        let mut text = format!("{title} {id} which is a {} {}", self.color, self.label);
        if let Some(created) = &self.created {
            text.push_str(" created at ");
            text.push_str(created);
        }
        Some(text)
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Metadata of the newest message, if the channel is not the wildcard.
pub fn latest_metadata(
    channel: &ChannelId,
    feed: &FeedState,
    label_field: &str,
) -> Result<Option<Metadata>, MetadataError> {
    if channel.is_wildcard() {
        return Ok(None);
    }
    feed.latest()
        .map(|newest| Metadata::extract(&newest.payload, label_field))
        .transpose()
}

/// Container emphasis derived from the newest message's color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emphasis {
    pub color: String,
    pub styling: Styling,
}

impl Emphasis {
    /// Inline style for the header label.
    #[must_use]
    pub fn label_style(&self) -> String {
        format!("color: {};", self.color)
    }

    /// Inline style for the container.
    #[must_use]
    pub fn container_style(&self) -> String {
        match self.styling {
            Styling::LabelAndBorder => format!("border-color: {};", self.color),
            Styling::LabelBorderGlow => {
                format!("border-color: {c}; box-shadow: 0 0 10px 1px {c};", c = self.color)
            }
        }
    }
}

/// One row of the message list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub seq: u64,
    pub text: String,
}

/// Everything the panel shows, newest message first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    /// Channel id, or `[all]` for the wildcard.
    pub header_label: String,
    /// Link to the channel on the feed server.
    pub href: String,
    pub latest: Option<Metadata>,
    /// Tooltip for the latest label.
    pub summary: Option<String>,
    pub emphasis: Option<Emphasis>,
    pub entries: Vec<Entry>,
}

/// Project widget state onto the panel.
pub fn project(channel: &ChannelId, feed: &FeedState, variant: &Variant, endpoint: &Endpoint) -> Panel {
    let latest = match latest_metadata(channel, feed, variant.label_field) {
        Ok(latest) => latest,
        Err(err) => {
            leptos::logging::warn!("[WS {channel}] newest message has no display metadata: {err}");
            None
        }
    };
    let summary = latest.as_ref().and_then(|m| m.summary(variant.title));
    let emphasis = latest.as_ref().map(|m| Emphasis {
        color: m.color.clone(),
        styling: variant.styling,
    });

    Panel {
        title: variant.title.to_owned(),
        header_label: channel.display_label().to_owned(),
        href: endpoint.inspect_href(channel),
        latest,
        summary,
        emphasis,
        entries: feed
            .all()
            .map(|m| Entry { seq: m.seq, text: m.payload.clone() })
            .collect(),
    }
}
