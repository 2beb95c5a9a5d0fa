//! The feed panel: header with channel link and latest label, plus the
//! scrollable newest-first message list.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reads the widget's `FeedState` signal and re-projects it on every change,
//! so each delivered message produces one render pass.

use leptos::prelude::*;

use crate::config::Variant;
use crate::net::channel::{ChannelId, Endpoint};
use crate::render::{Emphasis, Entry, PANEL_CSS, project};
use crate::state::feed::FeedState;

/// Live feed panel for one widget instance.
#[component]
pub fn FeedPanel(feed: RwSignal<FeedState>, channel: ChannelId, endpoint: Endpoint, variant: Variant) -> impl IntoView {
    let panel = Memo::new(move |_| feed.with(|f| project(&channel, f, &variant, &endpoint)));

    let container_style = move || {
        panel.with(|p| p.emphasis.as_ref().map(Emphasis::container_style).unwrap_or_default())
    };
    let latest_label = move || {
        panel.with(|p| {
            let meta = p.latest.as_ref()?;
            let style = p.emphasis.as_ref().map(Emphasis::label_style).unwrap_or_default();
            let title = p.summary.clone().unwrap_or_default();
            let text = format!("({})", meta.label);
            Some(view! {
                " "
                <span style=style title=title>{text}</span>
            })
        })
    };

    view! {
        <style>{PANEL_CSS}</style>
        <div class="container" style=container_style>
            <h1>
                {move || panel.with(|p| format!("{}: ", p.title))}
                <a href=move || panel.with(|p| p.href.clone()) target="_blank">
                    {move || panel.with(|p| p.header_label.clone())}
                </a>
                {latest_label}
            </h1>
            <ul class="message-list">
                <For
                    each=move || panel.with(|p| p.entries.clone())
                    key=|entry: &Entry| entry.seq
                    children=move |entry: Entry| {
                        view! {
                            <li>
                                <pre>{entry.text}</pre>
                            </li>
                        }
                    }
                />
            </ul>
        </div>
    }
}
