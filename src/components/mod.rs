//! Leptos views mounted inside the custom element.

pub mod feed_panel;
