//! # doodad-viewer
//!
//! Browser-embeddable live feed widget. Each `<doodad-viewer>` (or
//! `<thing-viewer>`) element subscribes to one feed channel over a websocket,
//! keeps every received message newest-first, and renders them in a
//! scrollable panel tinted with the newest message's color.
//!
//! Pure pieces (channel resolution, configuration, the message store, the
//! connection lifecycle and the render projection) build and test natively.
//! Everything that needs a browser is behind the `csr` feature.

pub mod components;
pub mod config;
#[cfg(feature = "csr")]
pub mod element;
pub mod net;
pub mod registry;
pub mod render;
pub mod state;

/// WASM entry point: install diagnostics and define the widget tags once.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    element::register_builtin();
}
