//! Widget-owned state.
//!
//! DESIGN
//! ======
//! Each widget instance owns its own feed; nothing here is shared across
//! instances or held in globals.

pub mod feed;
