//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! Widgets read the session through `&AppState`; no network or host-window
//! calls happen here.

pub mod dialog;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod theme;
