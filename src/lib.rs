//! Homeboard - state receiver for a shared household display
//!
//! Producers push screens over HTTP; the rendering front end polls the
//! current display record and draws it.

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod paths;
pub mod prefs;
pub mod templates;
