//! Line-driven demo of the action bus.
//!
//! Two actions, `search` and `count`, receive raw widget payloads, coerce them
//! through transforms and drive a small view that is re-rendered after every
//! command read from the input.

pub mod app;
pub mod coerce;
pub mod config;
