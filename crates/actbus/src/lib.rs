//! Facade crate for the action bus.
//! Re-exports the core types, the [`macro@actions`] surface generator and the
//! [`macro@actbus_error`] error-enum macro.
//! Keep this crate thin: it composes the other crates and implements nothing itself.
//!
//! ## Usage
//! - Declare the action set with `#[actbus::actions]`.
//! - Build it over an [`ActionBus`] with `create(&bus, &transforms)`.
//! - Call [`ActionBus::teardown`] (or hold a [`TeardownGuard`]) when the owning scope ends.
//! - Enable the `logger` feature for `actbus::logger`, the `tracing` subscriber builder.
//!
//! ```rust
//! #[actbus::actions]
//! pub struct UiActions {
//!     search: String,
//!     #[action(input = String)]
//!     count: i64,
//! }
//!
//! # fn main() -> Result<(), actbus::BusError> {
//! let bus = actbus::ActionBus::new();
//! let transforms = actbus::TransformTable::new()
//!     .map("count", |raw: String| raw.trim().parse::<i64>().unwrap_or(0));
//! let actions = UiActions::create(&bus, &transforms)?;
//!
//! let _sub = actions.count_stream()?.subscribe(|n: &i64| assert_eq!(*n, 4));
//! actions.count("4".to_owned())?;
//! actions.teardown();
//! # Ok(())
//! # }
//! ```

pub use actbus_core::*;
pub use actbus_derive::{actbus_error, actions};

#[cfg(feature = "logger")]
pub use actbus_logger as logger;
