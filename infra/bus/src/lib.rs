//! # Action Bus Core
//!
//! A typed, in-process action bus that decouples event producers (UI inputs,
//! external callbacks) from consumers (state reducers, side-effect handlers).
//!
//! ## Overview
//!
//! Every action name owns one hot, multicast channel, created lazily on first
//! dispatch or stream access. Dispatching runs an optional per-action transform
//! and publishes synchronously to the subscribers registered at that moment.
//! Tearing the bus down completes every stream and makes further dispatches inert.
//!
//! ## Features
//!
//! * **Identity-stable channels**: a name resolves to the same channel for the
//!   lifetime of the bus.
//! * **Transforms**: per-action pure functions normalize raw arguments.
//! * **Two surfaces**: eagerly generated (via the `actions` macro in the
//!   `actbus` facade) or property-routed at runtime ([`Surface`]).
//! * **No mutation**: assigning to a surface is rejected.
//! * **Async bridge**: [`ActionStream::listen`] feeds a `tokio` receiver.
//!
//! # Example
//!
//! ```rust
//! use actbus_core::{BusError, TransformTable, create_bus};
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> Result<(), BusError> {
//! let transforms = TransformTable::new()
//!     .map("count", |raw: &'static str| raw.trim().parse::<i64>().unwrap_or(0));
//! let actions = create_bus(transforms);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let _sub = actions.stream::<i64>("count")?.subscribe(move |n: &i64| sink.lock().unwrap().push(*n));
//!
//! actions.dispatch::<&'static str, i64>("count", "4")?;
//! actions.dispatch::<&'static str, i64>("count", "not-a-number")?;
//! assert_eq!(*seen.lock().unwrap(), vec![4, 0]);
//!
//! assert!(actions.set("count", 1).is_err());
//! actions.teardown();
//! # Ok(())
//! # }
//! ```

mod accessor;
mod bus;
mod channel;
mod config;
mod dispatch;
mod error;
mod name;
mod registry;
mod stream;
mod transform;

pub use accessor::{Accessor, Surface, create_bus};
pub use bus::{ActionBus, TeardownGuard};
pub use channel::{Delivery, Observer, Subscription, Value};
pub use config::{BusConfig, RetiredDispatch};
pub use dispatch::Dispatcher;
pub use error::{BusError, BusErrorExt, TransformError};
pub use name::{ActionName, OBSERVABLE_SUFFIX};
pub use stream::{ActionStream, Listener};
pub use transform::{Transform, TransformTable};
