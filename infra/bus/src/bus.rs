use crate::accessor::{self, Accessor, Surface};
use crate::channel::{Channel, Delivery, Value};
use crate::config::{BusConfig, RetiredDispatch};
use crate::dispatch::Dispatcher;
use crate::error::BusError;
use crate::name::ActionName;
use crate::registry::Registry;
use crate::stream::ActionStream;
use crate::transform::{self, TransformTable};
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Debug, Default)]
struct Inner {
    config: BusConfig,
    registry: Registry,
}

/// An in-process action bus.
///
/// Holds one channel per action name, created on first dispatch or stream
/// access. The handle is cheap to clone; clones share the same channels, so any
/// number of surfaces can be built over one bus.
#[derive(Debug, Clone, Default)]
pub struct ActionBus {
    inner: Arc<Inner>,
}

impl ActionBus {
    /// Creates an empty bus with the default [`BusConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self { inner: Arc::new(Inner { config, registry: Registry::default() }) }
    }

    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Publishes `value` on `name` without any transform.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if `name` is bound to another value type,
    /// or [`BusError::Retired`] after teardown when configured to reject.
    ///
    /// # Examples
    /// ```rust
    /// use actbus_core::ActionBus;
    ///
    /// # fn main() -> Result<(), actbus_core::BusError> {
    /// let bus = ActionBus::new();
    /// let _sub = bus.observe::<String>("search")?.subscribe(|q: &String| println!("{q}"));
    /// bus.dispatch("search", String::from("abc"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn dispatch<T: Value>(&self, name: impl Into<ActionName>, value: T) -> Result<(), BusError> {
        let name = name.into();
        match self.resolve::<T>(&name)?.publish(&value) {
            Delivery::Delivered(_) => Ok(()),
            Delivery::Closed => self.on_retired_dispatch(&name),
        }
    }

    /// Returns the stream for `name`, creating its channel if needed.
    ///
    /// After teardown the stream is already complete.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if `name` is bound to another value type.
    pub fn observe<T: Value>(&self, name: impl Into<ActionName>) -> Result<ActionStream<T>, BusError> {
        self.resolve::<T>(&name.into()).map(ActionStream::new)
    }

    /// Binds a dispatcher for `name` using the transform registered in `transforms`.
    ///
    /// The channel itself is resolved on first use.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if the registered transform does not map
    /// `A` to `T`, or if no transform is registered and `A` is not `T`.
    ///
    /// # Examples
    /// ```rust
    /// use actbus_core::{ActionBus, TransformTable};
    ///
    /// # fn main() -> Result<(), actbus_core::BusError> {
    /// let bus = ActionBus::new();
    /// let transforms = TransformTable::new().map("count", |raw: &'static str| raw.parse::<i64>().unwrap_or(0));
    /// let count = bus.dispatcher::<&'static str, i64>("count", &transforms)?;
    /// count.call("4")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn dispatcher<A: 'static, T: Value>(
        &self,
        name: impl Into<ActionName>,
        transforms: &TransformTable,
    ) -> Result<Dispatcher<A, T>, BusError> {
        let name = name.into();
        let transform = transforms.get::<A, T>(&name)?;
        if transform.is_none() {
            transform::ensure_passthrough::<A, T>(&name)?;
        }
        Ok(Dispatcher::new(name, self.clone(), transform))
    }

    /// Resolves a surface property: names ending in `$` yield the stream of the
    /// action without the suffix, every other name yields its dispatcher.
    ///
    /// # Errors
    /// See [`ActionBus::observe`] and [`ActionBus::dispatcher`].
    pub fn property<A: 'static, T: Value>(
        &self,
        property: &str,
        transforms: &TransformTable,
    ) -> Result<Accessor<A, T>, BusError> {
        match ActionName::parse_property(property) {
            (name, true) => self.observe(name).map(Accessor::Observe),
            (name, false) => self.dispatcher(name, transforms).map(Accessor::Dispatch),
        }
    }

    /// Rejects assignment to a surface property.
    ///
    /// # Errors
    /// Always returns [`BusError::UnsupportedOperation`].
    #[allow(clippy::needless_pass_by_value, clippy::unused_self)]
    pub fn assign<V>(&self, property: &str, _value: V) -> Result<(), BusError> {
        Err(accessor::unsupported_assignment(property))
    }

    /// Wraps this bus in a property-routed [`Surface`] using `transforms`.
    #[must_use]
    pub fn surface(&self, transforms: TransformTable) -> Surface {
        Surface::new(self.clone(), transforms)
    }

    /// Closes every channel, completing all streams, and retires the bus.
    ///
    /// Idempotent. Returns how many channels this call closed.
    pub fn teardown(&self) -> usize {
        let closed = self.inner.registry.retire();
        debug!(bus = %self.inner.config.label, closed, "Action bus torn down");
        closed
    }

    pub fn is_retired(&self) -> bool {
        self.inner.registry.is_retired()
    }

    /// Number of channels created so far.
    pub fn channel_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Returns a guard that tears the bus down when dropped.
    #[must_use = "the bus is torn down as soon as the guard is dropped"]
    pub fn teardown_guard(&self) -> TeardownGuard {
        TeardownGuard { bus: self.clone() }
    }

    /// `true` if both handles share the same channels.
    #[must_use]
    pub fn same_bus(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn resolve<T: Value>(&self, name: &ActionName) -> Result<Arc<Channel<T>>, BusError> {
        self.inner.registry.resolve(name)
    }

    pub(crate) fn on_retired_dispatch(&self, name: &ActionName) -> Result<(), BusError> {
        let label = &self.inner.config.label;
        match self.inner.config.retired_dispatch {
            RetiredDispatch::Ignore => {
                trace!(bus = %label, action = %name, "Dispatch after teardown ignored");
                Ok(())
            },
            RetiredDispatch::Warn => {
                warn!(bus = %label, action = %name, "Dispatch after teardown dropped");
                Ok(())
            },
            RetiredDispatch::Reject => Err(BusError::Retired {
                message: "the bus has been torn down".into(),
                context: Some(format!("action `{name}`").into()),
            }),
        }
    }
}

/// Tears the bus down when dropped.
///
/// Hold it in the scope that owns the bus.
#[derive(Debug)]
pub struct TeardownGuard {
    bus: ActionBus,
}

impl TeardownGuard {
    pub const fn bus(&self) -> &ActionBus {
        &self.bus
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.bus.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_is_idempotent_and_counts_channels() {
        let bus = ActionBus::new();
        bus.observe::<u8>("a").unwrap();
        bus.observe::<u8>("b").unwrap();

        assert_eq!(bus.teardown(), 2);
        assert_eq!(bus.teardown(), 0);
        assert!(bus.is_retired());
        assert_eq!(bus.channel_count(), 2);
    }

    #[test]
    fn retired_dispatch_modes() {
        for mode in [RetiredDispatch::Ignore, RetiredDispatch::Warn] {
            let bus = ActionBus::with_config(BusConfig::default().with_retired_dispatch(mode));
            bus.teardown();
            assert!(bus.dispatch("late", 1_u8).is_ok());
        }

        let bus = ActionBus::with_config(
            BusConfig::default().with_label("strict").with_retired_dispatch(RetiredDispatch::Reject),
        );
        bus.teardown();
        let err = bus.dispatch("late", 1_u8).unwrap_err();
        assert!(matches!(err, BusError::Retired { .. }));
        assert_eq!(bus.config().label, "strict");
    }

    #[test]
    fn guard_tears_down_on_drop() {
        let bus = ActionBus::new();
        let stream = bus.observe::<u8>("tick").unwrap();
        {
            let guard = bus.teardown_guard();
            assert!(guard.bus().same_bus(&bus));
            assert!(!stream.is_closed());
        }
        assert!(stream.is_closed());
        assert!(bus.is_retired());
    }

    #[test]
    fn assign_is_always_unsupported() {
        let bus = ActionBus::new();
        let err = bus.assign("search$", "abc").unwrap_err();
        assert!(matches!(err, BusError::UnsupportedOperation { .. }));
        assert_eq!(
            err.to_string(),
            "Unsupported operation (property `search$`): No setters available. To emit call the property name."
        );
        assert_eq!(bus.channel_count(), 0);
    }

    #[test]
    fn property_with_mismatched_transform_types_fails() {
        let bus = ActionBus::new();
        let transforms = TransformTable::new().map("count", |raw: String| raw.len());
        let err = bus.property::<u8, usize>("count", &transforms).unwrap_err();
        assert!(matches!(err, BusError::TypeMismatch { .. }));

        // The stream accessor does not consult transforms.
        assert!(bus.property::<u8, usize>("count$", &transforms).is_ok());
    }
}
