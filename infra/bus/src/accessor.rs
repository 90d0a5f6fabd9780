use crate::bus::ActionBus;
use crate::channel::Value;
use crate::dispatch::Dispatcher;
use crate::error::BusError;
use crate::name::ActionName;
use crate::stream::ActionStream;
use crate::transform::TransformTable;
use std::borrow::Cow;

pub(crate) const NO_SETTERS: &str = "No setters available. To emit call the property name.";

pub(crate) fn unsupported_assignment(property: &str) -> BusError {
    BusError::UnsupportedOperation {
        message: Cow::Borrowed(NO_SETTERS),
        context: Some(format!("property `{property}`").into()),
    }
}

/// What a surface property read resolves to.
#[derive(Debug)]
pub enum Accessor<A, T> {
    /// `name`: the bound dispatcher.
    Dispatch(Dispatcher<A, T>),
    /// `name$`: the action's stream.
    Observe(ActionStream<T>),
}

impl<A, T> Accessor<A, T> {
    #[must_use]
    pub fn into_dispatcher(self) -> Option<Dispatcher<A, T>> {
        match self {
            Self::Dispatch(dispatcher) => Some(dispatcher),
            Self::Observe(_) => None,
        }
    }

    #[must_use]
    pub fn into_stream(self) -> Option<ActionStream<T>> {
        match self {
            Self::Observe(stream) => Some(stream),
            Self::Dispatch(_) => None,
        }
    }
}

/// Property-routed access to a bus when the action set is only known at runtime.
///
/// Prefer a surface generated by the `actions` macro when the actions are known
/// at compile time.
#[derive(Debug, Clone)]
pub struct Surface {
    bus: ActionBus,
    transforms: TransformTable,
}

impl Surface {
    pub(crate) const fn new(bus: ActionBus, transforms: TransformTable) -> Self {
        Self { bus, transforms }
    }

    pub const fn bus(&self) -> &ActionBus {
        &self.bus
    }

    pub const fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    /// Reads `property`: `name$` yields the stream, anything else the dispatcher.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if the requested types disagree with the
    /// action's transform or channel binding.
    pub fn get<A: 'static, T: Value>(&self, property: &str) -> Result<Accessor<A, T>, BusError> {
        self.bus.property(property, &self.transforms)
    }

    /// Always fails: actions are emitted by calling them.
    ///
    /// # Errors
    /// Returns [`BusError::UnsupportedOperation`] for every property.
    #[allow(clippy::needless_pass_by_value)]
    pub fn set<V>(&self, property: &str, value: V) -> Result<(), BusError> {
        self.bus.assign(property, value)
    }

    /// # Errors
    /// See [`ActionBus::dispatcher`].
    pub fn dispatcher<A: 'static, T: Value>(
        &self,
        name: impl Into<ActionName>,
    ) -> Result<Dispatcher<A, T>, BusError> {
        self.bus.dispatcher(name, &self.transforms)
    }

    /// Dispatches `args` on `name` through this surface's transforms.
    ///
    /// # Errors
    /// See [`Dispatcher::call`].
    pub fn dispatch<A: 'static, T: Value>(
        &self,
        name: impl Into<ActionName>,
        args: A,
    ) -> Result<(), BusError> {
        self.dispatcher::<A, T>(name)?.call(args)
    }

    /// # Errors
    /// See [`ActionBus::observe`].
    pub fn stream<T: Value>(&self, name: impl Into<ActionName>) -> Result<ActionStream<T>, BusError> {
        self.bus.observe(name)
    }

    /// Closes every channel of the underlying bus.
    pub fn teardown(&self) -> usize {
        self.bus.teardown()
    }
}

/// Creates a fresh bus and a dynamic surface over it.
#[must_use]
pub fn create_bus(transforms: TransformTable) -> Surface {
    ActionBus::new().surface(transforms)
}
