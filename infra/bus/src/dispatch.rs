use crate::bus::ActionBus;
use crate::channel::{Channel, Delivery, Value};
use crate::error::BusError;
use crate::name::ActionName;
use crate::stream::ActionStream;
use crate::transform::{self, Transform};
use std::any::type_name;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Callable write side of one action.
///
/// `A` is the raw argument type accepted by [`Dispatcher::call`] (a tuple when the
/// transform takes several arguments) and `T` the value published on the channel.
/// The channel is resolved on first use and cached; clones share the cache.
pub struct Dispatcher<A, T> {
    name: ActionName,
    bus: ActionBus,
    transform: Option<Transform<A, T>>,
    channel: Arc<OnceLock<Arc<Channel<T>>>>,
}

impl<A: 'static, T: Value> Dispatcher<A, T> {
    pub(crate) fn new(name: ActionName, bus: ActionBus, transform: Option<Transform<A, T>>) -> Self {
        Self { name, bus, transform, channel: Arc::new(OnceLock::new()) }
    }

    pub const fn name(&self) -> &ActionName {
        &self.name
    }

    pub const fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Dispatches `args`: resolves the channel, normalizes the arguments and
    /// publishes the result synchronously to the current subscribers.
    ///
    /// # Errors
    /// * [`BusError::TransformFailed`] when the transform rejects `args`; nothing
    ///   is published.
    /// * [`BusError::TypeMismatch`] when the name is bound to another value type.
    /// * [`BusError::Retired`] after teardown, if the bus is configured to reject.
    pub fn call(&self, args: A) -> Result<(), BusError> {
        self.emit(args).map(|_| ())
    }

    /// Like [`Dispatcher::call`], reporting how many subscribers got the value.
    ///
    /// # Errors
    /// See [`Dispatcher::call`].
    pub fn emit(&self, args: A) -> Result<Delivery, BusError> {
        let channel = self.channel()?;
        let value = match &self.transform {
            Some(transform) => transform::run(transform, &self.name, args)?,
            None => transform::passthrough(&self.name, args)?,
        };

        let delivery = channel.publish(&value);
        if delivery.is_closed() {
            self.bus.on_retired_dispatch(&self.name)?;
        }
        Ok(delivery)
    }

    /// The `name$` accessor for this action.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if the name is bound to another value type.
    pub fn stream(&self) -> Result<ActionStream<T>, BusError> {
        self.channel().map(ActionStream::new)
    }

    fn channel(&self) -> Result<Arc<Channel<T>>, BusError> {
        if let Some(channel) = self.channel.get() {
            return Ok(channel.clone());
        }
        let channel = self.bus.resolve::<T>(&self.name)?;
        Ok(self.channel.get_or_init(|| channel).clone())
    }
}

impl<A, T> Clone for Dispatcher<A, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            bus: self.bus.clone(),
            transform: self.transform.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl<A, T> fmt::Debug for Dispatcher<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("args", &type_name::<A>())
            .field("value", &type_name::<T>())
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ActionBus, BusError, Delivery, TransformTable};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn call_resolves_lazily_and_publishes() {
        let bus = ActionBus::new();
        let search = bus.dispatcher::<String, String>("search", &TransformTable::new()).unwrap();
        assert_eq!(bus.channel_count(), 0);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = search.stream().unwrap().subscribe(move |v: &String| sink.lock().push(v.clone()));

        search.call("abc".to_owned()).unwrap();
        assert_eq!(*seen.lock(), vec!["abc".to_owned()]);
        assert_eq!(bus.channel_count(), 1);
    }

    #[test]
    fn transform_failure_propagates_without_publishing() {
        let bus = ActionBus::new();
        let transforms = TransformTable::new().try_map("count", |raw: String| raw.parse::<i64>());
        let count = bus.dispatcher::<String, i64>("count", &transforms).unwrap();

        let hits = Arc::new(Mutex::new(0));
        let sink = hits.clone();
        let _sub = count.stream().unwrap().subscribe(move |_: &i64| *sink.lock() += 1);

        let err = count.call("nope".to_owned()).unwrap_err();
        assert!(matches!(err, BusError::TransformFailed { .. }));
        assert_eq!(*hits.lock(), 0);

        count.call("3".to_owned()).unwrap();
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn clones_share_the_resolved_channel() {
        let bus = ActionBus::new();
        let first = bus.dispatcher::<u8, u8>("tick", &TransformTable::new()).unwrap();
        let second = first.clone();

        assert!(first.stream().unwrap().same_channel(&second.stream().unwrap()));
        let _sub = second.stream().unwrap().subscribe(|_: &u8| {});
        assert_eq!(first.emit(1).unwrap(), Delivery::Delivered(1));

        bus.teardown();
        assert_eq!(first.emit(2).unwrap(), Delivery::Closed);
        assert!(!first.has_transform());
        assert_eq!(second.name().as_str(), "tick");
    }
}
