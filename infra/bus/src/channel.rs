use crate::name::ActionName;
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Marker trait for values that can travel through a channel.
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Value: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Value for T {}

/// Receiving side of a channel registration.
pub trait Observer<T>: Send + Sync + 'static {
    /// Called once per published value, in publish order.
    fn next(&self, value: &T);

    /// Called at most once, when the channel closes while this observer is registered.
    fn complete(&self) {}
}

/// Adapts a closure into an [`Observer`] without a completion callback.
pub(crate) struct FnObserver<F>(pub(crate) F);

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    fn next(&self, value: &T) {
        (self.0)(value);
    }
}

/// Outcome of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The value reached this many subscribers (possibly zero).
    Delivered(usize),
    /// The channel is closed; nothing was delivered.
    Closed,
}

impl Delivery {
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

struct Registration<T> {
    id: u64,
    active: Arc<AtomicBool>,
    observer: Box<dyn Observer<T>>,
}

impl<T> Registration<T> {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Returns `true` only for the call that flipped the registration off.
    fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}

struct State<T> {
    subscribers: Vec<Arc<Registration<T>>>,
    closed: bool,
}

/// A named, multicast, hot event source without replay.
///
/// Publishes on one channel are serialized, so every subscriber observes values
/// in publish order. The serializing lock is re-entrant: a subscriber may publish
/// on the same channel from its callback, and the nested value is delivered
/// before the outer publish moves on. Callbacks that publish onto other channels
/// from several threads at once must not form a cycle.
pub(crate) struct Channel<T> {
    name: ActionName,
    next_id: AtomicU64,
    delivery: ReentrantMutex<()>,
    state: Mutex<State<T>>,
}

impl<T: Value> Channel<T> {
    pub(crate) fn new(name: ActionName) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            delivery: ReentrantMutex::new(()),
            state: Mutex::new(State { subscribers: Vec::new(), closed: false }),
        }
    }

    pub(crate) const fn name(&self) -> &ActionName {
        &self.name
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Registers `observer` for every value published after this call.
    ///
    /// On a closed channel the observer is completed immediately and the returned
    /// subscription is already closed.
    pub(crate) fn subscribe(self: &Arc<Self>, observer: impl Observer<T>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let registration =
            Arc::new(Registration { id, active: active.clone(), observer: Box::new(observer) });

        {
            let mut state = self.state.lock();
            if !state.closed {
                state.subscribers.push(registration);
                debug!(action = %self.name, id, "Subscriber registered");
                let channel: Weak<dyn Detach> = Arc::downgrade(self) as Weak<dyn Detach>;
                return Subscription { id, active, channel };
            }
        }

        trace!(action = %self.name, "Subscribed to a closed channel; completing immediately");
        registration.deactivate();
        registration.observer.complete();
        Subscription { id, active, channel: Weak::<Self>::new() as Weak<dyn Detach> }
    }

    /// Delivers `value` synchronously to every subscriber registered at call time.
    ///
    /// A subscriber that unregisters while the delivery is running is skipped if
    /// it has not been reached yet.
    pub(crate) fn publish(&self, value: &T) -> Delivery {
        let _serial = self.delivery.lock();

        let snapshot = {
            let state = self.state.lock();
            if state.closed {
                return Delivery::Closed;
            }
            state.subscribers.clone()
        };

        let mut delivered = 0;
        for registration in &snapshot {
            if registration.is_active() {
                registration.observer.next(value);
                delivered += 1;
            }
        }

        trace!(action = %self.name, delivered, "Value published");
        Delivery::Delivered(delivered)
    }

    /// Moves the channel to its terminal state and completes every active subscriber.
    ///
    /// Returns `false` if the channel was already closed.
    pub(crate) fn close(&self) -> bool {
        let _serial = self.delivery.lock();

        let drained = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            std::mem::take(&mut state.subscribers)
        };

        let completed = drained.iter().filter(|r| r.deactivate()).inspect(|r| r.observer.complete()).count();
        debug!(action = %self.name, completed, "Channel closed");
        true
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("subscribers", &state.subscribers.len())
            .field("closed", &state.closed)
            .finish()
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T: Value> Detach for Channel<T> {
    fn detach(&self, id: u64) {
        self.state.lock().subscribers.retain(|r| r.id != id);
        trace!(action = %self.name, id, "Subscriber removed");
    }
}

/// Handle to a channel registration.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    channel: Weak<dyn Detach>,
}

impl Subscription {
    /// Stops delivery to this registration. Takes effect before the next value is
    /// delivered to it, including one currently being published. Idempotent.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::AcqRel)
            && let Some(channel) = self.channel.upgrade()
        {
            channel.detach(self.id);
        }
    }

    /// `true` once unsubscribed or once the channel has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.active.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn channel() -> Arc<Channel<u32>> {
        Arc::new(Channel::new(ActionName::from("test")))
    }

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Observer<u32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, FnObserver(move |v: &u32| sink.lock().push(*v)))
    }

    struct Completion(Arc<AtomicUsize>);

    impl Observer<u32> for Completion {
        fn next(&self, _: &u32) {}

        fn complete(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn publish_reaches_current_subscribers_only() {
        let channel = channel();
        let (early, observer) = recorder();
        let _early = channel.subscribe(observer);

        assert_eq!(channel.publish(&1), Delivery::Delivered(1));

        let (late, observer) = recorder();
        let _late = channel.subscribe(observer);
        assert_eq!(channel.publish(&2), Delivery::Delivered(2));

        assert_eq!(*early.lock(), vec![1, 2]);
        assert_eq!(*late.lock(), vec![2]);
    }

    #[test]
    fn publish_without_subscribers_is_delivered_to_none() {
        assert_eq!(channel().publish(&7), Delivery::Delivered(0));
    }

    #[test]
    fn unsubscribe_stops_delivery_and_is_idempotent() {
        let channel = channel();
        let (seen, observer) = recorder();
        let sub = channel.subscribe(observer);

        channel.publish(&1);
        sub.unsubscribe();
        sub.unsubscribe();
        channel.publish(&2);

        assert!(sub.is_closed());
        assert_eq!(channel.subscriber_count(), 0);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn unsubscribe_during_delivery_skips_pending_subscriber() {
        let channel = channel();
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = victim.clone();
        let _killer = channel.subscribe(FnObserver(move |_: &u32| {
            if let Some(sub) = slot.lock().as_ref() {
                sub.unsubscribe();
            }
        }));
        let (seen, observer) = recorder();
        *victim.lock() = Some(channel.subscribe(observer));

        assert_eq!(channel.publish(&1), Delivery::Delivered(1));
        channel.publish(&2);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn close_completes_once_and_blocks_further_publishes() {
        let channel = channel();
        let completions = Arc::new(AtomicUsize::new(0));
        let sub = channel.subscribe(Completion(completions.clone()));

        assert!(channel.close());
        assert!(!channel.close());

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(sub.is_closed());
        assert!(channel.is_closed());
        assert_eq!(channel.publish(&3), Delivery::Closed);
    }

    #[test]
    fn close_skips_unsubscribed_observers() {
        let channel = channel();
        let completions = Arc::new(AtomicUsize::new(0));
        let sub = channel.subscribe(Completion(completions.clone()));
        sub.unsubscribe();

        channel.close();
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscribe_after_close_completes_immediately() {
        let channel = channel();
        channel.close();

        let completions = Arc::new(AtomicUsize::new(0));
        let sub = channel.subscribe(Completion(completions.clone()));

        assert!(sub.is_closed());
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn reentrant_publish_is_delivered_in_nested_order() {
        let channel = channel();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::downgrade(&channel);
        let sink = seen.clone();
        let _echo = channel.subscribe(FnObserver(move |v: &u32| {
            sink.lock().push(*v);
            if *v == 1
                && let Some(channel) = inner.upgrade()
            {
                channel.publish(&10);
            }
        }));

        channel.publish(&1);
        channel.publish(&2);
        assert_eq!(*seen.lock(), vec![1, 10, 2]);
    }

    #[test]
    fn subscriber_added_during_delivery_misses_current_value() {
        let channel = channel();
        let (seen, observer) = recorder();
        let pending = Arc::new(Mutex::new(Some(observer)));
        let subs = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::downgrade(&channel);
        let (slot, held) = (pending.clone(), subs.clone());
        let _adder = channel.subscribe(FnObserver(move |_: &u32| {
            if let (Some(observer), Some(channel)) = (slot.lock().take(), inner.upgrade()) {
                held.lock().push(channel.subscribe(observer));
            }
        }));

        channel.publish(&1);
        channel.publish(&2);
        assert_eq!(*seen.lock(), vec![2]);
    }
}
