use crate::channel::{Channel, FnObserver, Observer, Subscription, Value};
use crate::name::ActionName;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Subscribe-only view of an action's channel (the `name$` accessor).
///
/// Streams are hot: a subscriber sees only values published after it
/// registered, and completes when the bus is torn down. Errors never travel
/// through a stream.
pub struct ActionStream<T> {
    channel: Arc<Channel<T>>,
}

impl<T: Value> ActionStream<T> {
    pub(crate) const fn new(channel: Arc<Channel<T>>) -> Self {
        Self { channel }
    }

    pub fn name(&self) -> &ActionName {
        self.channel.name()
    }

    /// Registers `f` for every subsequent value. Keep the returned handle to unsubscribe.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.channel.subscribe(FnObserver(f))
    }

    /// Registers an observer that is also told when the stream completes.
    pub fn subscribe_observer(&self, observer: impl Observer<T>) -> Subscription {
        self.channel.subscribe(observer)
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.subscriber_count()
    }

    /// `true` if both views observe the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.channel, &other.channel)
    }
}

impl<T: Value + Clone> ActionStream<T> {
    /// Bridges the stream into async code.
    ///
    /// Values published from now on are queued for the returned [`Listener`];
    /// [`Listener::recv`] yields `None` once the stream has completed and the
    /// queue is drained.
    pub fn listen(&self) -> Listener<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.channel.subscribe(Forward { tx: Mutex::new(Some(tx)) });
        Listener { rx, subscription }
    }
}

impl<T> Clone for ActionStream<T> {
    fn clone(&self) -> Self {
        Self { channel: self.channel.clone() }
    }
}

impl<T> fmt::Debug for ActionStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionStream").field("channel", &self.channel).finish()
    }
}

struct Forward<T> {
    tx: Mutex<Option<mpsc::UnboundedSender<T>>>,
}

impl<T: Value + Clone> Observer<T> for Forward<T> {
    fn next(&self, value: &T) {
        if let Some(tx) = self.tx.lock().as_ref() {
            // The listener may already be gone; its drop unsubscribes shortly.
            let _ = tx.send(value.clone());
        }
    }

    fn complete(&self) {
        self.tx.lock().take();
    }
}

/// Async receiving end created by [`ActionStream::listen`].
///
/// Dropping the listener unsubscribes it.
pub struct Listener<T> {
    rx: mpsc::UnboundedReceiver<T>,
    subscription: Subscription,
}

impl<T> Listener<T> {
    /// Waits for the next value; `None` once the stream completed or the
    /// listener unsubscribed, after queued values are drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Returns a queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Stops receiving new values. Already queued values stay readable.
    pub fn unsubscribe(&mut self) {
        self.subscription.unsubscribe();
        self.rx.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.subscription.is_closed()
    }
}

impl<T> Drop for Listener<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}
