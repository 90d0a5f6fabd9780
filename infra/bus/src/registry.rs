use crate::channel::{Channel, Value};
use crate::error::BusError;
use crate::name::ActionName;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Type-erased view of a channel kept by the registry.
trait ErasedChannel: Send + Sync {
    fn close(&self) -> bool;
    fn value_type(&self) -> &'static str;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Value> ErasedChannel for Channel<T> {
    fn close(&self) -> bool {
        Self::close(self)
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[derive(Default)]
struct Arena {
    channels: Vec<Arc<dyn ErasedChannel>>,
    index: FxHashMap<ActionName, usize>,
    retired: bool,
}

/// Lazily populated mapping from action name to channel.
///
/// A name resolves to the same channel for the lifetime of the registry. Once
/// retired, channels created for names never touched before start out closed.
#[derive(Default)]
pub(crate) struct Registry {
    arena: RwLock<Arena>,
}

impl Registry {
    pub(crate) fn resolve<T: Value>(&self, name: &ActionName) -> Result<Arc<Channel<T>>, BusError> {
        let existing = {
            let arena = self.arena.read();
            arena.index.get(name.as_str()).map(|&slot| arena.channels[slot].clone())
        };

        let erased = match existing {
            Some(erased) => erased,
            None => {
                let mut arena = self.arena.write();
                // Another caller may have created it between the two locks.
                if let Some(&slot) = arena.index.get(name.as_str()) {
                    arena.channels[slot].clone()
                } else {
                    let channel = Channel::<T>::new(name.clone());
                    if arena.retired {
                        channel.close();
                    }
                    trace!(
                        action = %name,
                        value = type_name::<T>(),
                        retired = arena.retired,
                        "Initializing new action channel"
                    );
                    let erased: Arc<dyn ErasedChannel> = Arc::new(channel);
                    let slot = arena.channels.len();
                    arena.channels.push(erased.clone());
                    arena.index.insert(name.clone(), slot);
                    erased
                }
            },
        };

        let bound = erased.value_type();
        erased.into_any().downcast::<Channel<T>>().map_err(|_| {
            BusError::type_mismatch(
                format!("channel carries {bound}, requested {}", type_name::<T>()),
                name,
            )
        })
    }

    /// Marks the registry retired and closes every channel in creation order.
    ///
    /// Returns how many channels this call closed.
    pub(crate) fn retire(&self) -> usize {
        let channels = {
            let mut arena = self.arena.write();
            arena.retired = true;
            arena.channels.clone()
        };

        // Completion callbacks may touch the registry, so close outside the lock.
        channels.iter().filter(|channel| channel.close()).count()
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.arena.read().retired
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.read().channels.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.read();
        f.debug_struct("Registry")
            .field("channels", &arena.channels.len())
            .field("retired", &arena.retired)
            .finish()
    }
}
