//! The process-wide "current instance per thread" store.
//!
//! A [`ContextRegistry`] maps the [`ThreadId`] of a thread to the instance that
//! is currently installed on it. It is meant to live in a `static` and is
//! created lazily: the backing map is only allocated by the first insertion.
//!
//! Under correct usage a thread only ever writes its own slot. Lookups by other
//! threads are allowed, which is what makes the registry inspectable for
//! debugging.
//!
//! Entries are compared by pointer identity through
//! [`is_current`](ContextRegistry::is_current). Two structurally equal
//! instances are still different entries.

use std::thread::ThreadId;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use spin::RwLock;
use triomphe::Arc;

type SlotMap<T> = HashMap<ThreadId, Arc<T>, FxBuildHasher>;

/// A keyed store from thread identity to a shared instance.
pub struct ContextRegistry<T> {
    slots: RwLock<Option<SlotMap<T>>>,
}

impl<T> ContextRegistry<T> {
    /// Creates an empty registry. Usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: RwLock::new(None),
        }
    }

    /// Returns the instance installed for `context`.
    pub fn get(&self, context: ThreadId) -> Option<Arc<T>> {
        self.slots.read().as_ref()?.get(&context).cloned()
    }

    /// Returns `true` if the instance installed for `context` is exactly
    /// `value`.
    pub fn is_current(&self, context: ThreadId, value: &Arc<T>) -> bool {
        self.slots
            .read()
            .as_ref()
            .and_then(|slots| slots.get(&context))
            .is_some_and(|current| Arc::ptr_eq(current, value))
    }

    /// Installs `value` for `context` and returns the instance it shadows.
    pub fn replace(&self, context: ThreadId, value: Arc<T>) -> Option<Arc<T>> {
        self.slots
            .write()
            .get_or_insert_with(Default::default)
            .insert(context, value)
    }

    /// Removes the entry for `context` and returns it.
    ///
    /// Removing an absent entry is a no-op that returns `None`.
    pub fn remove(&self, context: ThreadId) -> Option<Arc<T>> {
        self.slots.write().as_mut()?.remove(&context)
    }

    /// Puts the slot for `context` back to `previous`, removing it when
    /// `previous` is `None`. Returns the instance that was in the slot.
    pub fn restore(&self, context: ThreadId, previous: Option<Arc<T>>) -> Option<Arc<T>> {
        match previous {
            Some(previous) => self.replace(context, previous),
            None => self.remove(context),
        }
    }

    /// Returns the number of threads with an installed instance.
    pub fn len(&self) -> usize {
        self.slots.read().as_ref().map_or(0, HashMap::len)
    }

    /// Returns `true` if no thread has an installed instance.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `f` for every installed entry.
    ///
    /// The registry is locked for reading while `f` runs. Installing or
    /// releasing an instance from inside `f` deadlocks.
    pub fn for_each(&self, mut f: impl FnMut(ThreadId, &Arc<T>)) {
        if let Some(slots) = self.slots.read().as_ref() {
            for (&context, value) in slots {
                f(context, value);
            }
        }
    }
}

impl<T> Default for ContextRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for ContextRegistry<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("installed", &self.len())
            .finish()
    }
}
