//! # Build-Once Cache
//!
//! A concurrent map from key to value where each value is built at most
//! once, no matter how many threads ask for it at the same time.
//!
//! ## Protocol
//!
//! Each key's slot is either `Building(owner)` or `Ready(value)`:
//!
//! - **Miss**: the caller marks the slot `Building` under the lock, then
//!   releases the lock and runs the builder.
//! - **Hit**: `Ready` returns a clone immediately.
//! - **In flight, other thread**: the caller waits on a condition variable
//!   until the owner publishes, then takes the published value.
//! - **In flight, same thread**: the builder re-entered its own key. That
//!   can only mean a construction cycle with no base case, so the call
//!   fails with [`CacheError::Reentrant`] instead of deadlocking.
//!
//! If a builder panics, its slot is removed and waiters are woken; the next
//! caller retries the build.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Error obtaining a cached value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The builder for a key asked for the same key again.
    #[error("cyclic schema with no terminating case")]
    Reentrant,
}

enum Slot<V> {
    Building(ThreadId),
    Ready(V),
}

/// A map whose values are built at most once per key.
pub struct BuildOnceCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    published: Condvar,
    builds: AtomicUsize,
}

impl<K, V> Default for BuildOnceCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            published: Condvar::new(),
            builds: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> BuildOnceCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, running `build` if nobody has yet.
    ///
    /// # Errors
    ///
    /// [`CacheError::Reentrant`] if called for `key` from inside the
    /// builder for `key`.
    pub fn get_or_build<F>(&self, key: &K, build: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> V,
    {
        let me = thread::current().id();
        let mut slots = self.slots.lock();
        loop {
            let owner = match slots.get(key) {
                Some(Slot::Ready(value)) => {
                    tracing::trace!("validator cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::Building(owner)) => *owner,
                None => break,
            };
            if owner == me {
                tracing::warn!("cache key re-entered while its value is being built");
                return Err(CacheError::Reentrant);
            }
            tracing::debug!("waiting for in-flight build");
            self.published.wait(&mut slots);
        }
        slots.insert(key.clone(), Slot::Building(me));
        drop(slots);

        let mut guard = BuildGuard {
            cache: self,
            key,
            published: false,
        };
        let value = build();
        guard.publish(value.clone());
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    /// The value for `key`, if it has been built.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Number of ready values.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of builder invocations that completed.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Drop every ready value.
    pub fn clear(&self) {
        self.slots
            .lock()
            .retain(|_, slot| matches!(slot, Slot::Building(_)));
    }
}

impl<K, V> fmt::Debug for BuildOnceCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOnceCache")
            .field("slots", &self.slots.lock().len())
            .field("builds", &self.builds.load(Ordering::Relaxed))
            .finish()
    }
}

/// Removes an unpublished `Building` slot on unwind.
struct BuildGuard<'a, K: Eq + Hash, V> {
    cache: &'a BuildOnceCache<K, V>,
    key: &'a K,
    published: bool,
}

impl<K: Eq + Hash + Clone, V> BuildGuard<'_, K, V> {
    fn publish(&mut self, value: V) {
        self.cache
            .slots
            .lock()
            .insert(self.key.clone(), Slot::Ready(value));
        self.published = true;
        self.cache.published.notify_all();
    }
}

impl<K: Eq + Hash, V> Drop for BuildGuard<'_, K, V> {
    fn drop(&mut self) {
        if !self.published {
            self.cache.slots.lock().remove(self.key);
            self.cache.published.notify_all();
        }
    }
}
