//! Per-key "latest request wins" bookkeeping.
//!
//! Each key (a browser session, a search box) has at most one in-flight task.
//! Starting a new task for a key aborts the previous one, so a slow older
//! response can never be delivered after a newer one was requested.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;

/// Result of [`SupersedeRegistry::run`].
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The task ran to completion.
    Completed(T),
    /// A newer task for the same key aborted this one.
    Superseded,
}

struct Slot {
    generation: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct RegistryInner {
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: AtomicU64,
}

/// Shared map from key to the abort handle of that key's in-flight task.
#[derive(Clone, Default)]
pub struct SupersedeRegistry {
    inner: Arc<RegistryInner>,
}

impl SupersedeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` as the current task for `key`, aborting any earlier one.
    ///
    /// Resolves to [`Outcome::Superseded`] if a later call for the same key
    /// aborts this task before it finishes.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from inside `task`.
    pub async fn run<F, T>(&self, key: &str, task: F) -> Outcome<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(task);
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        {
            let mut slots = self.lock();
            let slot = Slot {
                generation,
                abort: handle.abort_handle(),
            };
            if let Some(previous) = slots.insert(key.to_string(), slot) {
                tracing::debug!(key, "Superseding in-flight request");
                previous.abort.abort();
            }
        }

        let guard = SlotGuard {
            registry: self,
            key,
            generation,
            abort: handle.abort_handle(),
        };
        let joined = handle.await;
        drop(guard);

        match joined {
            Ok(value) => Outcome::Completed(value),
            Err(err) if err.is_cancelled() => Outcome::Superseded,
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Number of keys with a task in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a key's slot once its caller stops waiting, whether the task
/// finished or the caller was dropped mid-await (client disconnect).
struct SlotGuard<'a> {
    registry: &'a SupersedeRegistry,
    key: &'a str,
    generation: u64,
    abort: AbortHandle,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        // No-op when the task already finished.
        self.abort.abort();
        let mut slots = self.registry.lock();
        if slots
            .get(self.key)
            .is_some_and(|slot| slot.generation == self.generation)
        {
            slots.remove(self.key);
        }
    }
}

impl std::fmt::Debug for SupersedeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupersedeRegistry")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
