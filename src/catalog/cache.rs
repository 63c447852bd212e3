use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

use crate::core::Result;

/// What the cache asks its fetch callback to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest<'a> {
    /// First load of this cache generation
    Initial,
    /// Reload of ids that were missing after the initial load
    Bounded(&'a [u32]),
}

#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<u32, T>,
    /// Ids a bounded reload was already issued for
    attempted: HashSet<u32>,
    initial_attempted: bool,
    in_flight: bool,
    generation: u64,
}

impl<T> CacheState<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            attempted: HashSet::new(),
            initial_attempted: false,
            in_flight: false,
            generation: 0,
        }
    }

    fn missing(&self, ids: &[u32]) -> Vec<u32> {
        let mut missing: Vec<u32> = ids
            .iter()
            .copied()
            .filter(|id| !self.entries.contains_key(id))
            .filter(|id| !self.initial_attempted || !self.attempted.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

/// Per-connection map from catalog id to resolved type.
///
/// Loads are single-flight: while one thread runs a catalog query every other
/// thread that needs a missing id waits for it instead of issuing its own.
/// Each id gets at most one bounded reload per generation.
#[derive(Debug)]
pub struct ConnectionTypeCache<T> {
    state: Mutex<CacheState<T>>,
    loaded: Condvar,
}

impl<T: Clone> Default for ConnectionTypeCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ConnectionTypeCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::new()),
            loaded: Condvar::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<T> {
        self.state.lock().entries.get(&id).cloned()
    }

    pub fn insert(&self, id: u32, entry: T) {
        self.state.lock().entries.insert(id, entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything, including the record of attempted reloads.
    ///
    /// A load still running when this is called finishes, but its results
    /// are discarded.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.attempted.clear();
        state.initial_attempted = false;
        state.generation += 1;
        debug!(generation = state.generation, "type cache invalidated");
    }

    /// Make sure every id in `ids` has been loaded or given up on.
    ///
    /// `fetch` runs without the lock held. Its error is returned to the thread
    /// that ran it; waiting threads just see the ids still missing.
    pub fn ensure_loaded<F>(&self, ids: &[u32], mut fetch: F) -> Result<()>
    where
        F: FnMut(LoadRequest<'_>) -> Result<Vec<(u32, T)>>,
    {
        let mut state = self.state.lock();
        loop {
            let missing = state.missing(ids);
            if missing.is_empty() {
                return Ok(());
            }
            if state.in_flight {
                self.loaded.wait(&mut state);
                continue;
            }

            let initial = !state.initial_attempted;
            if initial {
                state.initial_attempted = true;
            } else {
                state.attempted.extend(missing.iter().copied());
            }
            state.in_flight = true;
            let generation = state.generation;

            let request = if initial { LoadRequest::Initial } else { LoadRequest::Bounded(&missing) };
            let outcome =
                MutexGuard::unlocked(&mut state, || panic::catch_unwind(AssertUnwindSafe(|| fetch(request))));

            // waiters must wake even when the fetch panicked
            state.in_flight = false;
            self.loaded.notify_all();

            let entries = match outcome {
                Ok(result) => result?,
                Err(payload) => {
                    drop(state);
                    panic::resume_unwind(payload);
                }
            };
            if state.generation == generation {
                state.entries.extend(entries);
            } else {
                debug!(stale = entries.len(), "discarding types loaded before invalidation");
            }
        }
    }
}
