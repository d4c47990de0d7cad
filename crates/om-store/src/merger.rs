//! `GlobalHitMerger` — the one store written by more than one thread.
//!
//! # Locking
//!
//! A single `Mutex` guards the whole `ModuleId → HitStats` map.  A merge
//! holds it only while appending one thread's columns, so the critical
//! section is O(hits of that thread), not O(total hits).  Concatenation order
//! across threads is whatever order the threads reach the lock in; consumers
//! that need time order sort after every merge has finished.
//!
//! # Generations
//!
//! [`reset`](GlobalHitMerger::reset) clears the store and starts a new
//! generation while holding the lock.  [`merge_at`](GlobalHitMerger::merge_at)
//! compares the caller's generation under the same lock, so a buffer filled
//! before a reset is dropped even when its merge reaches the lock after the
//! reset.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use om_core::{HitStats, ModuleId};
use tracing::{debug, trace, warn};

use crate::ThreadLocalHitStore;

#[derive(Debug, Default)]
struct Merged {
    generation: u64,
    modules:    BTreeMap<ModuleId, HitStats>,
}

#[derive(Debug, Default)]
pub struct GlobalHitMerger {
    merged:     Mutex<Merged>,
    // Mirrors `merged.generation`; written only under the lock.
    generation: AtomicU64,
}

impl GlobalHitMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.  Producers tag their buffers with it.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Move every hit of `local` into the merged store and leave `local`
    /// empty.  Returns the number of hits moved; merging an empty store is a
    /// no-op that returns 0.
    pub fn merge(&self, local: &mut ThreadLocalHitStore) -> usize {
        self.merge_at(local, self.generation())
    }

    /// Like [`merge`](Self::merge), but `local` was filled under
    /// `generation`.  If a reset has happened since, its hits are discarded
    /// and 0 is returned.
    pub fn merge_at(&self, local: &mut ThreadLocalHitStore, generation: u64) -> usize {
        let mut modules = local.take_modules();
        if modules.values().all(HitStats::is_empty) {
            return 0;
        }

        let mut merged = self.lock();
        if merged.generation != generation {
            drop(merged);
            warn!(
                hits = modules.values().map(HitStats::len).sum::<usize>(),
                "discarding hits buffered before reset"
            );
            return 0;
        }

        let mut moved = 0;
        for (module, stats) in modules.iter_mut() {
            if stats.is_empty() {
                continue;
            }
            debug_assert!(stats.check_columns().is_ok());
            moved += stats.len();
            trace!(%module, hits = stats.len(), "merging module buffer");
            merged.modules.entry(*module).or_default().append(stats);
        }
        drop(merged);

        debug!(hits = moved, modules = modules.len(), "merged thread-local hits");
        moved
    }

    /// Clone of the merged hits of `module` (empty if nothing was merged).
    pub fn merged_hits(&self, module: ModuleId) -> HitStats {
        self.lock().modules.get(&module).cloned().unwrap_or_default()
    }

    /// Number of merged hits for `module`.
    pub fn merged_count(&self, module: ModuleId) -> usize {
        self.lock().modules.get(&module).map_or(0, HitStats::len)
    }

    /// Run `f` on the merged hits of `module` under the lock.  `None` is
    /// passed when the module has never received a hit.
    pub fn with_module_mut<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>) -> R,
    ) -> R {
        let mut merged = self.lock();
        f(merged.modules.get_mut(&module))
    }

    /// Modules that hold at least one merged hit, ascending.
    pub fn modules(&self) -> Vec<ModuleId> {
        self.lock()
            .modules
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(&m, _)| m)
            .collect()
    }

    /// Drop every merged hit and start a new generation, which is returned.
    pub fn reset(&self) -> u64 {
        let mut merged = self.lock();
        merged.modules.clear();
        merged.generation += 1;
        self.generation.store(merged.generation, Ordering::Release);
        merged.generation
    }

    // A panic while holding the lock cannot leave columns of unequal length:
    // `HitStats::append` moves whole columns.  Recover instead of propagating.
    fn lock(&self) -> MutexGuard<'_, Merged> {
        self.merged.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
