//! `HitManager` and `HitHandle` — the run-wide hit context.
//!
//! # Lifecycle
//!
//! One `HitManager` is created at startup and owns all shared state.  Worker
//! code receives a [`HitHandle`] (cheap to clone, `Send + Sync`) instead of
//! reaching for a global.  Handles hold only a weak reference: once the
//! manager is shut down or dropped, every handle call fails with
//! [`HitError::NotInitialized`].
//!
//! # Thread-local buffers
//!
//! Each thread keeps its own [`ThreadLocalHitStore`] per manager in a
//! `thread_local!` slot keyed by manager id.  The slot is created on the
//! thread's first hit and released by `merge_thread_local`.  A thread that
//! dies before merging loses its buffer.
//!
//! A slot holds a weak liveness token of its manager.  When a manager is
//! dropped, only the dropping thread's slot goes with it; slots left on other
//! threads are removed the next time that thread creates a slot or merges for
//! any manager, so long-lived pool threads do not keep dead buffers.
//!
//! `reset` starts a new merger generation.  Buffers filled under an older
//! generation are discarded the next time their thread touches the manager,
//! and a merge that was already in flight is rejected under the merge lock, so
//! a reset never lets pre-reset hits leak into the next run.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use om_core::{HitError, HitRecord, HitResult, HitStats, ModuleId};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::{GlobalHitMerger, SensorRegistry, ThreadLocalHitStore};

/// Source of unique manager ids for the thread-local slot map.
static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(0);

struct LocalSlot {
    generation: u64,
    owner:      Weak<()>,
    store:      ThreadLocalHitStore,
}

/// Drop slots whose manager no longer exists.
fn sweep_orphans(slots: &mut FxHashMap<u64, LocalSlot>) {
    let before = slots.len();
    slots.retain(|_, slot| slot.owner.strong_count() > 0);
    if slots.len() != before {
        debug!(slots = before - slots.len(), "dropped thread-local buffers of dead managers");
    }
}

thread_local! {
    static LOCAL_STORES: RefCell<FxHashMap<u64, LocalSlot>> =
        RefCell::new(FxHashMap::default());
}

/// Number of thread-local slots on the calling thread, live or orphaned.
#[cfg(test)]
pub(crate) fn local_slot_count() -> usize {
    LOCAL_STORES.with(|cell| cell.borrow().len())
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct Shared {
    id:       u64,
    alive:    Arc<()>,
    merger:   GlobalHitMerger,
    registry: RwLock<SensorRegistry>,
}

impl Shared {
    /// Run `f` on this thread's buffer, creating it if needed.
    fn with_local<R>(&self, f: impl FnOnce(&mut ThreadLocalHitStore) -> R) -> R {
        let generation = self.merger.generation();
        LOCAL_STORES.with(|cell| {
            let mut slots = cell.borrow_mut();
            if !slots.contains_key(&self.id) {
                sweep_orphans(&mut slots);
                debug!(manager = self.id, "created thread-local hit store");
            }
            let slot = slots.entry(self.id).or_insert_with(|| LocalSlot {
                generation,
                owner: Arc::downgrade(&self.alive),
                store: ThreadLocalHitStore::new(),
            });
            self.refresh(slot, generation);
            f(&mut slot.store)
        })
    }

    /// Run `f` on this thread's buffer if one exists, without creating it.
    fn peek_local<R>(&self, f: impl FnOnce(Option<&ThreadLocalHitStore>) -> R) -> R {
        let generation = self.merger.generation();
        LOCAL_STORES.with(|cell| {
            let mut slots = cell.borrow_mut();
            match slots.get_mut(&self.id) {
                Some(slot) => {
                    self.refresh(slot, generation);
                    f(Some(&slot.store))
                }
                None => f(None),
            }
        })
    }

    fn refresh(&self, slot: &mut LocalSlot, generation: u64) {
        if slot.generation != generation {
            if !slot.store.is_empty() {
                warn!(
                    manager = self.id,
                    hits = slot.store.total_hits(),
                    "discarding thread-local hits buffered before reset"
                );
            }
            slot.store.reset();
            slot.generation = generation;
        }
    }

    fn drop_local(&self) {
        // `try_with`: may run during thread teardown.
        let _ = LOCAL_STORES.try_with(|cell| cell.borrow_mut().remove(&self.id));
    }

    /// Remove this thread's slot and merge whatever it held.
    fn merge_thread_local(&self) -> usize {
        let slot = LOCAL_STORES.with(|cell| {
            let mut slots = cell.borrow_mut();
            let slot = slots.remove(&self.id);
            sweep_orphans(&mut slots);
            slot
        });
        match slot {
            Some(mut slot) => self.merger.merge_at(&mut slot.store, slot.generation),
            None => 0,
        }
    }

    fn reset(&self) {
        self.drop_local();
        let generation = self.merger.reset();
        info!(manager = self.id, generation, "hit manager reset");
    }

    fn registry(&self) -> std::sync::RwLockReadGuard<'_, SensorRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> std::sync::RwLockWriteGuard<'_, SensorRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_merged_module<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> R {
        let sensor_count = self.registry().sensor_count(module);
        self.merger.with_module_mut(module, |stats| f(stats, sensor_count))
    }
}

// ── HitManager ────────────────────────────────────────────────────────────────

/// Owner of the run-wide hit state.  Create once, pass [`HitHandle`]s to
/// workers, and query merged results here after every worker has merged.
pub struct HitManager {
    shared: Arc<Shared>,
}

impl Default for HitManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HitManager {
    pub fn new() -> Self {
        let id = NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed);
        debug!(manager = id, "hit manager initialized");
        Self {
            shared: Arc::new(Shared {
                id,
                alive:    Arc::new(()),
                merger:   GlobalHitMerger::new(),
                registry: RwLock::new(SensorRegistry::new()),
            }),
        }
    }

    /// A handle for producer threads.
    pub fn handle(&self) -> HitHandle {
        HitHandle { shared: Arc::downgrade(&self.shared) }
    }

    /// Record how many sensors `module` has.  Call during detector setup.
    pub fn register_sensor_count(&self, module: ModuleId, sensor_count: usize) {
        self.shared.registry_mut().register(module, sensor_count);
    }

    /// Next unused module index, for setup code that places modules in turn.
    pub fn next_module_index(&self) -> ModuleId {
        self.shared.registry_mut().next_module_index()
    }

    pub fn sensor_count(&self, module: ModuleId) -> Option<usize> {
        self.shared.registry().sensor_count(module)
    }

    /// Number of modules with a registered sensor count.
    pub fn number_of_modules(&self) -> usize {
        self.shared.registry().len()
    }

    /// Registered modules in ascending order.
    pub fn modules(&self) -> Vec<ModuleId> {
        self.shared.registry().modules().collect()
    }

    /// Clone of everything merged so far for `module`.
    ///
    /// Only complete once every contributing thread has merged.
    pub fn merged_hits(&self, module: ModuleId) -> HitStats {
        self.shared.merger.merged_hits(module)
    }

    /// Run `f` on the merged hits of `module` together with its registered
    /// sensor count, holding the merge lock.
    pub fn with_merged_module<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> R {
        self.shared.with_merged_module(module, f)
    }

    /// Clear merged hits and every thread's buffered hits.  Sensor
    /// registrations are kept.
    ///
    /// Safe to call while other threads merge: a merge of a buffer filled
    /// before the reset contributes nothing.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Tear down the context.  Outstanding handles fail from now on.
    pub fn shutdown(self) {
        info!(manager = self.shared.id, "hit manager shut down");
        drop(self);
    }
}

impl Drop for HitManager {
    fn drop(&mut self) {
        self.shared.drop_local();
    }
}

// ── HitHandle ─────────────────────────────────────────────────────────────────

/// Worker-side access to a [`HitManager`].
///
/// Every call upgrades the weak reference first and fails with
/// [`HitError::NotInitialized`] if the manager is gone.
#[derive(Clone)]
pub struct HitHandle {
    shared: Weak<Shared>,
}

impl HitHandle {
    /// A handle that was never attached to a manager.  Every call fails.
    pub fn detached() -> Self {
        Self { shared: Weak::new() }
    }

    fn shared(&self) -> HitResult<Arc<Shared>> {
        self.shared.upgrade().ok_or(HitError::NotInitialized)
    }

    /// `true` while the owning manager is alive.
    pub fn is_initialized(&self) -> bool {
        self.shared.strong_count() > 0
    }

    // ── Producer side ─────────────────────────────────────────────────────

    pub fn register_sensor_count(&self, module: ModuleId, sensor_count: usize) -> HitResult<()> {
        self.shared()?.registry_mut().register(module, sensor_count);
        Ok(())
    }

    pub fn next_module_index(&self) -> HitResult<ModuleId> {
        Ok(self.shared()?.registry_mut().next_module_index())
    }

    /// Buffer one hit on the calling thread.  No lock is taken.
    pub fn append_hit(&self, module: ModuleId, record: HitRecord) -> HitResult<()> {
        self.shared()?.with_local(|local| local.append_hit(module, record));
        Ok(())
    }

    /// Move the calling thread's buffered hits into the merged store and
    /// release the buffer.  Returns the number of hits moved (0 if there was
    /// nothing to merge).
    pub fn merge_thread_local(&self) -> HitResult<usize> {
        Ok(self.shared()?.merge_thread_local())
    }

    /// `true` if the calling thread has unmerged hits for `module`.
    pub fn has_thread_hits(&self, module: ModuleId) -> HitResult<bool> {
        Ok(self
            .shared()?
            .peek_local(|local| local.is_some_and(|l| l.has_hits_for(module))))
    }

    /// Clone of the calling thread's unmerged hits for `module`.
    pub fn thread_hits(&self, module: ModuleId) -> HitResult<HitStats> {
        Ok(self
            .shared()?
            .peek_local(|local| local.map(|l| l.hits(module).clone()).unwrap_or_default()))
    }

    /// Unmerged hit count of the calling thread for every registered module,
    /// in ascending module order.
    pub fn thread_module_hit_counts(&self) -> HitResult<Vec<(ModuleId, usize)>> {
        let shared = self.shared()?;
        let modules: Vec<ModuleId> = shared.registry().modules().collect();
        Ok(shared.peek_local(|local| {
            modules
                .iter()
                .map(|&m| (m, local.map_or(0, |l| l.hit_count(m))))
                .collect()
        }))
    }

    /// Drop the calling thread's unmerged hits only.
    pub fn reset_thread_local(&self) -> HitResult<()> {
        self.shared()?.drop_local();
        Ok(())
    }

    // ── Consumer side ─────────────────────────────────────────────────────

    pub fn sensor_count(&self, module: ModuleId) -> HitResult<Option<usize>> {
        Ok(self.shared()?.registry().sensor_count(module))
    }

    pub fn number_of_modules(&self) -> HitResult<usize> {
        Ok(self.shared()?.registry().len())
    }

    pub fn merged_hits(&self, module: ModuleId) -> HitResult<HitStats> {
        Ok(self.shared()?.merger.merged_hits(module))
    }

    pub fn with_merged_module<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> HitResult<R> {
        Ok(self.shared()?.with_merged_module(module, f))
    }

    /// See [`HitManager::reset`].
    pub fn reset(&self) -> HitResult<()> {
        self.shared()?.reset();
        Ok(())
    }

    // ── Worker pool ───────────────────────────────────────────────────────

    /// Run `work` for every item on Rayon's current pool, then merge every
    /// pool thread's buffer.  Returns the total number of hits merged.
    ///
    /// The first error from `work` is returned after the merge step, so hits
    /// already produced are never stranded in thread-local buffers.
    #[cfg(feature = "parallel")]
    pub fn run_workers<I, F>(&self, items: I, work: F) -> HitResult<usize>
    where
        I: rayon::iter::IntoParallelIterator,
        F: Fn(&HitHandle, I::Item) -> HitResult<()> + Send + Sync,
    {
        use rayon::prelude::*;

        self.shared()?;
        let produced = items.into_par_iter().try_for_each(|item| work(self, item));

        let merged = rayon::broadcast(|_| self.merge_thread_local())
            .into_iter()
            .try_fold(0usize, |acc, r| r.map(|n| acc + n));

        produced?;
        merged
    }
}
