//! `ThreadLocalHitStore` — the hit buffer owned by one worker thread.
//!
//! A store is only ever touched by the thread that owns it, so appends take no
//! lock.  [`HitHandle`](crate::HitHandle) keeps one per thread per manager in
//! thread-local storage; the type is also usable on its own where a caller
//! wants to hold the buffer explicitly.

use std::collections::BTreeMap;

use om_core::{HitRecord, HitStats, ModuleId};

/// Returned for modules this thread never appended to.
static EMPTY: HitStats = HitStats::new();

/// Per-module hit buffers for one thread.
#[derive(Debug, Default)]
pub struct ThreadLocalHitStore {
    modules: BTreeMap<ModuleId, HitStats>,
}

impl ThreadLocalHitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one hit to `module`, creating its buffer on first use.
    #[inline]
    pub fn append_hit(&mut self, module: ModuleId, record: HitRecord) {
        self.modules.entry(module).or_default().push(record);
    }

    /// `true` if at least one hit was appended to `module` since the last
    /// reset or merge.
    pub fn has_hits_for(&self, module: ModuleId) -> bool {
        self.modules.get(&module).is_some_and(|s| !s.is_empty())
    }

    /// Hits buffered for `module`.  Unknown modules yield an empty `HitStats`.
    pub fn hits(&self, module: ModuleId) -> &HitStats {
        self.modules.get(&module).unwrap_or(&EMPTY)
    }

    /// Number of hits buffered for `module`.
    pub fn hit_count(&self, module: ModuleId) -> usize {
        self.hits(module).len()
    }

    /// Total hits across all modules.
    pub fn total_hits(&self) -> usize {
        self.modules.values().map(HitStats::len).sum()
    }

    /// `true` if no module holds any hit.
    pub fn is_empty(&self) -> bool {
        self.modules.values().all(HitStats::is_empty)
    }

    /// Iterate `(module, hits)` in ascending module order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &HitStats)> {
        self.modules.iter().map(|(&m, s)| (m, s))
    }

    /// Drop all buffered data.
    pub fn reset(&mut self) {
        self.modules.clear();
    }

    /// Hand the buffers over to the merger, leaving this store empty.
    pub(crate) fn take_modules(&mut self) -> BTreeMap<ModuleId, HitStats> {
        std::mem::take(&mut self.modules)
    }
}
