//! `SensorRegistry` — how many sensors each module has.
//!
//! Filled once during detector setup, before any hit is produced.  Analysis
//! code reads it to size per-sensor outputs.

use std::collections::BTreeMap;

use om_core::ModuleId;

#[derive(Debug, Default, Clone)]
pub struct SensorRegistry {
    counts:     BTreeMap<ModuleId, usize>,
    next_index: u32,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `sensor_count` for `module`.  Re-registering overwrites.
    pub fn register(&mut self, module: ModuleId, sensor_count: usize) {
        self.counts.insert(module, sensor_count);
        if module.0 >= self.next_index {
            self.next_index = module.0.saturating_add(1);
        }
    }

    /// Sensor count of `module`, or `None` if never registered.
    pub fn sensor_count(&self, module: ModuleId) -> Option<usize> {
        self.counts.get(&module).copied()
    }

    /// Hand out the next unused module index.  Indices registered explicitly
    /// are skipped.
    pub fn next_module_index(&mut self) -> ModuleId {
        let id = ModuleId(self.next_index);
        self.next_index = self.next_index.saturating_add(1);
        id
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Registered modules in ascending order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.counts.keys().copied()
    }
}
