use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use wirebench_model::{WorkerRecord, WorkerState};

/// Shared, cheaply cloneable view of every worker slot.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    slots: Arc<RwLock<BTreeMap<usize, WorkerRecord>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A process is now running in `slot`. Reusing a slot counts as a restart.
    pub(crate) fn started(&self, slot: usize, pid: u32) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(slot)
            .and_modify(|rec| {
                rec.pid = pid;
                rec.state = WorkerState::Running;
                rec.restarts = rec.restarts.saturating_add(1);
            })
            .or_insert_with(|| WorkerRecord::running(slot, pid));
    }

    pub(crate) fn exited(&self, slot: usize) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(rec) = slots.get_mut(&slot) {
            rec.state = WorkerState::Exited;
        }
    }

    /// All records, ordered by slot.
    pub fn snapshot(&self) -> Vec<WorkerRecord> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().cloned().collect()
    }

    pub fn get(&self, slot: usize) -> Option<WorkerRecord> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&slot).cloned()
    }

    /// Number of slots with a live process.
    pub fn running(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|r| r.state.is_running()).count()
    }

    pub fn total_restarts(&self) -> u32 {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().map(|r| r.restarts).sum()
    }
}
