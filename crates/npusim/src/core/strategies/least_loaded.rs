//! Least Loaded strategy.

use indexmap::IndexMap;

use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::{order_by_arrival, select_least_loaded};
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// Takes tasks in arrival order and spreads each across the least loaded NPUs that
/// fit it.
pub struct LeastLoaded;

impl LeastLoaded {
    pub fn new() -> Self {
        Self {}
    }
}

impl AllocationStrategy for LeastLoaded {
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>> {
        let mut allocations = IndexMap::new();
        for task in order_by_arrival(waiting_tasks) {
            if let Some(selected) = select_least_loaded(task, npus) {
                allocations.insert(task.id().to_string(), selected);
            }
        }
        allocations
    }

    fn name(&self) -> String {
        "Least-Loaded".to_string()
    }
}
