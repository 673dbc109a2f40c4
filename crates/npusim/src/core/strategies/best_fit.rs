//! Best Fit strategy.

use indexmap::IndexMap;

use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::{order_by_arrival, select_most_loaded};
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// Takes tasks in arrival order and packs each onto the most loaded NPUs that still
/// fit it, consolidating spare capacity.
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl AllocationStrategy for BestFit {
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>> {
        let mut allocations = IndexMap::new();
        for task in order_by_arrival(waiting_tasks) {
            if let Some(selected) = select_most_loaded(task, npus) {
                allocations.insert(task.id().to_string(), selected);
            }
        }
        allocations
    }

    fn name(&self) -> String {
        "Best-Fit".to_string()
    }
}
