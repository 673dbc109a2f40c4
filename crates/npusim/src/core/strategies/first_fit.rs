//! First Fit strategy.

use indexmap::IndexMap;

use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::order_by_arrival;
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// Takes tasks in arrival order and puts each on the first NPUs in pool order that
/// fit it.
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Self {}
    }
}

impl AllocationStrategy for FirstFit {
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>> {
        let mut allocations = IndexMap::new();
        for task in order_by_arrival(waiting_tasks) {
            let selected: Vec<NpuId> = npus
                .iter()
                .filter(|npu| npu.can_accommodate(task.compute_ratio(), task.hbm_ratio()))
                .take(task.npu_demand() as usize)
                .map(|npu| npu.id())
                .collect();
            if selected.len() == task.npu_demand() as usize {
                allocations.insert(task.id().to_string(), selected);
            }
        }
        allocations
    }

    fn name(&self) -> String {
        "First-Fit".to_string()
    }
}
