//! Round Robin strategy.

use indexmap::IndexMap;

use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::order_by_arrival;
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// Cycles through the pool with a persistent cursor, spreading tasks across NPUs
/// regardless of their load.
///
/// The cursor survives between allocation rounds and is reset only by
/// [`initialize`](AllocationStrategy::initialize).
pub struct RoundRobin {
    index: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    fn select(&mut self, task: &NpuTask, npus: &[Npu]) -> Option<Vec<NpuId>> {
        let demand = task.npu_demand() as usize;
        let mut selected: Vec<NpuId> = Vec::new();
        let mut attempts = 0;
        // The probe bound guarantees termination even when nothing fits.
        while selected.len() < demand && attempts < npus.len() * 2 {
            let npu = &npus[self.index];
            self.index = (self.index + 1) % npus.len();
            attempts += 1;
            if !selected.contains(&npu.id()) && npu.can_accommodate(task.compute_ratio(), task.hbm_ratio()) {
                selected.push(npu.id());
            }
        }
        if selected.len() == demand {
            Some(selected)
        } else {
            None
        }
    }
}

impl AllocationStrategy for RoundRobin {
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>> {
        let mut allocations = IndexMap::new();
        for task in order_by_arrival(waiting_tasks) {
            if let Some(selected) = self.select(task, npus) {
                allocations.insert(task.id().to_string(), selected);
            }
        }
        allocations
    }

    fn name(&self) -> String {
        "Round-Robin".to_string()
    }

    fn initialize(&mut self) {
        self.index = 0;
    }
}
