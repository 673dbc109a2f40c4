//! NPU pool and allocation commit logic.

use serde::Serialize;

use crate::core::npu::{Npu, NpuId};
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// Committed placement of a task onto a set of NPUs.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub task: NpuTask,
    pub npu_ids: Vec<NpuId>,
}

/// Aggregated pool state, recomputed on request.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PoolStatistics {
    pub average_compute_utilization: f64,
    pub average_hbm_utilization: f64,
    pub idle_npu_count: usize,
    pub total_running_tasks: usize,
}

/// Fixed set of NPUs governed by the active allocation strategy.
///
/// The pool turns strategy proposals into real allocations. Each task commits
/// atomically: either every proposed NPU accepts its shares or none of them keeps
/// any, so a partially allocated task never exists.
pub struct NpuPool {
    npus: Vec<Npu>,
    strategy: Box<dyn AllocationStrategy>,
}

impl NpuPool {
    /// Creates a pool of `npu_count` idle NPUs governed by the given strategy.
    pub fn new(npu_count: u32, mut strategy: Box<dyn AllocationStrategy>) -> Self {
        strategy.initialize();
        Self {
            npus: (0..npu_count).map(Npu::new).collect(),
            strategy,
        }
    }

    pub fn npus(&self) -> &[Npu] {
        &self.npus
    }

    pub fn npu_count(&self) -> usize {
        self.npus.len()
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    /// Replaces the active strategy, resetting its internal state.
    pub fn set_strategy(&mut self, mut strategy: Box<dyn AllocationStrategy>) {
        strategy.initialize();
        self.strategy = strategy;
    }

    /// Runs one allocation round over the waiting tasks.
    ///
    /// Invalid tasks are skipped, the strategy proposes placements and each proposed
    /// task is committed independently: a task whose NPUs can no longer take it
    /// (earlier commits in the same round may have consumed the capacity the strategy
    /// counted on) is rolled back and simply stays waiting. Returns the committed
    /// allocations in proposal order.
    pub fn allocate_for_waiting_tasks(&mut self, waiting_tasks: &[NpuTask]) -> Vec<Allocation> {
        let valid_tasks: Vec<NpuTask> = waiting_tasks.iter().filter(|t| t.is_valid()).cloned().collect();
        let proposal = self.strategy.allocate(&valid_tasks, &self.npus);

        let mut committed = Vec::new();
        for (task_id, npu_ids) in proposal {
            let task = match valid_tasks.iter().find(|t| t.id() == task_id) {
                Some(task) => task,
                None => continue,
            };
            if self.commit_task(task, &npu_ids) {
                committed.push(Allocation {
                    task: task.clone(),
                    npu_ids,
                });
            }
        }
        self.strategy
            .on_allocation_complete(committed.len(), valid_tasks.len() - committed.len());
        committed
    }

    /// Commits the proposed NPUs for one task, rolling back on any failure.
    fn commit_task(&mut self, task: &NpuTask, npu_ids: &[NpuId]) -> bool {
        if npu_ids.len() != task.npu_demand() as usize {
            return false;
        }
        if npu_ids.iter().any(|&id| id as usize >= self.npus.len()) {
            return false;
        }
        let mut allocated: Vec<NpuId> = Vec::new();
        for &id in npu_ids {
            if self.npus[id as usize].allocate(task.id(), task.compute_ratio(), task.hbm_ratio()) {
                allocated.push(id);
            } else {
                for &done in &allocated {
                    self.npus[done as usize].deallocate(task.id(), task.compute_ratio(), task.hbm_ratio());
                }
                return false;
            }
        }
        true
    }

    /// Releases the NPUs held by a completed task.
    ///
    /// Panics if any listed NPU does not exist or does not run the task.
    pub fn deallocate_for_task(&mut self, task: &NpuTask, npu_ids: &[NpuId]) {
        for &id in npu_ids {
            match self.npus.get_mut(id as usize) {
                Some(npu) => npu.deallocate(task.id(), task.compute_ratio(), task.hbm_ratio()),
                None => panic!("Unknown NPU {} in deallocation of task {}", id, task.id()),
            }
        }
    }

    /// Computes the pool statistics projection.
    pub fn statistics(&self) -> PoolStatistics {
        if self.npus.is_empty() {
            return PoolStatistics::default();
        }
        let count = self.npus.len() as f64;
        PoolStatistics {
            average_compute_utilization: self.npus.iter().map(|n| n.compute_utilization()).sum::<f64>() / count,
            average_hbm_utilization: self.npus.iter().map(|n| n.hbm_utilization()).sum::<f64>() / count,
            idle_npu_count: self.npus.iter().filter(|n| n.is_idle()).count(),
            total_running_tasks: self.npus.iter().map(|n| n.running_tasks().len()).sum(),
        }
    }

    /// Returns every NPU to the idle zero-utilization state and re-initializes the
    /// strategy.
    pub fn reset(&mut self) {
        for npu in self.npus.iter_mut() {
            *npu = Npu::new(npu.id());
        }
        self.strategy.initialize();
    }
}
