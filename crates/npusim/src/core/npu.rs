//! NPU state and allocation operations.

use std::collections::HashSet;

pub type NpuId = u32;

/// Represents a single NPU with its compute and HBM utilization gauges and the set of
/// tasks currently running on it.
///
/// Both gauges stay within [0, 1]: allocation refuses shares that do not fit and
/// deallocation clamps at zero.
#[derive(Clone, Debug)]
pub struct Npu {
    id: NpuId,
    compute_utilization: f64,
    hbm_utilization: f64,
    running_tasks: HashSet<String>,
}

impl Npu {
    /// Creates an idle NPU with zero utilization.
    pub fn new(id: NpuId) -> Self {
        Self {
            id,
            compute_utilization: 0.,
            hbm_utilization: 0.,
            running_tasks: HashSet::new(),
        }
    }

    pub fn id(&self) -> NpuId {
        self.id
    }

    pub fn compute_utilization(&self) -> f64 {
        self.compute_utilization
    }

    pub fn hbm_utilization(&self) -> f64 {
        self.hbm_utilization
    }

    /// Returns the ids of tasks currently running on this NPU.
    pub fn running_tasks(&self) -> &HashSet<String> {
        &self.running_tasks
    }

    pub fn is_idle(&self) -> bool {
        self.running_tasks.is_empty()
    }

    /// Returns whether the given shares fit into the remaining capacity.
    pub fn can_accommodate(&self, compute_ratio: f64, hbm_ratio: f64) -> bool {
        self.compute_utilization + compute_ratio <= 1.0 && self.hbm_utilization + hbm_ratio <= 1.0
    }

    /// Adds the task's shares to the gauges and the task to the running set.
    ///
    /// Returns `false` without mutating the state if the shares do not fit or the
    /// task is already placed here.
    pub fn allocate(&mut self, task_id: &str, compute_ratio: f64, hbm_ratio: f64) -> bool {
        if !self.can_accommodate(compute_ratio, hbm_ratio) || self.running_tasks.contains(task_id) {
            return false;
        }
        self.compute_utilization += compute_ratio;
        self.hbm_utilization += hbm_ratio;
        self.running_tasks.insert(task_id.to_string());
        true
    }

    /// Removes the task's shares from the gauges, clamping at zero, and the task from
    /// the running set.
    ///
    /// Panics if the task is not recorded as running on this NPU.
    pub fn deallocate(&mut self, task_id: &str, compute_ratio: f64, hbm_ratio: f64) {
        if !self.running_tasks.remove(task_id) {
            panic!("Task {} is not running on NPU {}", task_id, self.id);
        }
        self.compute_utilization = (self.compute_utilization - compute_ratio).max(0.);
        self.hbm_utilization = (self.hbm_utilization - hbm_ratio).max(0.);
    }

    /// Fullness measure used by the fit heuristics.
    pub fn utilization_score(&self) -> f64 {
        self.compute_utilization.max(self.hbm_utilization)
    }
}
