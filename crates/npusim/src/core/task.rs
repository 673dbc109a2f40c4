//! Representation of NPU tasks.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::sim_time::SimTime;

/// Represents a task requesting NPUs.
///
/// A task asks for a fixed number of NPUs, a share of compute time and of HBM on each
/// of them, and holds the allocation for its estimated service time. Tasks are
/// immutable after construction; only the per-NPU gauges change during the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpuTask {
    id: String,
    arrival_time: SimTime,
    npu_demand: u32,
    compute_ratio: f64,
    hbm_ratio: f64,
    duration: SimTime,
}

impl NpuTask {
    /// Creates a task with the specified parameters.
    pub fn new(
        id: &str,
        arrival_time: SimTime,
        npu_demand: u32,
        compute_ratio: f64,
        hbm_ratio: f64,
        duration: SimTime,
    ) -> Self {
        Self {
            id: id.to_string(),
            arrival_time,
            npu_demand,
            compute_ratio,
            hbm_ratio,
            duration,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    /// Returns the number of NPUs the task must occupy simultaneously.
    pub fn npu_demand(&self) -> u32 {
        self.npu_demand
    }

    /// Returns the share of compute time consumed on each occupied NPU.
    pub fn compute_ratio(&self) -> f64 {
        self.compute_ratio
    }

    /// Returns the share of HBM consumed on each occupied NPU.
    pub fn hbm_ratio(&self) -> f64 {
        self.hbm_ratio
    }

    /// Returns the estimated service time of the task.
    pub fn duration(&self) -> SimTime {
        self.duration
    }

    /// Checks that the request is well-formed: positive NPU demand, both ratios
    /// within [0, 1] and positive service time.
    pub fn is_valid(&self) -> bool {
        self.npu_demand > 0
            && (0.0..=1.0).contains(&self.compute_ratio)
            && (0.0..=1.0).contains(&self.hbm_ratio)
            && self.duration.is_positive()
    }

    /// Total compute consumption across all requested NPUs, for reporting.
    pub fn total_compute_units(&self) -> f64 {
        self.npu_demand as f64 * self.compute_ratio
    }

    /// Total HBM consumption across all requested NPUs, for reporting.
    pub fn total_hbm_units(&self) -> f64 {
        self.npu_demand as f64 * self.hbm_ratio
    }
}

// Tasks are identified solely by id.
impl PartialEq for NpuTask {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NpuTask {}

impl Hash for NpuTask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
