//! Priority-aware hybrid strategy.

use indexmap::IndexMap;

use crate::core::config::parse_options;
use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::{select_least_loaded, select_most_loaded};
use crate::core::strategy::AllocationStrategy;
use crate::core::task::NpuTask;

/// NPU demand starting from which a task counts as large.
const LARGE_TASK_THRESHOLD: u32 = 3;
/// Combined compute + HBM ratio above which a task counts as resource-intensive.
const HIGH_RESOURCE_THRESHOLD: f64 = 0.6;

/// Serves demanding tasks first.
///
/// Tasks are ordered by NPU demand, then combined resource intensity, then arrival.
/// Large or intensive tasks are spread across the least loaded NPUs, the rest are
/// packed best-fit.
pub struct PriorityAware {
    demand_threshold: u32,
    intensity_threshold: f64,
    total_allocations: u64,
}

impl PriorityAware {
    pub fn new() -> Self {
        Self {
            demand_threshold: LARGE_TASK_THRESHOLD,
            intensity_threshold: HIGH_RESOURCE_THRESHOLD,
            total_allocations: 0,
        }
    }

    /// Creates the strategy from an options string, e.g.
    /// `demand_threshold=4,intensity_threshold=0.5`.
    pub fn from_str(s: &str) -> Self {
        let options = parse_options(s);
        let mut strategy = Self::new();
        if let Some(value) = options.get("demand_threshold") {
            strategy.demand_threshold = value.parse().unwrap();
        }
        if let Some(value) = options.get("intensity_threshold") {
            strategy.intensity_threshold = value.parse().unwrap();
        }
        strategy
    }

    /// Number of tasks this strategy has placed since the last
    /// [`initialize`](AllocationStrategy::initialize).
    pub fn total_allocations(&self) -> u64 {
        self.total_allocations
    }

    fn is_demanding(&self, task: &NpuTask) -> bool {
        task.npu_demand() >= self.demand_threshold
            || task.compute_ratio() + task.hbm_ratio() > self.intensity_threshold
    }
}

impl AllocationStrategy for PriorityAware {
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>> {
        let mut tasks: Vec<&NpuTask> = waiting_tasks.iter().collect();
        tasks.sort_by(|a, b| {
            b.npu_demand()
                .cmp(&a.npu_demand())
                .then_with(|| {
                    let intensity_a = a.compute_ratio() + a.hbm_ratio();
                    let intensity_b = b.compute_ratio() + b.hbm_ratio();
                    intensity_b.total_cmp(&intensity_a)
                })
                .then_with(|| a.arrival_time().cmp(&b.arrival_time()))
        });

        let mut allocations = IndexMap::new();
        for task in tasks {
            let selected = if self.is_demanding(task) {
                select_least_loaded(task, npus)
            } else {
                select_most_loaded(task, npus)
            };
            if let Some(selected) = selected {
                allocations.insert(task.id().to_string(), selected);
            }
        }
        allocations
    }

    fn name(&self) -> String {
        "Priority-Aware (Hybrid)".to_string()
    }

    fn initialize(&mut self) {
        self.total_allocations = 0;
    }

    fn on_allocation_complete(&mut self, allocated_tasks: usize, _remaining_tasks: usize) {
        self.total_allocations += allocated_tasks as u64;
    }
}
