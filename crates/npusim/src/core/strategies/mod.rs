//! NPU allocation strategies.

pub mod best_fit;
pub mod first_fit;
pub mod least_loaded;
pub mod priority_aware;
pub mod round_robin;

use crate::core::npu::{Npu, NpuId};
use crate::core::task::NpuTask;

/// Returns the waiting tasks ordered by arrival time, FIFO for ties.
pub(crate) fn order_by_arrival(waiting_tasks: &[NpuTask]) -> Vec<&NpuTask> {
    let mut tasks: Vec<&NpuTask> = waiting_tasks.iter().collect();
    tasks.sort_by_key(|t| t.arrival_time());
    tasks
}

/// Selects `npu_demand` accommodating NPUs preferring the most loaded ones, or `None`
/// if not enough NPUs fit the task.
pub(crate) fn select_most_loaded(task: &NpuTask, npus: &[Npu]) -> Option<Vec<NpuId>> {
    let mut fitting = accommodating_npus(task, npus);
    fitting.sort_by(|a, b| b.utilization_score().total_cmp(&a.utilization_score()));
    take_demand(task, &fitting)
}

/// Selects `npu_demand` accommodating NPUs preferring the least loaded ones, or
/// `None` if not enough NPUs fit the task.
pub(crate) fn select_least_loaded(task: &NpuTask, npus: &[Npu]) -> Option<Vec<NpuId>> {
    let mut fitting = accommodating_npus(task, npus);
    fitting.sort_by(|a, b| a.utilization_score().total_cmp(&b.utilization_score()));
    take_demand(task, &fitting)
}

fn accommodating_npus<'a>(task: &NpuTask, npus: &'a [Npu]) -> Vec<&'a Npu> {
    npus.iter()
        .filter(|npu| npu.can_accommodate(task.compute_ratio(), task.hbm_ratio()))
        .collect()
}

fn take_demand(task: &NpuTask, fitting: &[&Npu]) -> Option<Vec<NpuId>> {
    if fitting.len() < task.npu_demand() as usize {
        return None;
    }
    Some(
        fitting
            .iter()
            .take(task.npu_demand() as usize)
            .map(|npu| npu.id())
            .collect(),
    )
}
