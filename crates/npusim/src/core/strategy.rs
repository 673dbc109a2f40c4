//! NPU allocation strategy contract and strategy resolution.

use indexmap::IndexMap;

use crate::core::config::parse_config_value;
use crate::core::npu::{Npu, NpuId};
use crate::core::strategies::best_fit::BestFit;
use crate::core::strategies::first_fit::FirstFit;
use crate::core::strategies::least_loaded::LeastLoaded;
use crate::core::strategies::priority_aware::PriorityAware;
use crate::core::strategies::round_robin::RoundRobin;
use crate::core::task::NpuTask;

/// Trait for implementations of NPU allocation strategies.
///
/// A strategy is a pure decision function: given the waiting tasks and the NPUs of
/// the pool, it proposes which NPUs each task should occupy without mutating either.
/// The proposal maps task ids to lists of exactly `npu_demand` distinct NPU ids;
/// tasks that cannot be placed are omitted entirely. The proposal is advisory: the
/// commit happens in [`NpuPool`](crate::core::pool::NpuPool), which re-checks
/// capacity and may still reject a proposed task.
///
/// It is possible to implement an arbitrary strategy and install it with
/// [`set_strategy`](crate::core::pool::NpuPool::set_strategy).
pub trait AllocationStrategy {
    /// Proposes NPU placements for the waiting tasks.
    fn allocate(&mut self, waiting_tasks: &[NpuTask], npus: &[Npu]) -> IndexMap<String, Vec<NpuId>>;

    /// Returns the human-readable strategy name.
    fn name(&self) -> String;

    /// Resets any retained state (cursors, counters). Called when the strategy is
    /// installed into a pool and on simulation reset.
    fn initialize(&mut self) {}

    /// Called after each allocation round with the number of committed tasks and the
    /// number of valid tasks left waiting.
    fn on_allocation_complete(&mut self, _allocated_tasks: usize, _remaining_tasks: usize) {}
}

/// Creates a strategy from its config string, e.g. `RoundRobin` or
/// `PriorityAware[demand_threshold=4,intensity_threshold=0.5]`.
pub fn allocation_strategy_resolver(config_str: &str) -> Box<dyn AllocationStrategy> {
    let (strategy_name, options) = parse_config_value(config_str);
    match strategy_name.as_str() {
        "FirstFit" => Box::new(FirstFit::new()),
        "BestFit" => Box::new(BestFit::new()),
        "LeastLoaded" => Box::new(LeastLoaded::new()),
        "RoundRobin" => Box::new(RoundRobin::new()),
        "PriorityAware" => match options {
            Some(options) => Box::new(PriorityAware::from_str(&options)),
            None => Box::new(PriorityAware::new()),
        },
        _ => panic!("Can't resolve strategy: {}", config_str),
    }
}
