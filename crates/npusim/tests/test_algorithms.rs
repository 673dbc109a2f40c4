use npusim::core::npu::{Npu, NpuId};
use npusim::core::sim_time::SimTime;
use npusim::core::strategies::best_fit::BestFit;
use npusim::core::strategies::first_fit::FirstFit;
use npusim::core::strategies::least_loaded::LeastLoaded;
use npusim::core::strategies::priority_aware::PriorityAware;
use npusim::core::strategies::round_robin::RoundRobin;
use npusim::core::strategy::{allocation_strategy_resolver, AllocationStrategy};
use npusim::core::task::NpuTask;

fn init_logger() {
    use std::io::Write;
    let _ = env_logger::builder()
        .is_test(true)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}

fn task(id: &str, arrival_secs: i64, demand: u32, compute: f64, hbm: f64, duration_secs: i64) -> NpuTask {
    NpuTask::new(
        id,
        SimTime::from_secs(arrival_secs),
        demand,
        compute,
        hbm,
        SimTime::from_secs(duration_secs),
    )
}

// Builds a pool snapshot with the given per-NPU loads by running a background task
// on every non-idle NPU. The standard setup for the placement tests is four NPUs
// loaded at 0.9, 0.2, 0.4 and 0.0 on both gauges: a 0.5/0.5 task does not fit on
// NPU 0, so the strategies choose among NPUs 1, 2 and 3 and their orderings differ.
fn npus_with_loads(loads: &[(f64, f64)]) -> Vec<Npu> {
    loads
        .iter()
        .enumerate()
        .map(|(id, &(compute, hbm))| {
            let mut npu = Npu::new(id as NpuId);
            if compute > 0. || hbm > 0. {
                assert!(npu.allocate("background", compute, hbm));
            }
            npu
        })
        .collect()
}

fn standard_pool() -> Vec<Npu> {
    npus_with_loads(&[(0.9, 0.9), (0.2, 0.2), (0.4, 0.4), (0.0, 0.0)])
}

#[test]
// First Fit walks the pool in id order and takes the first NPUs that fit.
fn test_first_fit() {
    init_logger();
    let npus = standard_pool();
    let mut strategy = FirstFit::new();
    let proposal = strategy.allocate(&[task("t1", 1, 2, 0.5, 0.5, 9)], &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![1, 2]);
}

#[test]
// Best Fit packs the task onto the most loaded NPUs that still fit it.
fn test_best_fit() {
    init_logger();
    let npus = standard_pool();
    let mut strategy = BestFit::new();
    let proposal = strategy.allocate(&[task("t1", 1, 2, 0.5, 0.5, 9)], &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![2, 1]);
}

#[test]
// Least Loaded spreads the task across the emptiest NPUs.
fn test_least_loaded() {
    init_logger();
    let npus = standard_pool();
    let mut strategy = LeastLoaded::new();
    let proposal = strategy.allocate(&[task("t1", 1, 2, 0.5, 0.5, 9)], &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![3, 1]);
}

#[test]
// The Round Robin cursor survives between allocation rounds, so consecutive tasks
// land on consecutive NPUs. Initialize rewinds it to the start of the pool.
fn test_round_robin_cursor_persists() {
    init_logger();
    let npus = npus_with_loads(&[(0., 0.), (0., 0.), (0., 0.)]);
    let mut strategy = RoundRobin::new();

    let proposal = strategy.allocate(&[task("t1", 1, 1, 0.1, 0.1, 9)], &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![0]);
    let proposal = strategy.allocate(&[task("t2", 2, 1, 0.1, 0.1, 9)], &npus);
    assert_eq!(proposal.get("t2").unwrap(), &vec![1]);
    let proposal = strategy.allocate(&[task("t3", 3, 1, 0.1, 0.1, 9)], &npus);
    assert_eq!(proposal.get("t3").unwrap(), &vec![2]);
    // Wrapped around.
    let proposal = strategy.allocate(&[task("t4", 4, 1, 0.1, 0.1, 9)], &npus);
    assert_eq!(proposal.get("t4").unwrap(), &vec![0]);

    strategy.initialize();
    let proposal = strategy.allocate(&[task("t5", 5, 1, 0.1, 0.1, 9)], &npus);
    assert_eq!(proposal.get("t5").unwrap(), &vec![0]);
}

#[test]
// Round Robin probes past NPUs that cannot take the task.
fn test_round_robin_skips_full_npus() {
    init_logger();
    let npus = npus_with_loads(&[(1.0, 1.0), (0., 0.)]);
    let mut strategy = RoundRobin::new();

    let proposal = strategy.allocate(&[task("t1", 1, 1, 0.5, 0.5, 9)], &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![1]);
    let proposal = strategy.allocate(&[task("t2", 2, 1, 0.5, 0.5, 9)], &npus);
    assert_eq!(proposal.get("t2").unwrap(), &vec![1]);
}

#[test]
// Round Robin terminates with an empty proposal when no NPU fits the task.
fn test_round_robin_gives_up_when_nothing_fits() {
    init_logger();
    let npus = npus_with_loads(&[(0.9, 0.9), (0.9, 0.9)]);
    let mut strategy = RoundRobin::new();
    let proposal = strategy.allocate(&[task("t1", 1, 1, 0.5, 0.5, 9)], &npus);
    assert!(proposal.is_empty());
}

#[test]
// A task demanding more NPUs than the pool holds is omitted by every strategy.
fn test_oversized_demand_is_omitted() {
    init_logger();
    let npus = npus_with_loads(&[(0., 0.), (0., 0.), (0., 0.), (0., 0.)]);
    let waiting = vec![task("huge", 1, 5, 0.1, 0.1, 9)];

    let mut strategies: Vec<Box<dyn AllocationStrategy>> = vec![
        Box::new(FirstFit::new()),
        Box::new(BestFit::new()),
        Box::new(LeastLoaded::new()),
        Box::new(RoundRobin::new()),
        Box::new(PriorityAware::new()),
    ];
    for strategy in strategies.iter_mut() {
        assert!(strategy.allocate(&waiting, &npus).is_empty());
    }
}

#[test]
// First Fit serves tasks in arrival order even when the waiting list is shuffled:
// the earlier arrival comes first in the proposal and thus wins the commit when
// both tasks target the same NPU.
fn test_arrival_order_breaks_contention() {
    init_logger();
    let npus = npus_with_loads(&[(0., 0.), (0., 0.)]);
    let waiting = vec![task("late", 5, 1, 0.6, 0.6, 9), task("early", 2, 1, 0.6, 0.6, 9)];

    let mut strategy = FirstFit::new();
    let proposal = strategy.allocate(&waiting, &npus);
    assert_eq!(proposal.len(), 2);
    assert_eq!(proposal.get_index(0).unwrap().0, "early");
    assert_eq!(proposal.get_index(1).unwrap().0, "late");
}

#[test]
// Priority-Aware proposes the most demanding task first regardless of arrival,
// spreading it across the least loaded NPUs.
fn test_priority_aware_orders_by_demand() {
    init_logger();
    let npus = npus_with_loads(&[(0., 0.), (0., 0.), (0., 0.), (0., 0.)]);
    let waiting = vec![task("small", 1, 1, 0.2, 0.2, 9), task("big", 2, 3, 0.2, 0.2, 9)];

    let mut strategy = PriorityAware::new();
    let proposal = strategy.allocate(&waiting, &npus);
    assert_eq!(proposal.get_index(0).unwrap().0, "big");
    assert_eq!(proposal.get("big").unwrap(), &vec![0, 1, 2]);
}

#[test]
// A resource-intensive task is spread to the emptiest NPU while a light one is
// packed onto the already loaded NPU.
fn test_priority_aware_splits_by_intensity() {
    init_logger();
    let npus = npus_with_loads(&[(0.4, 0.4), (0., 0.)]);

    let mut strategy = PriorityAware::new();
    // 0.5 + 0.3 exceeds the default intensity threshold of 0.6.
    let proposal = strategy.allocate(&[task("intense", 1, 1, 0.5, 0.3, 9)], &npus);
    assert_eq!(proposal.get("intense").unwrap(), &vec![1]);

    let proposal = strategy.allocate(&[task("light", 1, 1, 0.2, 0.2, 9)], &npus);
    assert_eq!(proposal.get("light").unwrap(), &vec![0]);
}

#[test]
// Config options lower the demand threshold, flipping a mid-size task from the
// best-fit path to the least-loaded path.
fn test_priority_aware_options_override_thresholds() {
    init_logger();
    let npus = npus_with_loads(&[(0.4, 0.4), (0., 0.), (0., 0.)]);
    let waiting = vec![task("t1", 1, 2, 0.2, 0.2, 9)];

    // Default thresholds: demand 2 is not demanding, packed onto the loaded NPU.
    let mut strategy = PriorityAware::new();
    let proposal = strategy.allocate(&waiting, &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![0, 1]);

    let mut strategy = allocation_strategy_resolver("PriorityAware[demand_threshold=2,intensity_threshold=0.9]");
    let proposal = strategy.allocate(&waiting, &npus);
    assert_eq!(proposal.get("t1").unwrap(), &vec![1, 2]);
}

#[test]
// The allocation counter aggregates committed tasks and rewinds on initialize.
fn test_priority_aware_counts_allocations() {
    init_logger();
    let mut strategy = PriorityAware::new();
    strategy.on_allocation_complete(3, 1);
    strategy.on_allocation_complete(2, 0);
    assert_eq!(strategy.total_allocations(), 5);

    strategy.initialize();
    assert_eq!(strategy.total_allocations(), 0);
}

#[test]
// The resolver maps config names to strategies, with optional bracketed options.
fn test_resolver_names() {
    init_logger();
    assert_eq!(allocation_strategy_resolver("FirstFit").name(), "First-Fit");
    assert_eq!(allocation_strategy_resolver("BestFit").name(), "Best-Fit");
    assert_eq!(allocation_strategy_resolver("LeastLoaded").name(), "Least-Loaded");
    assert_eq!(allocation_strategy_resolver("RoundRobin").name(), "Round-Robin");
    assert_eq!(
        allocation_strategy_resolver("PriorityAware").name(),
        "Priority-Aware (Hybrid)"
    );
    assert_eq!(
        allocation_strategy_resolver("PriorityAware[demand_threshold=4]").name(),
        "Priority-Aware (Hybrid)"
    );
}

#[test]
#[should_panic(expected = "Can't resolve strategy")]
fn test_unknown_strategy_panics() {
    init_logger();
    allocation_strategy_resolver("WorstFit");
}
