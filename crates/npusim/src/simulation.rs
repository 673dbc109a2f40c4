//! Simulation engine and user-facing facade.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::event_queue::EventQueue;
use crate::core::events::{EventPayload, SimEvent};
use crate::core::npu::NpuId;
use crate::core::pool::{NpuPool, PoolStatistics};
use crate::core::sim_time::SimTime;
use crate::core::stats::SimulationStatistics;
use crate::core::strategy::{allocation_strategy_resolver, AllocationStrategy};
use crate::core::task::NpuTask;
use crate::extensions::trace_reader::TraceReader;
use crate::{log_debug, log_info, log_trace};

/// Copy-isolated view of the simulation state at one point in time.
///
/// Holds clones of the live containers, so the snapshot stays intact while the
/// simulation keeps running.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationSnapshot {
    pub current_time: SimTime,
    pub waiting_tasks: Vec<NpuTask>,
    pub completed_tasks: Vec<NpuTask>,
    pub pool_statistics: PoolStatistics,
    pub statistics: SimulationStatistics,
}

/// Discrete-event simulation of NPU load balancing.
///
/// Owns the event queue, the NPU pool, the waiting and completed task lists and the
/// run statistics. Virtual time advances only by consuming events: a task arrival
/// appends the task to the waiting list, a completion releases its NPUs, and both are
/// followed by an admission cycle which retries every waiting task until a pass
/// admits nothing. Events are processed strictly one at a time, so no locking is
/// needed as long as the whole engine is driven from one thread.
///
/// # Examples
///
/// ```rust
/// use npusim::core::sim_time::SimTime;
/// use npusim::core::strategy::allocation_strategy_resolver;
/// use npusim::core::task::NpuTask;
/// use npusim::simulation::LoadBalancingSimulation;
///
/// let mut sim = LoadBalancingSimulation::new(4, allocation_strategy_resolver("FirstFit"));
/// sim.submit_task(NpuTask::new(
///     "task-1",
///     SimTime::from_secs(1),
///     2,
///     0.5,
///     0.3,
///     SimTime::from_secs(9),
/// ));
/// sim.run();
/// assert_eq!(sim.statistics().completed_task_count, 1);
/// assert_eq!(sim.time(), SimTime::from_secs(10));
/// ```
pub struct LoadBalancingSimulation {
    event_queue: EventQueue,
    pool: NpuPool,
    waiting_tasks: Vec<NpuTask>,
    completed_tasks: Vec<NpuTask>,
    // task id -> NPU ids currently held by the task
    allocations: HashMap<String, Vec<NpuId>>,
    submitted_task_ids: HashSet<String>,
    stats: SimulationStatistics,
    clock: SimTime,
    running: bool,
    status_log_period: u64,
}

impl LoadBalancingSimulation {
    /// Creates a simulation over a pool of `npu_count` NPUs governed by the given
    /// strategy.
    pub fn new(npu_count: u32, strategy: Box<dyn AllocationStrategy>) -> Self {
        Self {
            event_queue: EventQueue::new(),
            pool: NpuPool::new(npu_count, strategy),
            waiting_tasks: Vec::new(),
            completed_tasks: Vec::new(),
            allocations: HashMap::new(),
            submitted_task_ids: HashSet::new(),
            stats: SimulationStatistics::new(),
            clock: SimTime::ZERO,
            running: false,
            status_log_period: 100,
        }
    }

    /// Creates a simulation from a config, resolving the strategy by its config
    /// string.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut sim = Self::new(config.npu_count, allocation_strategy_resolver(&config.strategy));
        sim.status_log_period = config.status_log_period;
        sim
    }

    /// Submits a task to the simulation by scheduling its arrival event.
    ///
    /// Panics if the task is malformed or its id was already submitted; such tasks
    /// never enter the event queue.
    pub fn submit_task(&mut self, task: NpuTask) {
        if !task.is_valid() {
            panic!("Invalid task: {:?}", task);
        }
        if !self.submitted_task_ids.insert(task.id().to_string()) {
            panic!("Duplicate task id: {}", task.id());
        }
        log_trace!(self, "Task {} submitted, arrives at {}", task.id(), task.arrival_time());
        self.stats.submitted_task_count += 1;
        self.event_queue.add(task.arrival_time(), EventPayload::TaskArrival { task });
    }

    /// Submits every task remaining in the trace.
    pub fn submit_trace(&mut self, trace: &mut TraceReader) {
        while let Some(task) = trace.get_next_task() {
            self.submit_task(task);
        }
    }

    /// Runs the simulation until the event queue drains or [`stop`](Self::stop) is
    /// called.
    pub fn run(&mut self) {
        self.running = true;
        log_info!(
            self,
            "Starting simulation: {} NPUs, {} strategy, {} events in queue",
            self.pool.npu_count(),
            self.pool.strategy_name(),
            self.event_queue.len()
        );
        while self.running && !self.event_queue.is_empty() {
            self.step();
        }
        self.running = false;
        self.log_summary();
    }

    /// Processes a single event: advances the clock to the event time and dispatches
    /// by event kind.
    ///
    /// Returns `false` if there are no pending events, so no progress can be made.
    pub fn step(&mut self) -> bool {
        let event = match self.event_queue.pop() {
            Some(event) => event,
            None => return false,
        };
        let SimEvent { time, payload, .. } = event;
        self.clock = time;
        match payload {
            EventPayload::TaskArrival { task } => self.on_task_arrival(task),
            EventPayload::TaskCompletion { task, npu_ids } => self.on_task_completion(task, npu_ids),
        }
        self.stats.processed_event_count += 1;
        // Zero period turns the periodic status records off.
        if self.status_log_period > 0 && self.stats.processed_event_count % self.status_log_period == 0 {
            self.log_status();
        }
        true
    }

    /// Requests a cooperative halt: the run loop exits before taking the next event.
    /// Has no effect when the simulation is idle.
    pub fn stop(&mut self) {
        self.running = false;
    }

    fn on_task_arrival(&mut self, task: NpuTask) {
        log_debug!(self, "Task {} arrived (demands {} NPUs)", task.id(), task.npu_demand());
        self.waiting_tasks.push(task);
        self.allocate_waiting_tasks();
    }

    fn on_task_completion(&mut self, task: NpuTask, npu_ids: Vec<NpuId>) {
        self.pool.deallocate_for_task(&task, &npu_ids);
        self.allocations.remove(task.id());
        self.stats.completed_task_count += 1;
        self.stats.add_response_time(self.clock - task.arrival_time());
        log_debug!(self, "Task {} completed, released NPUs {:?}", task.id(), npu_ids);
        self.completed_tasks.push(task);
        // Freed capacity may unblock tasks that were waiting.
        self.allocate_waiting_tasks();
    }

    /// Admission cycle: repeatedly offers the waiting tasks to the pool until a pass
    /// admits nothing or the waiting list empties.
    ///
    /// Every admitted task leaves the waiting list, so the cycle takes at most as
    /// many passes as there are waiting tasks.
    fn allocate_waiting_tasks(&mut self) {
        while !self.waiting_tasks.is_empty() {
            let committed = self.pool.allocate_for_waiting_tasks(&self.waiting_tasks);
            if committed.is_empty() {
                break;
            }
            for allocation in committed {
                let task = allocation.task;
                let npu_ids = allocation.npu_ids;
                self.waiting_tasks.retain(|t| t.id() != task.id());
                self.stats.accepted_task_count += 1;
                log_debug!(self, "Task {} accepted, allocated NPUs {:?}", task.id(), npu_ids);
                self.allocations.insert(task.id().to_string(), npu_ids.clone());
                self.event_queue
                    .add(self.clock + task.duration(), EventPayload::TaskCompletion { task, npu_ids });
            }
        }
    }

    /// Replaces the allocation strategy, resetting its internal state.
    pub fn set_strategy(&mut self, strategy: Box<dyn AllocationStrategy>) {
        self.pool.set_strategy(strategy);
        log_debug!(self, "Strategy set to {}", self.pool.strategy_name());
    }

    /// Takes a copy-isolated snapshot of the current simulation state.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            current_time: self.clock,
            waiting_tasks: self.waiting_tasks.clone(),
            completed_tasks: self.completed_tasks.clone(),
            pool_statistics: self.pool.statistics(),
            statistics: self.stats.clone(),
        }
    }

    /// Returns the simulation to its freshly constructed state: pending events,
    /// task lists, allocations and statistics are discarded, the pool is emptied and
    /// the strategy re-initialized, the clock returns to zero.
    pub fn reset(&mut self) {
        self.event_queue.clear();
        self.waiting_tasks.clear();
        self.completed_tasks.clear();
        self.allocations.clear();
        self.submitted_task_ids.clear();
        self.stats.reset();
        self.pool.reset();
        self.clock = SimTime::ZERO;
        self.running = false;
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> SimTime {
        self.clock
    }

    /// Component name used in log records.
    pub fn name(&self) -> &str {
        "simulation"
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pool(&self) -> &NpuPool {
        &self.pool
    }

    pub fn statistics(&self) -> &SimulationStatistics {
        &self.stats
    }

    pub fn strategy_name(&self) -> String {
        self.pool.strategy_name()
    }

    /// Tasks that arrived but are not allocated yet.
    pub fn waiting_tasks(&self) -> &[NpuTask] {
        &self.waiting_tasks
    }

    /// Tasks that ran to completion, in completion order.
    pub fn completed_tasks(&self) -> &[NpuTask] {
        &self.completed_tasks
    }

    /// Live allocation table: task id to the NPU ids it currently holds.
    pub fn allocations(&self) -> &HashMap<String, Vec<NpuId>> {
        &self.allocations
    }

    fn log_status(&self) {
        let pool_stats = self.pool.statistics();
        log_info!(
            self,
            "Status: {} events processed, {} accepted, {} waiting, {} completed, {} events pending",
            self.stats.processed_event_count,
            self.stats.accepted_task_count,
            self.waiting_tasks.len(),
            self.stats.completed_task_count,
            self.event_queue.len()
        );
        log_info!(
            self,
            "Pool: avg compute {:.1}%, avg HBM {:.1}%, {} of {} NPUs idle, {} tasks running",
            pool_stats.average_compute_utilization * 100.,
            pool_stats.average_hbm_utilization * 100.,
            pool_stats.idle_npu_count,
            self.pool.npu_count(),
            pool_stats.total_running_tasks
        );
    }

    fn log_summary(&self) {
        log_info!(
            self,
            "Simulation completed: {} submitted, {} accepted, {} completed, {} waiting",
            self.stats.submitted_task_count,
            self.stats.accepted_task_count,
            self.stats.completed_task_count,
            self.waiting_tasks.len()
        );
        log_info!(
            self,
            "Acceptance rate: {:.2}%, average response time: {}, throughput: {:.3} tasks/s",
            self.stats.acceptance_rate() * 100.,
            self.stats.average_response_time(),
            self.stats.throughput(self.clock)
        );
    }
}
