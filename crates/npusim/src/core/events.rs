//! Simulation events.

use std::cmp::Ordering;

use serde::Serialize;

use crate::core::npu::NpuId;
use crate::core::sim_time::SimTime;
use crate::core::task::NpuTask;

/// Payload of a simulation event.
///
/// The set of event kinds is closed; the engine dispatches them with an explicit
/// `match`.
#[derive(Clone, Debug, Serialize)]
pub enum EventPayload {
    /// A task reaches the system at its arrival time.
    TaskArrival { task: NpuTask },
    /// A previously allocated task finishes on the listed NPUs.
    TaskCompletion { task: NpuTask, npu_ids: Vec<NpuId> },
}

/// Simulation event ordered by timestamp, with ties broken by the insertion sequence
/// number assigned by the event queue.
#[derive(Clone, Debug, Serialize)]
pub struct SimEvent {
    pub time: SimTime,
    pub seq: u64,
    pub payload: EventPayload,
}

impl Eq for SimEvent {}

impl PartialEq for SimEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

// Inverted ordering turns the std max-heap into a min-queue.
impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
