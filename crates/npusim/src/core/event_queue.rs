//! Priority queue of simulation events.

use std::collections::BinaryHeap;

use crate::core::events::{EventPayload, SimEvent};
use crate::core::sim_time::SimTime;

/// Min-queue of events ordered by (timestamp, insertion sequence).
///
/// The queue assigns sequence numbers itself, so events added at equal timestamps
/// come back in insertion order.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: BinaryHeap<SimEvent>,
    event_count: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an event with the given timestamp and returns its sequence number.
    pub fn add(&mut self, time: SimTime, payload: EventPayload) -> u64 {
        let seq = self.event_count;
        self.event_count += 1;
        self.events.push(SimEvent { time, seq, payload });
        seq
    }

    /// Removes and returns the earliest event, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<SimEvent> {
        self.events.pop()
    }

    /// Returns the earliest event without removing it.
    pub fn peek(&self) -> Option<&SimEvent> {
        self.events.peek()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops all pending events. Sequence numbers are not reused afterwards.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::NpuTask;

    fn arrival(id: &str) -> EventPayload {
        EventPayload::TaskArrival {
            task: NpuTask::new(id, SimTime::ZERO, 1, 0.5, 0.5, SimTime::from_secs(1)),
        }
    }

    fn arrival_id(event: &SimEvent) -> String {
        match &event.payload {
            EventPayload::TaskArrival { task } => task.id().to_string(),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_events_come_back_in_time_order() {
        let mut queue = EventQueue::new();
        queue.add(SimTime::from_secs(10), arrival("a"));
        queue.add(SimTime::from_secs(5), arrival("c"));
        queue.add(SimTime::from_secs_f64(7.5), arrival("b"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().time, SimTime::from_secs(5));
        assert_eq!(queue.pop().unwrap().time, SimTime::from_secs_f64(7.5));
        assert_eq!(queue.pop().unwrap().time, SimTime::from_secs(10));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_timestamps_drain_in_insertion_order() {
        let mut queue = EventQueue::new();
        let time = SimTime::from_secs(3);
        queue.add(time, arrival("first"));
        queue.add(time, arrival("second"));
        queue.add(time, arrival("third"));

        assert_eq!(arrival_id(&queue.pop().unwrap()), "first");
        assert_eq!(arrival_id(&queue.pop().unwrap()), "second");
        assert_eq!(arrival_id(&queue.pop().unwrap()), "third");
    }

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.add(SimTime::from_secs(1), arrival("a")), 0);
        assert_eq!(queue.add(SimTime::from_secs(2), arrival("b")), 1);
        queue.clear();
        // The counter survives clear so sequence numbers stay unique.
        assert_eq!(queue.add(SimTime::from_secs(3), arrival("c")), 2);
    }

    #[test]
    fn test_empty_queue_returns_none() {
        let mut queue = EventQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.peek().is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut queue = EventQueue::new();
        queue.add(SimTime::from_secs(1), arrival("a"));
        assert_eq!(queue.peek().unwrap().time, SimTime::from_secs(1));
        assert_eq!(queue.len(), 1);
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_clear_discards_pending_events() {
        let mut queue = EventQueue::new();
        queue.add(SimTime::from_secs(1), arrival("a"));
        queue.add(SimTime::from_secs(2), arrival("b"));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
