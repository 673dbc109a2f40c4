//! Aggregate run statistics.

use serde::Serialize;

use crate::core::sim_time::SimTime;

/// Counters and response-time distribution accumulated over a run.
///
/// All derived values (rates, averages, extremes) are recomputed from the raw
/// counters on request, so the struct never holds stale aggregates.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimulationStatistics {
    pub submitted_task_count: u64,
    pub accepted_task_count: u64,
    pub completed_task_count: u64,
    pub processed_event_count: u64,
    response_times: Vec<SimTime>,
}

impl SimulationStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response_time(&mut self, response_time: SimTime) {
        self.response_times.push(response_time);
    }

    pub fn response_times(&self) -> &[SimTime] {
        &self.response_times
    }

    /// Fraction of submitted tasks that were accepted, zero before any submission.
    pub fn acceptance_rate(&self) -> f64 {
        if self.submitted_task_count == 0 {
            return 0.;
        }
        self.accepted_task_count as f64 / self.submitted_task_count as f64
    }

    pub fn average_response_time(&self) -> SimTime {
        if self.response_times.is_empty() {
            return SimTime::ZERO;
        }
        let total = self.response_times.iter().fold(SimTime::ZERO, |acc, &t| acc + t);
        total / self.response_times.len() as f64
    }

    pub fn min_response_time(&self) -> SimTime {
        self.response_times.iter().min().copied().unwrap_or(SimTime::ZERO)
    }

    pub fn max_response_time(&self) -> SimTime {
        self.response_times.iter().max().copied().unwrap_or(SimTime::ZERO)
    }

    /// Completed tasks per second of virtual time, zero for a non-positive span.
    pub fn throughput(&self, elapsed: SimTime) -> f64 {
        if !elapsed.is_positive() {
            return 0.;
        }
        self.completed_task_count as f64 / elapsed.as_secs_f64()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statistics_yield_zeros() {
        let stats = SimulationStatistics::new();
        assert_eq!(stats.acceptance_rate(), 0.);
        assert_eq!(stats.average_response_time(), SimTime::ZERO);
        assert_eq!(stats.min_response_time(), SimTime::ZERO);
        assert_eq!(stats.max_response_time(), SimTime::ZERO);
        assert_eq!(stats.throughput(SimTime::from_secs(10)), 0.);
        assert_eq!(stats.throughput(SimTime::ZERO), 0.);
    }

    #[test]
    fn acceptance_rate_tracks_counters() {
        let mut stats = SimulationStatistics::new();
        stats.submitted_task_count = 8;
        stats.accepted_task_count = 6;
        assert_eq!(stats.acceptance_rate(), 0.75);
    }

    #[test]
    fn response_time_aggregates() {
        let mut stats = SimulationStatistics::new();
        stats.add_response_time(SimTime::from_secs(10));
        stats.add_response_time(SimTime::from_secs(30));
        stats.add_response_time(SimTime::from_secs(20));
        assert_eq!(stats.average_response_time(), SimTime::from_secs(20));
        assert_eq!(stats.min_response_time(), SimTime::from_secs(10));
        assert_eq!(stats.max_response_time(), SimTime::from_secs(30));
    }

    #[test]
    fn throughput_uses_elapsed_virtual_time() {
        let mut stats = SimulationStatistics::new();
        stats.completed_task_count = 20;
        assert_eq!(stats.throughput(SimTime::from_secs(10)), 2.);
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = SimulationStatistics::new();
        stats.submitted_task_count = 3;
        stats.accepted_task_count = 2;
        stats.completed_task_count = 1;
        stats.processed_event_count = 5;
        stats.add_response_time(SimTime::from_secs(4));
        stats.reset();
        assert_eq!(stats.submitted_task_count, 0);
        assert_eq!(stats.accepted_task_count, 0);
        assert_eq!(stats.completed_task_count, 0);
        assert_eq!(stats.processed_event_count, 0);
        assert!(stats.response_times().is_empty());
    }
}
