//! Reader for task traces in CSV format.

use std::fs::File;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::sim_time::SimTime;
use crate::core::task::NpuTask;

/// Represents one task record from a trace file.
///
/// Note that times are stored in seconds and ratios as fractions of NPU capacity.
#[derive(Serialize, Deserialize, Debug)]
struct TaskRecord {
    id: String,
    arrival_time: f64,
    npu_demand: u32,
    compute_ratio: f64,
    hbm_ratio: f64,
    duration: f64,
}

/// Reads task traces from CSV files with the header
/// `id,arrival_time,npu_demand,compute_ratio,hbm_ratio,duration`.
///
/// Pass the trace file to the [`parse()`](TraceReader::parse) method, then either
/// iterate with [`get_next_task()`](TraceReader::get_next_task) (this is what
/// [`submit_trace`](crate::simulation::LoadBalancingSimulation::submit_trace) does)
/// or take all loaded tasks at once via [`tasks()`](TraceReader::tasks).
#[derive(Default)]
pub struct TraceReader {
    tasks: Vec<NpuTask>,
    current_task: usize,
}

impl TraceReader {
    /// Creates an empty trace reader.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses the CSV file with task records.
    pub fn parse(&mut self, file_name: &str) {
        let mut reader = csv::Reader::from_reader(File::open(file_name).unwrap());
        for record in reader.deserialize() {
            let record: TaskRecord = record.unwrap();
            self.tasks.push(NpuTask::new(
                &record.id,
                SimTime::from_secs_f64(record.arrival_time),
                record.npu_demand,
                record.compute_ratio,
                record.hbm_ratio,
                SimTime::from_secs_f64(record.duration),
            ));
        }

        info!("Read {} tasks", self.tasks.len());
    }

    /// Returns the next task from the trace, advancing the cursor.
    pub fn get_next_task(&mut self) -> Option<NpuTask> {
        if self.current_task >= self.tasks.len() {
            return None;
        }
        let task = self.tasks[self.current_task].clone();
        self.current_task += 1;
        Some(task)
    }

    /// Returns all loaded tasks regardless of the cursor position.
    pub fn tasks(&self) -> &[NpuTask] {
        &self.tasks
    }
}
