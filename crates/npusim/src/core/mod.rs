//! Core simulation components.

pub mod config;
pub mod event_queue;
pub mod events;
pub mod npu;
pub mod pool;
pub mod sim_time;
pub mod stats;
pub mod strategies;
pub mod strategy;
pub mod task;
