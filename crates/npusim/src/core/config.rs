//! Simulation configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSimulationConfig {
    pub npu_count: Option<u32>,
    pub strategy: Option<String>,
    pub status_log_period: Option<u64>,
    pub trace: Option<TaskTraceConfig>,
}

/// Holds information about the used task trace file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TaskTraceConfig {
    /// Trace file path.
    pub path: String,
}

impl std::fmt::Display for TaskTraceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "task trace config, path = {}", self.path)
    }
}

/// Represents simulation configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Number of NPUs in the pool.
    pub npu_count: u32,
    /// Allocation strategy used by the pool, a name with optional options string.
    pub strategy: String,
    /// Number of processed events between periodic status records, 0 disables them.
    pub status_log_period: u64,
    /// Used task trace.
    pub trace: Option<TaskTraceConfig>,
}

impl SimulationConfig {
    /// Creates simulation config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Self {
        let raw: RawSimulationConfig = serde_yaml::from_str(
            &std::fs::read_to_string(file_name).unwrap_or_else(|_| panic!("Can't read file {}", file_name)),
        )
        .unwrap_or_else(|_| panic!("Can't parse YAML from file {}", file_name));

        Self {
            npu_count: raw.npu_count.unwrap_or(8),
            strategy: raw.strategy.unwrap_or_else(|| "FirstFit".to_string()),
            status_log_period: raw.status_log_period.unwrap_or(100),
            trace: raw.trace,
        }
    }
}

/// Parses config value string, which consists of two parts - name and options.
/// Example: PriorityAware[demand_threshold=4] parts are name PriorityAware
/// and options string "demand_threshold=4".
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.to_string(), Some(r.to_string().replace(']', ""))),
        None => (config_str.to_string(), None),
    }
}

/// Parses options string from config value, returns map with option names and values.
///
/// # Examples
///
/// ```rust
/// use npusim::core::config::parse_options;
///
/// let options = parse_options("option1=0.8,option2=something");
/// assert_eq!(options.get("option1").unwrap(), "0.8");
/// assert_eq!(options.get("option2").unwrap(), "something");
/// assert_eq!(options.get("option3"), None);
/// ```
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.to_string(), value.to_string());
        }
    }
    options
}
