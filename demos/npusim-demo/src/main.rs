use std::fs::File;
use std::time::Instant;

use clap::Parser;
use indexmap::IndexMap;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use npusim::core::config::SimulationConfig;
use npusim::core::sim_time::SimTime;
use npusim::core::task::NpuTask;
use npusim::extensions::trace_reader::TraceReader;
use npusim::simulation::{LoadBalancingSimulation, SimulationSnapshot};

/// Mean of the exponential inter-arrival time distribution.
const MEAN_INTERARRIVAL_SECS: f64 = 5.0;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to simulation config in YAML format
    #[clap(short, long)]
    config: Option<String>,

    /// Path to a task trace in CSV format (overrides the config trace)
    #[clap(short, long)]
    trace: Option<String>,

    /// Path to save per-strategy results in JSON format
    #[clap(short, long)]
    results: Option<String>,

    /// Comma-separated list of strategies to compare
    #[clap(
        short,
        long,
        default_value = "FirstFit,BestFit,LeastLoaded,RoundRobin,PriorityAware"
    )]
    strategies: String,

    /// Number of NPUs in the pool (ignored when a config file is given)
    #[clap(short, long, default_value_t = 8)]
    npu_count: u32,

    /// Number of generated tasks when no trace is used
    #[clap(long, default_value_t = 20)]
    task_count: u32,

    /// Seed of the task generator
    #[clap(long, default_value_t = 42)]
    seed: u64,
}

/// Generates a synthetic workload: Poisson arrivals with uniformly distributed
/// NPU demand, resource shares and service time.
fn generate_tasks(task_count: u32, seed: u64) -> Vec<NpuTask> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut tasks = Vec::new();
    let mut arrival = 0.;
    for i in 1..=task_count {
        arrival += -(1. - rng.gen::<f64>()).ln() * MEAN_INTERARRIVAL_SECS;
        let npu_demand = rng.gen_range(1..=4);
        let compute_ratio = rng.gen_range(0.2..0.8);
        let hbm_ratio = rng.gen_range(0.1..0.6);
        let duration = rng.gen_range(10.0..50.0);
        tasks.push(NpuTask::new(
            &format!("task-{:03}", i),
            SimTime::from_secs_f64(arrival),
            npu_demand,
            compute_ratio,
            hbm_ratio,
            SimTime::from_secs_f64(duration),
        ));
    }
    tasks
}

fn load_tasks(args: &Args, config: &SimulationConfig) -> Vec<NpuTask> {
    let trace_path = args.trace.clone().or_else(|| config.trace.clone().map(|t| t.path));
    match trace_path {
        Some(path) => {
            let mut trace = TraceReader::new();
            trace.parse(&path);
            trace.tasks().to_vec()
        }
        None => generate_tasks(args.task_count, args.seed),
    }
}

fn run_strategy(config: &SimulationConfig, tasks: &[NpuTask]) -> SimulationSnapshot {
    info!("Running {} strategy", config.strategy);
    let mut sim = LoadBalancingSimulation::from_config(config);
    for task in tasks {
        sim.submit_task(task.clone());
    }
    sim.run();
    print_results(&sim);
    sim.snapshot()
}

fn print_results(sim: &LoadBalancingSimulation) {
    let stats = sim.statistics();
    println!("describing {}", sim.strategy_name());
    println!("- {} tasks submitted", stats.submitted_task_count);
    println!("- {} tasks accepted", stats.accepted_task_count);
    println!("- {} tasks completed", stats.completed_task_count);
    println!("- {} tasks still waiting", sim.waiting_tasks().len());
    println!("- acceptance rate = {:.2}%", stats.acceptance_rate() * 100.);
    println!("- average response time = {}", stats.average_response_time());
    println!(
        "- min/max response time = {} / {}",
        stats.min_response_time(),
        stats.max_response_time()
    );
    println!("- throughput = {:.3} tasks/s", stats.throughput(sim.time()));
    println!("- virtual time = {}", sim.time());
}

fn main() {
    init_logger();

    let args = Args::parse();
    let simulation_start = Instant::now();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path),
        None => SimulationConfig {
            npu_count: args.npu_count,
            strategy: "FirstFit".to_string(),
            status_log_period: 100,
            trace: None,
        },
    };

    let tasks = load_tasks(&args, &config);
    println!("{} tasks prepared, pool of {} NPUs", tasks.len(), config.npu_count);

    let mut results = IndexMap::new();
    for name in args.strategies.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let mut strategy_config = config.clone();
        strategy_config.strategy = name.to_string();
        let snapshot = run_strategy(&strategy_config, &tasks);
        results.insert(name.to_string(), snapshot);
    }

    if let Some(path) = &args.results {
        let mut file = File::create(path).unwrap();
        serde_json::to_writer_pretty(&mut file, &results).unwrap();
        println!("Results saved to file: {}", path);
    }

    println!("Simulation process time {:.2?}", simulation_start.elapsed());
}
