//! Synthetic learner harness
//!
//! Walks a simulated student through a lesson track, asking the predictor
//! for the next action and reporting each outcome back.
//!
//! Usage:
//!   bkt-simulate --base-url http://127.0.0.1:8001 --seed 42 --verbose
//!   bkt-simulate --in-process --log-jsonl runs/sim.jsonl

use std::path::PathBuf;

use bkt_algo::SimulationConfig;
use bkt_backend_rust::client::{BktClient, HEALTH_RETRIES, HEALTH_RETRY_DELAY};
use bkt_backend_rust::config::Config;
use bkt_backend_rust::logging;
use bkt_backend_rust::simulation::{self, Backend, DriverOptions};
use bkt_backend_rust::state::AppState;
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "bkt-simulate")]
#[command(about = "Drive a synthetic learner against the BKT predictor")]
#[command(version)]
struct Args {
    /// Predictor service base URL
    #[arg(long, env = "BKT_BASE_URL", default_value = "http://127.0.0.1:8001")]
    base_url: String,

    /// Maximum number of steps
    #[arg(long, default_value = "100")]
    iter_limit: usize,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log one line per step
    #[arg(long)]
    verbose: bool,

    /// Write run events as JSON lines to this file
    #[arg(long)]
    log_jsonl: Option<PathBuf>,

    /// Transition probability sent with each observation
    #[arg(long, default_value = "0.05")]
    transition: f64,

    /// Attempts required before a lesson can complete on mastery
    #[arg(long, default_value = "8")]
    min_actions_per_lesson: u32,

    /// Lessons in the track
    #[arg(long, default_value = "10")]
    total_lessons: u32,

    /// Use a local engine configured from the environment instead of HTTP
    #[arg(long)]
    in_process: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    logging::init_cli_tracing("info");

    let args = Args::parse();

    let backend = if args.in_process {
        let config = Config::from_env();
        for warning in &config.warnings {
            warn!("{}", warning);
        }
        match AppState::create_engine(&config) {
            Ok(engine) => Backend::InProcess(engine),
            Err(e) => {
                error!("Failed to build engine: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let client = BktClient::new(args.base_url);
        if let Err(e) = client.wait_for_server(HEALTH_RETRIES, HEALTH_RETRY_DELAY).await {
            error!("{}", e);
            std::process::exit(1);
        }
        info!("Predictor ready at {}", client.base_url());
        Backend::Http(client)
    };

    let options = DriverOptions {
        iter_limit: args.iter_limit,
        seed: args.seed,
        verbose: args.verbose,
        log_jsonl: args.log_jsonl,
        config: SimulationConfig {
            total_lessons: args.total_lessons,
            min_actions_per_lesson: args.min_actions_per_lesson,
            transition: args.transition,
            ..SimulationConfig::default()
        },
    };

    match simulation::run(&backend, &options).await {
        Ok(summary) => {
            println!("\n=== SUMMARY ===");
            println!("{summary}");
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}
