use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde::Serialize;

use circuit_guard::config::{load_config, Settings};
use circuit_guard::observability::logging::init_logging;
use circuit_guard::{BreakerError, BreakerRegistry, CircuitBreaker};

#[derive(Parser)]
#[command(name = "circuit-guard")]
#[command(about = "Validate and exercise circuit breaker configurations", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the resolved breakers
    Check,
    /// Drive one breaker with a synthetic, partly failing workload
    Simulate {
        /// Breaker name (picks up its override from the config)
        #[arg(short, long, default_value = "demo")]
        breaker: String,

        /// Total calls to attempt
        #[arg(long, default_value_t = 200)]
        calls: u32,

        /// Concurrent callers
        #[arg(long, default_value_t = 4)]
        concurrency: u32,

        /// Probability in [0, 1] that a call fails
        #[arg(long, default_value_t = 0.6)]
        failure_rate: f64,

        /// Simulated latency of each call in milliseconds
        #[arg(long, default_value_t = 5)]
        latency_ms: u64,
    },
}

/// Outcome tally of a simulation run.
#[derive(Debug, Default, Serialize)]
struct Tally {
    succeeded: u32,
    failed: u32,
    rejected_open: u32,
    rejected_half_open: u32,
}

impl Tally {
    fn add(&mut self, other: &Tally) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.rejected_open += other.rejected_open;
        self.rejected_half_open += other.rejected_half_open;
    }
}

/// Shape of a simulated workload.
#[derive(Debug, Clone, Copy)]
struct Workload {
    calls: u32,
    concurrency: u32,
    failure_rate: f64,
    latency: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config(path)?,
        None => Settings::default(),
    };
    init_logging(&settings.observability);

    match cli.command {
        Commands::Check => {
            tracing::info!(breakers = settings.breakers.len(), "Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&check_report(&settings))?);
        }
        Commands::Simulate {
            breaker,
            calls,
            concurrency,
            failure_rate,
            latency_ms,
        } => {
            let registry = BreakerRegistry::new(settings)?;
            let breaker = registry.get(&breaker)?;
            let workload = Workload {
                calls,
                concurrency: concurrency.max(1),
                failure_rate: failure_rate.clamp(0.0, 1.0),
                latency: Duration::from_millis(latency_ms),
            };

            let tally = simulate(breaker.clone(), workload).await?;
            println!("{}", serde_json::to_string_pretty(&simulation_report(&tally, &breaker))?);
        }
    }

    Ok(())
}

/// Defaults plus the effective settings of every configured breaker.
fn check_report(settings: &Settings) -> serde_json::Value {
    serde_json::json!({
        "defaults": settings.defaults,
        "breakers": settings.resolved(),
    })
}

fn simulation_report(tally: &Tally, breaker: &CircuitBreaker) -> serde_json::Value {
    serde_json::json!({
        "tally": tally,
        "breaker": breaker.snapshot(),
    })
}

/// Split `workload` over concurrent tasks and add up their outcomes.
async fn simulate(breaker: Arc<CircuitBreaker>, workload: Workload) -> Result<Tally, tokio::task::JoinError> {
    tracing::info!(
        breaker = %breaker.name(),
        calls = workload.calls,
        concurrency = workload.concurrency,
        failure_rate = workload.failure_rate,
        "Starting simulation"
    );

    let tasks = (0..workload.concurrency).map(|worker| {
        let breaker = breaker.clone();
        // Spread the remainder over the first workers.
        let share = workload.calls / workload.concurrency
            + u32::from(worker < workload.calls % workload.concurrency);
        tokio::spawn(run_worker(breaker, share, workload.failure_rate, workload.latency))
    });

    let mut tally = Tally::default();
    for result in join_all(tasks).await {
        tally.add(&result?);
    }
    Ok(tally)
}

async fn run_worker(breaker: Arc<CircuitBreaker>, calls: u32, failure_rate: f64, latency: Duration) -> Tally {
    let mut tally = Tally::default();

    for _ in 0..calls {
        let outcome = breaker
            .call_async(|| async move {
                tokio::time::sleep(latency).await;
                if rand::random::<f64>() < failure_rate {
                    Err("synthetic failure")
                } else {
                    Ok(())
                }
            })
            .await;

        match outcome {
            Ok(()) => tally.succeeded += 1,
            Err(BreakerError::Inner(_)) => tally.failed += 1,
            Err(BreakerError::Open { .. }) => {
                tally.rejected_open += 1;
                // Back off a little instead of spinning on an open breaker.
                tokio::time::sleep(latency).await;
            }
            Err(BreakerError::TooManyRequests { .. }) => tally.rejected_half_open += 1,
        }
    }

    tally
}
