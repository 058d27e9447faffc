// Queue KPI Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/queue-kpi-simulator --scenario call-center.json
// ```
//
// Or with overrides:
//
// ```console
// $ ./target/release/queue-kpi-simulator --scenario call-center.json --discipline priority --capacity 3 --verbose
// ```

use anyhow::{bail, Context};
use clap::Parser;
use queue_kpi_simulator::simulation::{LoggingConfig, LoggingGuard, ReplayOutcome, Scenario, TraceReplay};
use queue_kpi_simulator::types::config::CliArgs;
use queue_kpi_simulator::types::ModelConfig;
use std::fs;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match ModelConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result: Result<LoggingGuard, _> = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        // Default: minimal logging for normal users
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };

    let _logging_guard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Queue KPI Simulator");

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("Queue KPI Simulator completed successfully");
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let scenario = args
        .scenario
        .as_deref()
        .map(|path| {
            Scenario::from_file(path).with_context(|| format!("Failed to load scenario {}", path))
        })
        .transpose()?;

    let dry_run = args.dry_run;
    let output = args.output.clone();

    // Scenario config < --config file < CLI flags
    let base = scenario.as_ref().map(Scenario::base_config).unwrap_or_default();
    let config = ModelConfig::from_cli_args_with_base(args, base)
        .context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    info!("Configuration loaded and validated successfully");

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - scenario will not be replayed.");
        print_configuration_summary(&config, scenario.as_ref());
        return Ok(());
    }

    let Some(scenario) = scenario else {
        bail!("No scenario given; pass --scenario FILE (or --dry-run to only check the configuration)");
    };

    print_configuration_summary(&config, Some(&scenario));

    let outcome = TraceReplay::new(config)?
        .run(&scenario.arrivals)
        .context("Trace replay failed")?;

    print_outcome_summary(&outcome);

    let json = outcome.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write report to {}", path))?;
            eprintln!("Report written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Print configuration summary for dry runs and before a replay
fn print_configuration_summary(config: &ModelConfig, scenario: Option<&Scenario>) {
    eprintln!("Configuration Summary:");
    eprintln!("  Discipline: {}", config.discipline);
    eprintln!("  Servers: {}", config.capacity);
    if let Some(queue_capacity) = config.queue_capacity {
        eprintln!("  Queue capacity: {}", queue_capacity);
    }
    match config.end_time {
        Some(end) => eprintln!("  Window: {} .. {}", config.start_time, end),
        None => eprintln!("  Window: {} .. last event", config.start_time),
    }
    eprintln!("  Confidence level: {}", config.confidence_level);
    eprintln!(
        "  Warm-up detection: {} batches, threshold {}, patience {}",
        config.transient.num_batches, config.transient.threshold, config.transient.patience
    );
    if let Some(scenario) = scenario {
        eprintln!("  Arrivals in trace: {}", scenario.arrivals.len());
    }
    eprintln!();
}

fn print_outcome_summary(outcome: &ReplayOutcome) {
    eprintln!("Replay Complete!");
    eprintln!("  Events processed: {}", outcome.events_processed);
    eprintln!("  KPIs reduced at: {}", outcome.end_time);
    if outcome.rejected > 0 {
        eprintln!("  Rejected arrivals: {}", outcome.rejected);
    }
    match outcome.kpis.snapshot() {
        Some(snapshot) => {
            eprintln!("  Mean wait: {:.4}", snapshot.wait_time.mean);
            eprintln!("  Utilization: {:.2}%", snapshot.server_utilization.utilization * 100.0);
        }
        None => {
            eprintln!("  KPIs unavailable: {}", outcome.kpis.error().unwrap_or("unknown reason"));
        }
    }
    if outcome.warmup.observation_cutoff > 0 {
        eprintln!(
            "  Warm-up: first {} observations ({} batches)",
            outcome.warmup.observation_cutoff, outcome.warmup.transient_end_batch
        );
    }
    eprintln!();
}
