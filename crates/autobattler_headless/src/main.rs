//! Headless auto-battler runner.
//!
//! Runs battles without graphics from RON scenario files.
//! Designed for balance checks, CI testing, and determinism verification.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario and print the JSON report on stdout
//! cargo run -p autobattler_headless -- run --scenario scenarios/skirmish.ron
//!
//! # Write the report to a file, validating occupancy every tick
//! cargo run -p autobattler_headless -- run -s scenarios/skirmish.ron -o out/report.json --validate
//!
//! # Verify determinism
//! cargo run -p autobattler_headless -- verify -s scenarios/skirmish.ron --runs 5
//!
//! # Time the tick loop
//! cargo run -p autobattler_headless -- benchmark -s scenarios/skirmish.ron --iterations 500
//! ```
//!
//! Output (stdout): the JSON report unless `--output` is given
//! Logs (stderr): tracing output

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autobattler_headless::{
    board::{render_board, BoardStyle},
    runner::{HeadlessRunner, RunnerConfig},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "autobattler_headless")]
#[command(about = "Headless auto-battler runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle and emit a JSON report
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Check grid occupancy after every tick
        #[arg(long)]
        validate: bool,

        /// Include the per-tick event log in the report
        #[arg(long)]
        events: bool,

        /// Print the starting board to stderr
        #[arg(long)]
        board: bool,

        /// Disable colored board output
        #[arg(long)]
        no_color: bool,
    },

    /// Verify determinism by running the same scenario multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Replay a scenario many times for benchmarking
    Benchmark {
        /// Scenario to benchmark
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of times to replay the scenario
        #[arg(short, long, default_value = "1000")]
        iterations: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for the report)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            output,
            validate,
            events,
            board,
            no_color,
        } => {
            cmd_run(scenario, output, validate, events, board, no_color);
        }
        Commands::Verify { scenario, runs } => {
            cmd_verify(scenario, runs);
        }
        Commands::Benchmark {
            scenario,
            iterations,
        } => {
            cmd_benchmark(scenario, iterations);
        }
    }
}

fn load_or_exit(path: &Path) -> Scenario {
    match Scenario::load(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load scenario");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single battle
fn cmd_run(
    scenario_path: PathBuf,
    output: Option<PathBuf>,
    validate: bool,
    events: bool,
    board: bool,
    no_color: bool,
) {
    let scenario = load_or_exit(&scenario_path);
    tracing::info!(scenario = %scenario.name, path = %scenario_path.display(), "Loaded scenario");

    if board {
        match scenario.build_battle() {
            Ok(battle) => {
                let style = BoardStyle {
                    use_color: !no_color,
                    ..BoardStyle::default()
                };
                eprintln!("Initial board:\n{}", render_board(&battle, &style));
            }
            Err(e) => {
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        }
    }

    let runner = HeadlessRunner::with_config(RunnerConfig {
        validate,
        record_events: events,
    });
    let report = match runner.run(&scenario) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = report.save(&path) {
                tracing::error!(error = %e, path = %path.display(), "Failed to save report");
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
            eprintln!("Report saved to: {}", path.display());
        }
        None => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("FATAL: Failed to encode report: {e}");
                std::process::exit(1);
            }
        },
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATTLE COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Outcome: {:?}", report.summary.outcome);
    eprintln!("Ticks: {}", report.summary.ticks);
    eprintln!(
        "Survivors: {} allies, {} enemies",
        report.summary.allies_remaining, report.summary.enemies_remaining
    );
    eprintln!("Final state hash: {:016x}", report.final_state_hash);
}

/// Verify determinism
fn cmd_verify(scenario_path: PathBuf, runs: u32) {
    let scenario = load_or_exit(&scenario_path);
    tracing::info!(
        "Verifying determinism: {} ({} runs)",
        scenario.name,
        runs
    );

    let runner = HeadlessRunner::with_config(RunnerConfig {
        validate: true,
        record_events: false,
    });
    let hashes = match runner.verify(&scenario, runs) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("FAIL: Error during verification: {e}");
            std::process::exit(1);
        }
    };

    if hashes.windows(2).all(|w| w[0] == w[1]) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        for (i, hash) in hashes.iter().enumerate() {
            eprintln!("  Run {i}: {hash:016x}");
        }
        std::process::exit(1);
    }
}

/// Run benchmark
fn cmd_benchmark(scenario_path: PathBuf, iterations: u32) {
    use std::time::Instant;

    let scenario = load_or_exit(&scenario_path);
    tracing::info!("Running {} iterations of {}", iterations, scenario.name);

    let mut total_ticks = 0u64;
    let start = Instant::now();
    for _ in 0..iterations {
        let mut battle = match scenario.build_battle() {
            Ok(b) => b,
            Err(e) => {
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        };
        let summary = battle.run_until_over(scenario.dt, scenario.max_ticks);
        total_ticks += summary.ticks;
    }
    let elapsed = start.elapsed();

    let tps = total_ticks as f64 / elapsed.as_secs_f64().max(1e-9);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles: {iterations}");
    eprintln!("Ticks: {total_ticks}");
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {tps:.1}");
}
