//! Headless battle runner for balance testing and CI verification.
//!
//! Loads a RON [`Scenario`], runs it through the deterministic combat core
//! and writes a JSON [`BattleReport`]. Logs go to stderr; the report goes to
//! a file or stdout.
//!
//! # Example
//!
//! ```bash
//! # Run a scenario and print the report
//! cargo run -p autobattler_headless -- run --scenario scenarios/skirmish.ron
//!
//! # Check occupancy every tick and keep the event log
//! cargo run -p autobattler_headless -- run -s scenarios/skirmish.ron --validate --events -o report.json
//!
//! # Verify determinism
//! cargo run -p autobattler_headless -- verify -s scenarios/skirmish.ron --runs 5
//! ```

pub mod board;
pub mod runner;
pub mod scenario;

pub use board::{render_board, BoardStyle};
pub use runner::{BattleReport, HeadlessRunner, RunnerConfig, RunnerError};
pub use scenario::{Placement, Scenario, ScenarioError};
