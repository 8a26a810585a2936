//! Headless battle runner.
//!
//! Runs a [`Scenario`] to completion and produces a serializable
//! [`BattleReport`] for CI checks and balance review.

use std::path::Path;

use autobattler_core::battle::{Battle, BattleSummary};
use autobattler_core::error::CombatError;
use autobattler_core::events::CombatEvent;
use autobattler_core::unit::{Side, Unit, UnitId, UnitState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::scenario::{Scenario, ScenarioError};

/// Error type for runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Scenario could not be loaded or deployed.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Grid occupancy diverged from unit positions.
    #[error("Validation failed at tick {tick}: {source}")]
    Validation {
        /// Tick after which the check failed.
        tick: u64,
        /// Underlying mismatch.
        source: CombatError,
    },
    /// Failed to write the report.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to encode the report.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Check grid occupancy after every tick and stop on the first mismatch.
    pub validate: bool,
    /// Keep the full event log in the report.
    pub record_events: bool,
}

/// Events emitted during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number (1-based: the first step is tick 1).
    pub tick: u64,
    /// Events in processing order.
    pub events: Vec<CombatEvent>,
}

/// Final state of a unit still standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivorReport {
    /// Unit id.
    pub id: UnitId,
    /// Definition id.
    pub definition: String,
    /// Roster.
    pub side: Side,
    /// Remaining health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Final cell.
    pub cell: (u32, u32),
    /// Final state.
    pub state: UnitState,
}

impl From<&Unit> for SurvivorReport {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            definition: unit.definition().id.clone(),
            side: unit.side,
            health: unit.health,
            max_health: unit.max_health,
            cell: unit.cell(),
            state: unit.state,
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Scenario name.
    pub scenario: String,
    /// Outcome and totals.
    pub summary: BattleSummary,
    /// Final battle state hash (for determinism validation).
    pub final_state_hash: u64,
    /// Units alive at the end.
    pub survivors: Vec<SurvivorReport>,
    /// Per-tick events, when recording was requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<TickEvents>,
}

impl BattleReport {
    /// Save the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Runs scenarios headlessly.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRunner {
    config: RunnerConfig,
}

impl HeadlessRunner {
    /// Create a runner with the given configuration.
    #[must_use]
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Deploy the scenario and run it until decided or out of ticks.
    pub fn run(&self, scenario: &Scenario) -> Result<BattleReport, RunnerError> {
        let mut battle = scenario.build_battle()?;
        self.run_battle(scenario, &mut battle)
    }

    fn run_battle(&self, scenario: &Scenario, battle: &mut Battle) -> Result<BattleReport, RunnerError> {
        info!(
            scenario = %scenario.name,
            allies = battle.allies().len(),
            enemies = battle.enemies().len(),
            max_ticks = scenario.max_ticks,
            "Starting battle"
        );

        let mut log = Vec::new();
        while !battle.outcome().is_over() && battle.get_tick() < scenario.max_ticks {
            let events = battle.step(scenario.dt);

            if self.config.validate {
                if let Err(source) = battle.check_occupancy() {
                    let tick = battle.get_tick();
                    error!(tick, error = %source, "occupancy check failed");
                    return Err(RunnerError::Validation { tick, source });
                }
            }

            if !events.is_empty() {
                debug!(tick = battle.get_tick(), count = events.len(), "tick events");
                if self.config.record_events {
                    log.push(TickEvents {
                        tick: battle.get_tick(),
                        events,
                    });
                }
            }
        }

        let summary = battle.summary();
        info!(
            outcome = ?summary.outcome,
            ticks = summary.ticks,
            attacks = summary.attacks,
            deaths = summary.deaths,
            "Battle finished"
        );

        Ok(BattleReport {
            scenario: scenario.name.clone(),
            summary,
            final_state_hash: battle.state_hash(),
            survivors: battle
                .allies()
                .iter()
                .chain(battle.enemies())
                .map(SurvivorReport::from)
                .collect(),
            events: log,
        })
    }

    /// Run the scenario `runs` times and check every run ends in the same state.
    ///
    /// Returns the final hash of each run.
    pub fn verify(&self, scenario: &Scenario, runs: u32) -> Result<Vec<u64>, RunnerError> {
        let mut hashes = Vec::with_capacity(runs as usize);
        for run in 0..runs {
            let report = self.run(scenario)?;
            debug!(run, hash = report.final_state_hash, "verification run finished");
            hashes.push(report.final_state_hash);
        }
        Ok(hashes)
    }
}
