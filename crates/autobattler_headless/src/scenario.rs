//! Scenario loading and configuration.
//!
//! A scenario is a RON file describing one battle: the combat constants,
//! the unit definitions in play, where each unit is deployed, and how long
//! to run.
//!
//! ```ron
//! Scenario(
//!     name: "Duel",
//!     dt: 0.5,
//!     max_ticks: 400,
//!     units: [
//!         UnitDefinition(
//!             id: "knight",
//!             name: "Knight",
//!             stats: BaseStats(
//!                 health: 100,
//!                 attack: 20,
//!                 defense: 5,
//!                 move_speed: 1.0,
//!                 attack_range: 1,
//!                 attacks_per_second: 1.0,
//!             ),
//!         ),
//!     ],
//!     placements: [
//!         (unit: "knight", side: Ally, col: 0, row: 0),
//!         (unit: "knight", side: Enemy, star: 2, col: 0, row: 7),
//!     ],
//! )
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use autobattler_core::battle::Battle;
use autobattler_core::config::CombatConfig;
use autobattler_core::error::CombatError;
use autobattler_core::math::{decimal_serde, Fixed};
use autobattler_core::unit::{Side, StarLevel, Unit, UnitDefinition, UnitId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ticks simulated when a scenario sets no limit (five minutes at 20 Hz).
pub const DEFAULT_MAX_TICKS: u64 = 6_000;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Two definitions share an id.
    #[error("Unit definition '{0}' is defined more than once")]
    DuplicateDefinition(String),
    /// Tick length must be positive.
    #[error("Tick length must be positive, got {0}")]
    InvalidTick(Fixed),
    /// The battle rejected the scenario's config or a placement.
    #[error("Invalid battle setup: {0}")]
    Combat(#[from] CombatError),
}

fn default_dt() -> Fixed {
    Fixed::ONE / Fixed::from_num(20)
}

const fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Combat constants. Defaults apply when omitted.
    #[serde(default)]
    pub config: Option<CombatConfig>,
    /// Seconds per tick.
    #[serde(default = "default_dt", with = "decimal_serde")]
    pub dt: Fixed,
    /// Give up after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Unit types referenced by the placements.
    pub units: Vec<UnitDefinition>,
    /// Units to deploy, in roster order.
    pub placements: Vec<Placement>,
}

/// Placement of a unit at battle start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Definition id.
    pub unit: String,
    /// Roster to join.
    pub side: Side,
    /// Star tier.
    #[serde(default)]
    pub star: StarLevel,
    /// Grid column.
    pub col: u32,
    /// Grid row.
    pub row: u32,
}

impl Placement {
    /// Create a new one-star placement.
    #[must_use]
    pub fn new(unit: impl Into<String>, side: Side, col: u32, row: u32) -> Self {
        Self {
            unit: unit.into(),
            side,
            star: StarLevel::One,
            col,
            row,
        }
    }

    /// Set the star tier.
    #[must_use]
    pub fn with_star(mut self, star: StarLevel) -> Self {
        self.star = star;
        self
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Combat constants in effect.
    #[must_use]
    pub fn combat_config(&self) -> CombatConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Deploy every placement into a fresh battle.
    ///
    /// Units are numbered from 1 in placement order, so the same scenario
    /// always produces the same ids and roster order.
    pub fn build_battle(&self) -> Result<Battle, ScenarioError> {
        if self.dt <= Fixed::ZERO {
            return Err(ScenarioError::InvalidTick(self.dt));
        }

        let mut definitions: HashMap<&str, Arc<UnitDefinition>> = HashMap::new();
        for def in &self.units {
            if definitions
                .insert(def.id.as_str(), Arc::new(def.clone()))
                .is_some()
            {
                return Err(ScenarioError::DuplicateDefinition(def.id.clone()));
            }
        }

        let mut battle = Battle::new(self.combat_config())?;
        for (id, placement) in (1u32..).zip(&self.placements) {
            let definition = definitions
                .get(placement.unit.as_str())
                .ok_or_else(|| CombatError::UnknownDefinition(placement.unit.clone()))?;
            let unit = Unit::new(
                UnitId(id),
                placement.side,
                Arc::clone(definition),
                placement.star,
                (placement.col, placement.row),
            );
            battle.deploy(unit)?;
        }

        tracing::debug!(
            scenario = %self.name,
            allies = battle.allies().len(),
            enemies = battle.enemies().len(),
            "scenario deployed"
        );
        Ok(battle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUEL: &str = r#"
        Scenario(
            name: "Duel",
            dt: 0.5,
            max_ticks: 400,
            units: [
                UnitDefinition(
                    id: "knight",
                    name: "Knight",
                    element: Fire,
                    stats: BaseStats(
                        health: 100,
                        attack: 20,
                        defense: 5,
                        move_speed: 1.0,
                        attack_range: 1,
                        attacks_per_second: 1.0,
                    ),
                ),
            ],
            placements: [
                (unit: "knight", side: Ally, col: 0, row: 0),
                (unit: "knight", side: Enemy, star: 2, col: 0, row: 7),
            ],
        )
    "#;

    #[test]
    fn test_parse_from_ron() {
        let scenario = Scenario::from_ron_str(DUEL).unwrap();
        assert_eq!(scenario.name, "Duel");
        assert_eq!(scenario.dt, Fixed::from_num(0.5));
        assert_eq!(scenario.placements.len(), 2);
        assert_eq!(scenario.placements[0].star, StarLevel::One);
        assert_eq!(scenario.placements[1].star, StarLevel::Two);
        assert!(scenario.config.is_none());
    }

    #[test]
    fn test_defaults_when_omitted() {
        let scenario = Scenario::from_ron_str(r#"Scenario(name: "Empty", units: [], placements: [])"#)
            .unwrap();
        assert_eq!(scenario.dt, default_dt());
        assert_eq!(scenario.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(scenario.combat_config(), CombatConfig::default());
    }

    #[test]
    fn test_build_battle_numbers_units_in_order() {
        let battle = Scenario::from_ron_str(DUEL).unwrap().build_battle().unwrap();
        assert_eq!(battle.allies()[0].id, UnitId(1));
        assert_eq!(battle.enemies()[0].id, UnitId(2));
        // Two stars: 100 * 1.8
        assert_eq!(battle.enemies()[0].max_health, 180);
    }

    #[test]
    fn test_unknown_definition() {
        let mut scenario = Scenario::from_ron_str(DUEL).unwrap();
        scenario.placements.push(Placement::new("dragon", Side::Enemy, 3, 7));
        assert!(matches!(
            scenario.build_battle(),
            Err(ScenarioError::Combat(CombatError::UnknownDefinition(id))) if id == "dragon"
        ));
    }

    #[test]
    fn test_duplicate_definition() {
        let mut scenario = Scenario::from_ron_str(DUEL).unwrap();
        let copy = scenario.units[0].clone();
        scenario.units.push(copy);
        assert!(matches!(
            scenario.build_battle(),
            Err(ScenarioError::DuplicateDefinition(_))
        ));
    }

    #[test]
    fn test_overlapping_placements_rejected() {
        let mut scenario = Scenario::from_ron_str(DUEL).unwrap();
        scenario
            .placements
            .push(Placement::new("knight", Side::Enemy, 0, 0).with_star(StarLevel::Three));
        assert!(matches!(
            scenario.build_battle(),
            Err(ScenarioError::Combat(CombatError::CellOccupied { .. }))
        ));
    }

    #[test]
    fn test_zero_dt_rejected() {
        let mut scenario = Scenario::from_ron_str(DUEL).unwrap();
        scenario.dt = Fixed::ZERO;
        assert!(matches!(
            scenario.build_battle(),
            Err(ScenarioError::InvalidTick(_))
        ));
    }

    #[test]
    fn test_shipped_skirmish_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/skirmish.ron");
        let scenario = Scenario::load(path).unwrap();
        let battle = scenario.build_battle().unwrap();
        assert_eq!(battle.allies().len(), 4);
        assert_eq!(battle.enemies().len(), 4);
        assert_eq!(scenario.dt, Fixed::from_num(0.5));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.ron");
        std::fs::write(&path, DUEL).unwrap();
        assert_eq!(Scenario::load(&path).unwrap().name, "Duel");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load("/definitely/not/here.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }
}
