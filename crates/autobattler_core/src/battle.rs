//! Battle driver.
//!
//! [`Battle`] bundles the grid, both rosters and the resolver, and performs
//! the bookkeeping the game mode does around each tick: deploying units,
//! evicting the dead, and checking for a winner.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use autobattler_core::battle::Battle;
//! use autobattler_core::config::CombatConfig;
//! use autobattler_core::element::Element;
//! use autobattler_core::math::Fixed;
//! use autobattler_core::unit::{BaseStats, Role, Side, StarLevel, Unit, UnitDefinition, UnitId};
//!
//! let knight = Arc::new(UnitDefinition {
//!     id: "knight".into(),
//!     name: "Knight".into(),
//!     archetype: "knight".into(),
//!     element: Element::Physical,
//!     role: Role::Warrior,
//!     stats: BaseStats {
//!         health: 100,
//!         attack: 20,
//!         defense: 5,
//!         move_speed: Fixed::ONE,
//!         attack_range: 1,
//!         attacks_per_second: Fixed::ONE,
//!     },
//! });
//!
//! let mut battle = Battle::new(CombatConfig::default()).unwrap();
//! battle
//!     .deploy(Unit::new(UnitId(1), Side::Ally, knight.clone(), StarLevel::One, (0, 0)))
//!     .unwrap();
//! battle
//!     .deploy(Unit::new(UnitId(2), Side::Enemy, knight, StarLevel::One, (0, 7)))
//!     .unwrap();
//!
//! let summary = battle.run_until_over(Fixed::ONE, 500);
//! assert!(summary.outcome.is_over());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CombatConfig;
use crate::error::{CombatError, Result};
use crate::events::CombatEvent;
use crate::grid::BattleGrid;
use crate::math::Fixed;
use crate::resolver::{is_combat_over, CombatOutcome, CombatResolver};
use crate::unit::{Side, Unit, UnitId};

/// How a finished (or abandoned) battle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// Final outcome. `Ongoing` means the tick limit was reached.
    pub outcome: CombatOutcome,
    /// Ticks simulated.
    pub ticks: u64,
    /// Allies still standing.
    pub allies_remaining: usize,
    /// Enemies still standing.
    pub enemies_remaining: usize,
    /// Attacks resolved across the whole battle.
    pub attacks: u64,
    /// Total damage dealt by allies.
    pub ally_damage: u64,
    /// Total damage dealt by enemies.
    pub enemy_damage: u64,
    /// Units that died.
    pub deaths: u64,
}

/// Running totals gathered from events.
#[derive(Debug, Clone, Default)]
struct BattleStats {
    attacks: u64,
    ally_damage: u64,
    enemy_damage: u64,
    deaths: u64,
}

/// A single combat phase: grid, rosters and the resolver.
#[derive(Debug, Clone)]
pub struct Battle {
    tick: u64,
    resolver: CombatResolver,
    grid: BattleGrid,
    allies: Vec<Unit>,
    enemies: Vec<Unit>,
    stats: BattleStats,
}

impl Battle {
    /// Create an empty battle.
    pub fn new(config: CombatConfig) -> Result<Self> {
        let grid = BattleGrid::from_config(&config)?;
        Ok(Self {
            tick: 0,
            resolver: CombatResolver::new(config),
            grid,
            allies: Vec::new(),
            enemies: Vec::new(),
            stats: BattleStats::default(),
        })
    }

    /// Current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Constants in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        self.resolver.config()
    }

    /// The battlefield.
    #[must_use]
    pub fn grid(&self) -> &BattleGrid {
        &self.grid
    }

    /// Ally roster in processing order.
    #[must_use]
    pub fn allies(&self) -> &[Unit] {
        &self.allies
    }

    /// Enemy roster in processing order.
    #[must_use]
    pub fn enemies(&self) -> &[Unit] {
        &self.enemies
    }

    /// Look up a unit on either side.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.allies
            .iter()
            .chain(self.enemies.iter())
            .find(|u| u.id == id)
    }

    /// Place a unit on the grid and append it to its side's roster.
    ///
    /// # Errors
    ///
    /// Fails if the id is already in use, or the unit's cell is off the grid
    /// or occupied. Nothing changes on failure.
    pub fn deploy(&mut self, unit: Unit) -> Result<UnitId> {
        if self.unit(unit.id).is_some() {
            return Err(CombatError::DuplicateUnit(unit.id));
        }
        let (col, row) = unit.cell();
        self.grid.check_placement(col, row)?;
        self.grid.place(col, row, unit.id);

        debug!(unit = %unit.id, side = ?unit.side, col, row, "unit deployed");
        let id = unit.id;
        match unit.side {
            Side::Ally => self.allies.push(unit),
            Side::Enemy => self.enemies.push(unit),
        }
        Ok(id)
    }

    /// Resolve one tick, then evict dead units from both rosters.
    pub fn step(&mut self, dt: Fixed) -> Vec<CombatEvent> {
        let events =
            self.resolver
                .resolve_tick(&mut self.allies, &mut self.enemies, &mut self.grid, dt);

        self.record(&events);
        self.evict_dead();
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Battle state hash");
        }

        #[cfg(feature = "debug-validation")]
        {
            if let Err(e) = self.check_occupancy() {
                tracing::error!(tick = self.tick, error = %e, "occupancy invariant violated");
            }
        }

        events
    }

    fn record(&mut self, events: &[CombatEvent]) {
        for event in events {
            match *event {
                CombatEvent::Attack { source, damage, .. } => {
                    self.stats.attacks += 1;
                    if self.allies.iter().any(|u| u.id == source) {
                        self.stats.ally_damage += u64::from(damage);
                    } else {
                        self.stats.enemy_damage += u64::from(damage);
                    }
                }
                CombatEvent::Death { .. } => self.stats.deaths += 1,
                CombatEvent::AbilityTriggered { .. } | CombatEvent::Move { .. } => {}
            }
        }
    }

    /// Drop dead units from the rosters and make sure their cells are free.
    fn evict_dead(&mut self) {
        let grid = &mut self.grid;
        for roster in [&mut self.allies, &mut self.enemies] {
            roster.retain(|unit| {
                if unit.is_alive() {
                    return true;
                }
                if grid.occupant(unit.col, unit.row) == Some(unit.id) {
                    grid.remove(unit.col, unit.row);
                }
                false
            });
        }
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> CombatOutcome {
        is_combat_over(&self.allies, &self.enemies)
    }

    /// Step until the battle is decided or `max_ticks` ticks have run.
    pub fn run_until_over(&mut self, dt: Fixed, max_ticks: u64) -> BattleSummary {
        let start = self.tick;
        while !self.outcome().is_over() && self.tick - start < max_ticks {
            self.step(dt);
        }

        let summary = self.summary();
        info!(
            outcome = ?summary.outcome,
            ticks = summary.ticks,
            allies = summary.allies_remaining,
            enemies = summary.enemies_remaining,
            "battle finished"
        );
        summary
    }

    /// Snapshot of the battle's totals so far.
    #[must_use]
    pub fn summary(&self) -> BattleSummary {
        BattleSummary {
            outcome: self.outcome(),
            ticks: self.tick,
            allies_remaining: self.allies.iter().filter(|u| u.is_alive()).count(),
            enemies_remaining: self.enemies.iter().filter(|u| u.is_alive()).count(),
            attacks: self.stats.attacks,
            ally_damage: self.stats.ally_damage,
            enemy_damage: self.stats.enemy_damage,
            deaths: self.stats.deaths,
        }
    }

    /// Verify that grid occupancy and unit coordinates agree.
    ///
    /// Every living unit must sit in exactly the cell it records, and every
    /// occupied cell must belong to a living unit.
    pub fn check_occupancy(&self) -> Result<()> {
        let mut living = 0usize;
        for unit in self.allies.iter().chain(self.enemies.iter()) {
            if !unit.is_alive() {
                continue;
            }
            living += 1;
            match self.grid.find(unit.id) {
                Some(cell) if cell == unit.cell() => {}
                Some(cell) => {
                    return Err(CombatError::OccupancyMismatch {
                        unit: unit.id,
                        detail: format!("recorded at {:?}, grid has {:?}", unit.cell(), cell),
                    })
                }
                None => {
                    return Err(CombatError::OccupancyMismatch {
                        unit: unit.id,
                        detail: "not on the grid".into(),
                    })
                }
            }
        }

        let occupied = self.grid.occupied_count();
        if occupied != living {
            let stray = self
                .grid
                .cells()
                .filter_map(|c| c.occupant)
                .find(|id| self.unit(*id).map_or(true, |u| !u.is_alive()));
            return Err(CombatError::OccupancyMismatch {
                unit: stray.unwrap_or(UnitId(0)),
                detail: format!("{occupied} occupied cells for {living} living units"),
            });
        }
        Ok(())
    }

    /// Hash of the full battle state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);

        for roster in [&self.allies, &self.enemies] {
            roster.len().hash(&mut hasher);
            for unit in roster {
                unit.id.hash(&mut hasher);
                unit.health.hash(&mut hasher);
                unit.max_health.hash(&mut hasher);
                unit.cell().hash(&mut hasher);
                unit.state.hash(&mut hasher);
                unit.target().hash(&mut hasher);
                unit.mana.hash(&mut hasher);
                unit.attack_cooldown.to_bits().hash(&mut hasher);
                unit.move_progress().to_bits().hash(&mut hasher);
            }
        }

        for cell in self.grid.cells() {
            cell.occupant.hash(&mut hasher);
        }

        hasher.finish()
    }
}
