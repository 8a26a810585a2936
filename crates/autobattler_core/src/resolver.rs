//! Per-tick combat resolution.
//!
//! [`CombatResolver::resolve_tick`] is the single entry point. It owns no
//! battle state: everything lives in the units and the grid, which are
//! mutated in place.
//!
//! # Processing order
//!
//! Allies act first, in roster order, then enemies, in roster order. Each
//! unit sees the grid as left by the units before it, so a unit processed
//! later in the tick observes earlier moves and deaths. Reordering a roster
//! changes the outcome; keep it stable for reproducible battles.
//!
//! # Per-unit steps
//!
//! 1. Timers: cooldown and transit advance by `dt`.
//! 2. Target validation: a dead or missing target is dropped and the nearest
//!    living foe (Manhattan distance, first found on ties) is acquired.
//! 3. In range (Chebyshev): stop, face, attack if the cooldown is ready.
//! 4. Out of range and not mid-transit: path toward the target and step one
//!    cell if the next cell is free.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CombatConfig;
use crate::element::calculate_damage;
use crate::events::CombatEvent;
use crate::grid::{BattleGrid, CellCoord};
use crate::math::Fixed;
use crate::pathfinding::find_path;
use crate::unit::{Unit, UnitState};

/// Result of a combat-over check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// Only allies remain.
    AllyWin,
    /// Only enemies remain, or nobody does.
    EnemyWin,
    /// Both sides still have living units.
    Ongoing,
}

impl CombatOutcome {
    /// Whether the battle has been decided.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// Decide whether a battle is over.
///
/// Only living units count, so rosters need not be compacted first. A mutual
/// wipe is scored as [`CombatOutcome::EnemyWin`].
#[must_use]
pub fn is_combat_over(allies: &[Unit], enemies: &[Unit]) -> CombatOutcome {
    let allies_alive = allies.iter().any(Unit::is_alive);
    let enemies_alive = enemies.iter().any(Unit::is_alive);

    match (allies_alive, enemies_alive) {
        (true, false) => CombatOutcome::AllyWin,
        (false, _) => CombatOutcome::EnemyWin,
        (true, true) => CombatOutcome::Ongoing,
    }
}

/// Stateless tick resolver parameterised by combat constants.
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    config: CombatConfig,
}

impl CombatResolver {
    /// Create a resolver using the given constants.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// Constants in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Advance every living unit by one tick of `dt` seconds.
    ///
    /// Mutates units and grid occupancy in place and returns the tick's
    /// events in processing order. Units killed this tick are left in their
    /// rosters with state [`UnitState::Dead`]; evicting them is the caller's
    /// job.
    pub fn resolve_tick(
        &self,
        allies: &mut [Unit],
        enemies: &mut [Unit],
        grid: &mut BattleGrid,
        dt: Fixed,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();

        for actor in allies.iter_mut() {
            self.act(actor, enemies, grid, dt, &mut events);
        }
        for actor in enemies.iter_mut() {
            self.act(actor, allies, grid, dt, &mut events);
        }

        events
    }

    fn act(
        &self,
        actor: &mut Unit,
        foes: &mut [Unit],
        grid: &mut BattleGrid,
        dt: Fixed,
        events: &mut Vec<CombatEvent>,
    ) {
        if !actor.is_alive() {
            return;
        }

        actor.tick_timers(dt);

        let Some(target_idx) = acquire_target(actor, foes) else {
            return;
        };
        let target = &mut foes[target_idx];

        if actor.is_in_range(target) {
            actor.stop_moving();
            face_toward(actor, target.cell(), grid);
            if actor.can_attack() {
                self.resolve_attack(actor, target, grid, events);
            }
        } else if !actor.is_mid_move() {
            let goal = target.cell();
            self.step_toward(actor, goal, grid, events);
        }
    }

    fn resolve_attack(
        &self,
        actor: &mut Unit,
        target: &mut Unit,
        grid: &mut BattleGrid,
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(interval) = actor.attack_interval() else {
            return;
        };
        actor.attack_cooldown = interval;
        actor.state = UnitState::Attacking;

        let damage = calculate_damage(
            actor.attack,
            actor.element(),
            target.defense,
            target.element(),
            &self.config,
        );
        let died = target.take_damage(damage);

        trace!(
            attacker = %actor.id,
            target = %target.id,
            damage,
            remaining = target.health,
            "attack resolved"
        );
        events.push(CombatEvent::Attack {
            source: actor.id,
            target: target.id,
            damage,
            element: actor.element(),
        });

        if actor.gain_mana(self.config.mana_per_attack, self.config.mana_cap) {
            actor.state = UnitState::Ability;
            events.push(CombatEvent::AbilityTriggered {
                source: actor.id,
                target: target.id,
                element: actor.element(),
            });
        }

        if died {
            debug!(killer = %actor.id, victim = %target.id, "unit died");
            events.push(CombatEvent::Death { unit: target.id });
            if grid.occupant(target.col, target.row) == Some(target.id) {
                grid.remove(target.col, target.row);
            }
            actor.target = None;
        }
    }

    fn step_toward(
        &self,
        actor: &mut Unit,
        goal: CellCoord,
        grid: &mut BattleGrid,
        events: &mut Vec<CombatEvent>,
    ) {
        if actor.move_speed <= Fixed::ZERO {
            return;
        }

        let from = actor.cell();
        let path = find_path(grid, from, goal, self.config.path_expansion_limit());
        let Some(&next) = path.first() else {
            debug!(unit = %actor.id, ?from, ?goal, "no path to target");
            return;
        };

        if next == goal || grid.is_occupied(next.0, next.1) {
            debug!(unit = %actor.id, ?next, "step blocked, holding position");
            return;
        }

        grid.remove(from.0, from.1);
        if !grid.place(next.0, next.1, actor.id) {
            grid.place(from.0, from.1, actor.id);
            return;
        }

        face_toward(actor, next, grid);
        actor.col = next.0;
        actor.row = next.1;
        actor.assign_move_target(grid.grid_to_world(next.0, next.1));
        events.push(CombatEvent::Move {
            unit: actor.id,
            from,
            to: next,
        });
    }
}

/// Validate the actor's target, re-acquiring the nearest living foe if it is
/// gone. Returns the target's index in `foes`.
fn acquire_target(actor: &mut Unit, foes: &[Unit]) -> Option<usize> {
    if let Some(id) = actor.target {
        if let Some(idx) = foes.iter().position(|f| f.id == id && f.is_alive()) {
            return Some(idx);
        }
        actor.target = None;
    }

    let mut best: Option<(usize, u32)> = None;
    for (idx, foe) in foes.iter().enumerate() {
        if !foe.is_alive() {
            continue;
        }
        let distance = actor.grid_distance(foe);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((idx, distance));
        }
    }

    let (idx, distance) = best?;
    actor.target = Some(foes[idx].id);
    debug!(unit = %actor.id, target = %foes[idx].id, distance, "target acquired");
    Some(idx)
}

fn face_toward(actor: &mut Unit, cell: CellCoord, grid: &BattleGrid) {
    let here = grid.grid_to_world(actor.col, actor.row);
    let there = grid.grid_to_world(cell.0, cell.1);
    actor.face(there - here);
}
