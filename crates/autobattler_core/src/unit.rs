//! Combat units: static definitions plus per-battle runtime state.
//!
//! A [`Unit`] holds its stats and a small state machine. It answers range
//! and distance queries and applies damage, but it never decides what to do;
//! the [`resolver`](crate::resolver) drives every transition.
//!
//! # State machine
//!
//! ```text
//! Idle --(target out of range)--> Moving --(arrival)--> Idle
//! Idle/Moving --(in range, cooldown ready)--> Attacking --(next tick)--> Idle
//! Attacking --(mana cap)--> Ability --(next tick)--> Idle
//! any --(health reaches 0)--> Dead   (terminal)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{CombatError, Result};
use crate::grid::CellCoord;
use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Unique identifier for a unit. Never reused within a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which roster a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's side.
    Ally,
    /// The opposing side.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

/// Battlefield role. Informational for the game layer; combat rules do not
/// branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Front-line, high health.
    Tank,
    /// Melee damage.
    #[default]
    Warrior,
    /// Ranged physical damage.
    Ranger,
    /// Ranged elemental damage.
    Mage,
    /// Fast, fragile melee.
    Assassin,
    /// Backline utility.
    Support,
}

/// Per-unit behaviour state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitState {
    /// Waiting for something to do.
    #[default]
    Idle,
    /// Travelling to an adjacent cell.
    Moving,
    /// Resolved an attack this tick.
    Attacking,
    /// Mana cap reached this tick.
    Ability,
    /// Out of the fight. Terminal.
    Dead,
}

/// Star tier. Scales health, attack and defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum StarLevel {
    /// Base tier (1.0x).
    #[default]
    One,
    /// Merged once (1.8x).
    Two,
    /// Merged twice (3.2x).
    Three,
}

impl StarLevel {
    /// Stat multiplier in tenths.
    #[must_use]
    pub const fn multiplier_tenths(self) -> u32 {
        match self {
            Self::One => 10,
            Self::Two => 18,
            Self::Three => 32,
        }
    }

    /// Scale a base stat by this tier, rounding halves up.
    #[must_use]
    pub const fn scale(self, base: u32) -> u32 {
        let scaled = (base as u64 * self.multiplier_tenths() as u64 + 5) / 10;
        if scaled > u32::MAX as u64 {
            u32::MAX
        } else {
            scaled as u32
        }
    }
}

impl TryFrom<u8> for StarLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("star level must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<StarLevel> for u8 {
    fn from(star: StarLevel) -> Self {
        match star {
            StarLevel::One => 1,
            StarLevel::Two => 2,
            StarLevel::Three => 3,
        }
    }
}

/// Unscaled combat stats of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum health at one star.
    pub health: u32,
    /// Attack at one star.
    pub attack: u32,
    /// Defense at one star.
    #[serde(default)]
    pub defense: u32,
    /// Cells per second. Only paces the transit between cells.
    #[serde(with = "decimal_serde")]
    pub move_speed: Fixed,
    /// Attack range in cells (Chebyshev).
    pub attack_range: u32,
    /// Attacks per second.
    #[serde(with = "decimal_serde")]
    pub attacks_per_second: Fixed,
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitDefinition(
///     id: "ember_knight",
///     name: "Ember Knight",
///     archetype: "knight",
///     element: Fire,
///     role: Warrior,
///     stats: BaseStats(
///         health: 120,
///         attack: 18,
///         defense: 6,
///         move_speed: 1.0,
///         attack_range: 1,
///         attacks_per_second: 0.8,
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Unique string identifier for this unit type.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Visual archetype key for the rendering layer.
    #[serde(default)]
    pub archetype: String,
    /// Elemental affinity.
    #[serde(default)]
    pub element: Element,
    /// Battlefield role.
    #[serde(default)]
    pub role: Role,
    /// Unscaled stats.
    pub stats: BaseStats,
}

impl UnitDefinition {
    /// Parse a definition from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| CombatError::Parse {
            what: "unit definition",
            message: e.to_string(),
        })
    }
}

/// A unit taking part in a battle.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Roster this unit belongs to.
    pub side: Side,
    definition: Arc<UnitDefinition>,
    star: StarLevel,
    /// Current health. Zero only when dead.
    pub health: u32,
    /// Maximum health after star scaling.
    pub max_health: u32,
    /// Attack after star scaling.
    pub attack: u32,
    /// Defense after star scaling.
    pub defense: u32,
    /// Cells per second.
    pub move_speed: Fixed,
    /// Attack range in cells.
    pub attack_range: u32,
    /// Attacks per second.
    pub attacks_per_second: Fixed,
    /// Grid column.
    pub col: u32,
    /// Grid row.
    pub row: u32,
    /// Current state.
    pub state: UnitState,
    pub(crate) target: Option<UnitId>,
    /// Seconds until the next attack is allowed.
    pub attack_cooldown: Fixed,
    /// Resource counter, `0..=cap`.
    pub mana: u32,
    move_target: Option<Vec2Fixed>,
    move_progress: Fixed,
    /// Unit-length direction toward the last faced target.
    pub facing: Vec2Fixed,
}

impl Unit {
    /// Create a unit at full health standing at `(col, row)`.
    ///
    /// Grid placement is the caller's job (see [`crate::battle::Battle::deploy`]).
    #[must_use]
    pub fn new(
        id: UnitId,
        side: Side,
        definition: Arc<UnitDefinition>,
        star: StarLevel,
        (col, row): CellCoord,
    ) -> Self {
        let stats = &definition.stats;
        let max_health = star.scale(stats.health);
        Self {
            id,
            side,
            health: max_health,
            max_health,
            attack: star.scale(stats.attack),
            defense: star.scale(stats.defense),
            move_speed: stats.move_speed,
            attack_range: stats.attack_range,
            attacks_per_second: stats.attacks_per_second,
            definition,
            star,
            col,
            row,
            state: UnitState::Idle,
            target: None,
            attack_cooldown: Fixed::ZERO,
            mana: 0,
            move_target: None,
            move_progress: Fixed::ZERO,
            facing: Vec2Fixed::ZERO,
        }
    }

    /// Static definition this unit was built from.
    #[must_use]
    pub fn definition(&self) -> &UnitDefinition {
        &self.definition
    }

    /// Elemental affinity.
    #[must_use]
    pub fn element(&self) -> Element {
        self.definition.element
    }

    /// Star tier.
    #[must_use]
    pub const fn star(&self) -> StarLevel {
        self.star
    }

    /// Current grid coordinates.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        (self.col, self.row)
    }

    /// Current target id. May refer to a unit that has since died; the
    /// resolver revalidates it against the opposing roster every tick.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Whether the unit is still fighting.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    /// Remaining health as a fraction of maximum.
    #[must_use]
    pub fn health_fraction(&self) -> Fixed {
        if self.max_health == 0 {
            return Fixed::ZERO;
        }
        Fixed::from_num(self.health) / Fixed::from_num(self.max_health)
    }

    /// Chebyshev distance to another unit.
    #[must_use]
    pub fn chebyshev_distance(&self, other: &Unit) -> u32 {
        self.col.abs_diff(other.col).max(self.row.abs_diff(other.row))
    }

    /// Manhattan distance to another unit. Used for target selection.
    #[must_use]
    pub fn grid_distance(&self, other: &Unit) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// True iff `other` is within attack range. Diagonals count as one step.
    #[must_use]
    pub fn is_in_range(&self, other: &Unit) -> bool {
        self.chebyshev_distance(other) <= self.attack_range
    }

    /// Apply damage. Returns `true` iff this call killed the unit.
    ///
    /// Dead units ignore further damage.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.state = UnitState::Dead;
            self.target = None;
            self.move_target = None;
            true
        } else {
            false
        }
    }

    /// Start travelling toward a world position.
    pub fn assign_move_target(&mut self, pos: Vec2Fixed) {
        if !self.is_alive() {
            return;
        }
        self.move_target = Some(pos);
        self.move_progress = Fixed::ZERO;
        self.state = UnitState::Moving;
    }

    /// Destination of the current transit, if any.
    #[must_use]
    pub const fn move_target(&self) -> Option<Vec2Fixed> {
        self.move_target
    }

    /// Fraction of the current transit completed, `0..=1`.
    #[must_use]
    pub const fn move_progress(&self) -> Fixed {
        self.move_progress
    }

    /// Whether a transit between cells is still underway.
    #[must_use]
    pub fn is_mid_move(&self) -> bool {
        self.state == UnitState::Moving && self.move_target.is_some()
    }

    /// Abort any transit. The unit already owns its destination cell.
    pub fn stop_moving(&mut self) {
        self.move_target = None;
        self.move_progress = Fixed::ZERO;
        if self.state == UnitState::Moving {
            self.state = UnitState::Idle;
        }
    }

    /// Advance cooldown and transit timers by `dt` seconds.
    ///
    /// Transient states (`Attacking`, `Ability`) settle back to `Idle`.
    /// Returns `true` if the unit arrived at its move target this call.
    pub fn tick_timers(&mut self, dt: Fixed) -> bool {
        if !self.is_alive() {
            return false;
        }

        self.attack_cooldown = (self.attack_cooldown - dt).max(Fixed::ZERO);

        match self.state {
            UnitState::Attacking | UnitState::Ability => {
                self.state = UnitState::Idle;
                false
            }
            UnitState::Moving if self.move_target.is_some() => {
                self.move_progress = self
                    .move_progress
                    .saturating_add(dt.saturating_mul(self.move_speed));
                if self.move_progress >= Fixed::ONE {
                    self.stop_moving();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Turn toward a direction vector. A zero vector leaves facing unchanged.
    pub fn face(&mut self, direction: Vec2Fixed) {
        let unit = direction.normalize();
        if unit != Vec2Fixed::ZERO {
            self.facing = unit;
        }
    }

    /// Seconds between attacks, or `None` if this unit cannot attack.
    #[must_use]
    pub fn attack_interval(&self) -> Option<Fixed> {
        if self.attacks_per_second <= Fixed::ZERO {
            return None;
        }
        // Rates too small for the interval to fit never attack
        Fixed::ONE.checked_div(self.attacks_per_second)
    }

    /// Whether the unit may resolve an attack right now.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.is_alive()
            && self.attack > 0
            && self.attack_cooldown == Fixed::ZERO
            && self.attack_interval().is_some()
    }

    /// Add mana, capped at `cap`. Returns `true` if the cap was reached, in
    /// which case the counter resets to zero.
    pub fn gain_mana(&mut self, amount: u32, cap: u32) -> bool {
        self.mana = self.mana.saturating_add(amount).min(cap);
        if self.mana >= cap {
            self.mana = 0;
            true
        } else {
            false
        }
    }

    /// Raise the star tier after a merge. Stats rescale and health refills.
    ///
    /// Returns `false` (and changes nothing) unless `star` is higher than
    /// the current tier or the unit is dead.
    pub fn promote(&mut self, star: StarLevel) -> bool {
        if star <= self.star || !self.is_alive() {
            return false;
        }
        let stats = &self.definition.stats;
        self.star = star;
        self.max_health = star.scale(stats.health);
        self.attack = star.scale(stats.attack);
        self.defense = star.scale(stats.defense);
        self.health = self.max_health;
        true
    }
}
