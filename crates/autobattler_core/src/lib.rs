//! # Auto-Battler Core
//!
//! Deterministic combat simulation for the auto-battler game mode.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No randomness
//! - No floating-point math in the tick (fixed-point and integer hundredths)
//!
//! Units occupy cells on a fixed grid, pick the nearest enemy, path around
//! other units with A*, and trade attacks modified by elemental affinities.
//! The game layer calls [`resolver::CombatResolver::resolve_tick`] (or
//! [`battle::Battle::step`]) once per frame and drains the returned events.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Occupancy grid and cell/world conversion
//! - [`unit`] - Unit definitions, stats and state machine
//! - [`element`] - Element advantage table and damage formula
//! - [`pathfinding`] - A* over free cells
//! - [`resolver`] - Per-tick targeting, movement and attacks
//! - [`battle`] - Deployment, eviction and win detection around the resolver
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod resolver;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{Battle, BattleSummary};
    pub use crate::config::CombatConfig;
    pub use crate::element::{calculate_damage, Element};
    pub use crate::error::{CombatError, Result};
    pub use crate::events::CombatEvent;
    pub use crate::grid::{BattleGrid, CellCoord, Half};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::pathfinding::find_path;
    pub use crate::resolver::{is_combat_over, CombatOutcome, CombatResolver};
    pub use crate::unit::{
        BaseStats, Role, Side, StarLevel, Unit, UnitDefinition, UnitId, UnitState,
    };
}
