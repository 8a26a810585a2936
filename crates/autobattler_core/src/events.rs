//! Combat events emitted by the resolver.
//!
//! Events are pure output for the game layer (animation, audio, score).
//! The core keeps no history beyond the list returned for the current tick.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::grid::CellCoord;
use crate::unit::UnitId;

/// One user-visible occurrence within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    /// An attack was resolved.
    Attack {
        /// Attacking unit.
        source: UnitId,
        /// Unit that was hit.
        target: UnitId,
        /// Damage dealt after modifiers.
        damage: u32,
        /// Attacker's element.
        element: Element,
    },
    /// A unit filled its mana bar.
    AbilityTriggered {
        /// Unit whose ability fired.
        source: UnitId,
        /// Its target at the time.
        target: UnitId,
        /// Caster's element.
        element: Element,
    },
    /// A unit's health reached zero.
    Death {
        /// Unit that died.
        unit: UnitId,
    },
    /// A unit stepped to an adjacent cell.
    Move {
        /// Unit that moved.
        unit: UnitId,
        /// Cell it left.
        from: CellCoord,
        /// Cell it now occupies.
        to: CellCoord,
    },
}

impl CombatEvent {
    /// The unit that caused this event.
    #[must_use]
    pub const fn actor(&self) -> UnitId {
        match *self {
            Self::Attack { source, .. } | Self::AbilityTriggered { source, .. } => source,
            Self::Death { unit } | Self::Move { unit, .. } => unit,
        }
    }

    /// Whether this is an attack event.
    #[must_use]
    pub const fn is_attack(&self) -> bool {
        matches!(self, Self::Attack { .. })
    }

    /// Whether this is a death event.
    #[must_use]
    pub const fn is_death(&self) -> bool {
        matches!(self, Self::Death { .. })
    }

    /// Whether this is a move event.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }
}
