//! Combat configuration constants.
//!
//! These values are shared with the surrounding game mode. They default to
//! the reference build (8x8 board, 10 mana per attack, 100 mana cap) and can
//! be loaded from RON for balance experiments.
//!
//! # Example RON
//!
//! ```ron
//! CombatConfig(
//!     grid_width: 8,
//!     grid_height: 8,
//!     cell_size: 2.0,
//!     mana_per_attack: 10,
//!     mana_cap: 100,
//!     same_element_percent: 50,
//!     defense_mitigation_percent: 50,
//!     path_expansion_factor: 4,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};
use crate::math::{decimal_serde, Fixed};

/// Default board width in cells.
pub const DEFAULT_GRID_WIDTH: u32 = 8;

/// Default board height in cells.
pub const DEFAULT_GRID_HEIGHT: u32 = 8;

/// Mana gained per resolved attack.
pub const DEFAULT_MANA_PER_ATTACK: u32 = 10;

/// Mana at which an ability triggers.
pub const DEFAULT_MANA_CAP: u32 = 100;

/// Tunable combat constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Board width in cells.
    pub grid_width: u32,
    /// Board height in cells.
    pub grid_height: u32,
    /// Edge length of one cell in world units.
    #[serde(with = "decimal_serde")]
    pub cell_size: Fixed,
    /// Mana gained by the attacker per resolved attack.
    pub mana_per_attack: u32,
    /// Mana value that triggers an ability and resets the counter.
    pub mana_cap: u32,
    /// Damage percent when attacker and defender share an element.
    pub same_element_percent: u32,
    /// Percent of defender defense subtracted from raw damage.
    pub defense_mitigation_percent: u32,
    /// Pathfinding expands at most `width * height * factor` nodes.
    pub path_expansion_factor: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            cell_size: Fixed::ONE,
            mana_per_attack: DEFAULT_MANA_PER_ATTACK,
            mana_cap: DEFAULT_MANA_CAP,
            same_element_percent: 50,
            defense_mitigation_percent: 50,
            path_expansion_factor: 4,
        }
    }
}

impl CombatConfig {
    /// Parse and validate a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| CombatError::Parse {
            what: "combat config",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable board.
    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(CombatError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.cell_size <= Fixed::ZERO {
            return Err(CombatError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.mana_cap == 0 {
            return Err(CombatError::InvalidConfig("mana_cap must be positive".into()));
        }
        if self.path_expansion_factor == 0 {
            return Err(CombatError::InvalidConfig(
                "path_expansion_factor must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Node-expansion ceiling for a single path search.
    #[must_use]
    pub fn path_expansion_limit(&self) -> usize {
        (self.grid_width as usize) * (self.grid_height as usize) * (self.path_expansion_factor as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_board() {
        let config = CombatConfig::default();
        assert_eq!(config.grid_width, 8);
        assert_eq!(config.grid_height, 8);
        assert_eq!(config.mana_per_attack, 10);
        assert_eq!(config.mana_cap, 100);
        assert_eq!(config.path_expansion_limit(), 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = CombatConfig::from_ron_str("(grid_width: 6, cell_size: 2.5)").unwrap();
        assert_eq!(config.grid_width, 6);
        assert_eq!(config.grid_height, 8);
        assert_eq!(config.cell_size, Fixed::from_num(2.5));
        assert_eq!(config.path_expansion_limit(), 6 * 8 * 4);
    }

    #[test]
    fn test_zero_grid_rejected() {
        let err = CombatConfig::from_ron_str("(grid_height: 0)").unwrap_err();
        assert!(matches!(err, CombatError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = CombatConfig::from_ron_str("(grid_width: \"wide\")").unwrap_err();
        assert!(matches!(err, CombatError::Parse { .. }));
    }
}
