//! Elemental affinities and the damage formula.
//!
//! Damage follows:
//! ```text
//! Damage = max(1, round(Attack x ElementMultiplier - Defense x Mitigation))
//! ```
//! Multipliers are whole percents and the formula is evaluated in integer
//! hundredths, so `round` (half-up) is exact and platform independent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;

/// Attacks always deal at least this much damage.
pub const MIN_DAMAGE: u32 = 1;

/// Multiplier for a pairing with no special interaction.
pub const NEUTRAL_PERCENT: u32 = 100;

/// Elemental affinity of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Element {
    /// Plain weapons. No counters either way.
    #[default]
    Physical,
    /// Strong vs Earth.
    Fire,
    /// Strong vs Fire.
    Water,
    /// Strong vs Lightning.
    Earth,
    /// Strong vs Water.
    Lightning,
    /// Strong vs Dark.
    Light,
    /// Strong vs Light.
    Dark,
}

impl Element {
    /// Counter bonus (percent) this element has over `defender`, if any.
    ///
    /// Same-element pairings are handled separately by [`multiplier_percent`].
    #[must_use]
    pub const fn counter_percent(self, defender: Element) -> Option<u32> {
        match (self, defender) {
            (Self::Water, Self::Fire) => Some(150),
            (Self::Fire, Self::Earth) => Some(150),
            (Self::Earth, Self::Lightning) => Some(150),
            (Self::Lightning, Self::Water) => Some(130),
            (Self::Light, Self::Dark) => Some(130),
            (Self::Dark, Self::Light) => Some(130),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Physical => "physical",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Earth => "earth",
            Self::Lightning => "lightning",
            Self::Light => "light",
            Self::Dark => "dark",
        };
        f.write_str(name)
    }
}

/// Damage multiplier, in percent, for `attacker` hitting `defender`.
#[must_use]
pub fn multiplier_percent(attacker: Element, defender: Element, same_element_percent: u32) -> u32 {
    if attacker == defender {
        return same_element_percent;
    }
    attacker.counter_percent(defender).unwrap_or(NEUTRAL_PERCENT)
}

/// Round a value expressed in hundredths to the nearest integer, halves up.
#[inline]
fn round_hundredths(value: i64) -> i64 {
    (value + 50).div_euclid(100)
}

/// Calculate the damage one attack deals.
///
/// # Arguments
/// * `attack` - Attacker's attack stat
/// * `attacker` - Attacker's element
/// * `defense` - Defender's defense stat
/// * `defender` - Defender's element
/// * `config` - Supplies the same-element penalty and defense mitigation
///
/// # Returns
/// Final damage, never below [`MIN_DAMAGE`].
#[must_use]
pub fn calculate_damage(
    attack: u32,
    attacker: Element,
    defense: u32,
    defender: Element,
    config: &CombatConfig,
) -> u32 {
    let multiplier = multiplier_percent(attacker, defender, config.same_element_percent);

    let raw = i64::from(attack) * i64::from(multiplier)
        - i64::from(defense) * i64::from(config.defense_mitigation_percent);

    let rounded = round_hundredths(raw).max(i64::from(MIN_DAMAGE));
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
