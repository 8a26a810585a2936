//! Test fixtures and helpers.
//!
//! Pre-built unit definitions and battles for consistent testing.

use std::sync::Arc;

use autobattler_core::battle::Battle;
use autobattler_core::config::CombatConfig;
use autobattler_core::element::Element;
use autobattler_core::grid::CellCoord;
use autobattler_core::unit::{BaseStats, Role, Side, StarLevel, Unit, UnitDefinition, UnitId};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Builder for unit definitions with sensible melee defaults.
///
/// Defaults: 100 health, 10 attack, 0 defense, speed 1, range 1,
/// one attack per second, Physical, Warrior.
#[derive(Debug, Clone)]
pub struct UnitBuilder {
    definition: UnitDefinition,
}

impl UnitBuilder {
    /// Start a definition with the given id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            definition: UnitDefinition {
                id: id.to_owned(),
                name: id.to_owned(),
                archetype: id.to_owned(),
                element: Element::Physical,
                role: Role::Warrior,
                stats: BaseStats {
                    health: 100,
                    attack: 10,
                    defense: 0,
                    move_speed: fixed(1),
                    attack_range: 1,
                    attacks_per_second: fixed(1),
                },
            },
        }
    }

    /// Set max health.
    #[must_use]
    pub fn health(mut self, health: u32) -> Self {
        self.definition.stats.health = health;
        self
    }

    /// Set attack.
    #[must_use]
    pub fn attack(mut self, attack: u32) -> Self {
        self.definition.stats.attack = attack;
        self
    }

    /// Set defense.
    #[must_use]
    pub fn defense(mut self, defense: u32) -> Self {
        self.definition.stats.defense = defense;
        self
    }

    /// Set movement speed in cells per second.
    #[must_use]
    pub fn move_speed(mut self, speed: I32F32) -> Self {
        self.definition.stats.move_speed = speed;
        self
    }

    /// Set attack range in cells.
    #[must_use]
    pub fn range(mut self, range: u32) -> Self {
        self.definition.stats.attack_range = range;
        self
    }

    /// Set attacks per second.
    #[must_use]
    pub fn attacks_per_second(mut self, aps: I32F32) -> Self {
        self.definition.stats.attacks_per_second = aps;
        self
    }

    /// Set the element.
    #[must_use]
    pub fn element(mut self, element: Element) -> Self {
        self.definition.element = element;
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.definition.role = role;
        self
    }

    /// Finish the definition.
    #[must_use]
    pub fn build(self) -> Arc<UnitDefinition> {
        Arc::new(self.definition)
    }

    /// Finish the definition and spawn a one-star unit from it.
    #[must_use]
    pub fn spawn(self, id: u32, side: Side, cell: CellCoord) -> Unit {
        Unit::new(UnitId(id), side, self.build(), StarLevel::One, cell)
    }
}

/// One-off definition with the given element, attack and range.
#[must_use]
pub fn definition(id: &str, element: Element, attack: u32, range: u32) -> Arc<UnitDefinition> {
    UnitBuilder::new(id)
        .element(element)
        .attack(attack)
        .range(range)
        .build()
}

/// Default melee definition (see [`UnitBuilder`]).
#[must_use]
pub fn melee() -> Arc<UnitDefinition> {
    UnitBuilder::new("melee").build()
}

/// Ranged definition: range 3, lower health.
#[must_use]
pub fn ranger() -> Arc<UnitDefinition> {
    UnitBuilder::new("ranger")
        .health(70)
        .attack(12)
        .range(3)
        .role(Role::Ranger)
        .build()
}

/// Spawn a one-star unit from a shared definition.
#[must_use]
pub fn unit(id: u32, side: Side, definition: &Arc<UnitDefinition>, cell: CellCoord) -> Unit {
    Unit::new(UnitId(id), side, definition.clone(), StarLevel::One, cell)
}

/// Build a default-config battle from a list of units.
///
/// # Panics
///
/// Panics if any unit cannot be deployed.
#[must_use]
pub fn battle_with(units: Vec<Unit>) -> Battle {
    let mut battle = Battle::new(CombatConfig::default()).expect("default config is valid");
    for unit in units {
        battle.deploy(unit).expect("fixture deployment failed");
    }
    battle
}

/// One melee unit per side at opposite ends of column 0.
#[must_use]
pub fn duel_battle() -> Battle {
    let def = melee();
    battle_with(vec![
        unit(1, Side::Ally, &def, (0, 0)),
        unit(2, Side::Enemy, &def, (0, 7)),
    ])
}

/// Four against four across the board with a mix of ranges and elements.
///
/// Allies stand on rows 0-1, enemies on rows 6-7.
#[must_use]
pub fn skirmish_battle() -> Battle {
    let fire = UnitBuilder::new("fire_knight")
        .health(120)
        .attack(14)
        .defense(4)
        .element(Element::Fire)
        .build();
    let water = UnitBuilder::new("tide_archer")
        .health(80)
        .attack(11)
        .range(3)
        .element(Element::Water)
        .role(Role::Ranger)
        .build();
    let earth = UnitBuilder::new("stone_guard")
        .health(160)
        .attack(8)
        .defense(8)
        .move_speed(fixed_f(0.5))
        .element(Element::Earth)
        .role(Role::Tank)
        .build();
    let dark = UnitBuilder::new("shade")
        .health(70)
        .attack(16)
        .attacks_per_second(fixed_f(1.5))
        .move_speed(fixed(2))
        .element(Element::Dark)
        .role(Role::Assassin)
        .build();

    battle_with(vec![
        unit(1, Side::Ally, &fire, (1, 1)),
        unit(2, Side::Ally, &water, (3, 0)),
        unit(3, Side::Ally, &earth, (5, 1)),
        unit(4, Side::Ally, &dark, (7, 0)),
        unit(11, Side::Enemy, &earth, (0, 6)),
        unit(12, Side::Enemy, &dark, (2, 7)),
        unit(13, Side::Enemy, &fire, (4, 6)),
        unit(14, Side::Enemy, &water, (6, 7)),
    ])
}

/// Every cell of an 8x8 board filled: allies on rows 0-3, enemies on 4-7.
#[must_use]
pub fn full_board_battle() -> Battle {
    let melee = melee();
    let ranged = ranger();
    let mut units = Vec::with_capacity(64);
    let mut next_id = 1;
    for row in 0..8u32 {
        for col in 0..8u32 {
            let side = if row < 4 { Side::Ally } else { Side::Enemy };
            // Back rows carry the ranged units
            let def = if row == 0 || row == 7 { &ranged } else { &melee };
            units.push(unit(next_id, side, def, (col, row)));
            next_id += 1;
        }
    }
    battle_with(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let def = UnitBuilder::new("x").build();
        assert_eq!(def.stats.health, 100);
        assert_eq!(def.stats.attack_range, 1);
        assert_eq!(def.element, Element::Physical);
    }

    #[test]
    fn test_definition_helper() {
        let def = definition("bolt", Element::Lightning, 25, 4);
        assert_eq!(def.element, Element::Lightning);
        assert_eq!(def.stats.attack, 25);
        assert_eq!(def.stats.attack_range, 4);
    }

    #[test]
    fn test_fixture_battles_deploy() {
        assert_eq!(duel_battle().allies().len(), 1);
        assert_eq!(skirmish_battle().enemies().len(), 4);

        let full = full_board_battle();
        assert_eq!(full.grid().occupied_count(), 64);
        assert!(full.check_occupancy().is_ok());
    }
}
