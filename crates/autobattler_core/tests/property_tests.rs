//! Property-based tests for autobattler_core.
//!
//! Random unit definitions and deployments, checked against the rules every
//! battle must obey regardless of balance numbers.

use autobattler_core::config::CombatConfig;
use autobattler_core::element::calculate_damage;
use autobattler_core::events::CombatEvent;
use autobattler_core::grid::BattleGrid;
use autobattler_core::pathfinding::find_path;
use autobattler_core::unit::{Side, StarLevel, Unit, UnitId};
use autobattler_test_utils::determinism::strategies::{
    arb_battle, arb_element, arb_placements, arb_stat, build_battle,
};
use autobattler_test_utils::determinism::verify_battle_determinism;
use autobattler_test_utils::fixtures::{fixed, UnitBuilder};
use proptest::prelude::*;

const DT: i32 = 1;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_damage_is_at_least_one(
        attack in arb_stat(),
        defense in arb_stat(),
        attacker in arb_element(),
        defender in arb_element(),
    ) {
        let damage = calculate_damage(attack, attacker, defense, defender, &CombatConfig::default());
        prop_assert!(damage >= 1);
    }

    #[test]
    fn prop_defense_never_increases_damage(
        attack in arb_stat(),
        defense in arb_stat(),
        attacker in arb_element(),
        defender in arb_element(),
    ) {
        let config = CombatConfig::default();
        let bare = calculate_damage(attack, attacker, 0, defender, &config);
        let armored = calculate_damage(attack, attacker, defense, defender, &config);
        prop_assert!(armored <= bare);
    }

    #[test]
    fn prop_range_is_chebyshev(
        a in (0u32..8, 0u32..8),
        b in (0u32..8, 0u32..8),
        range in 0u32..8,
    ) {
        let def = UnitBuilder::new("probe").range(range).build();
        let me = Unit::new(UnitId(1), Side::Ally, def.clone(), StarLevel::One, a);
        let other = Unit::new(UnitId(2), Side::Enemy, def, StarLevel::One, b);

        let dx = a.0.abs_diff(b.0);
        let dy = a.1.abs_diff(b.1);
        prop_assert_eq!(me.is_in_range(&other), dx.max(dy) <= range);
    }

    #[test]
    fn prop_path_steps_are_adjacent_and_free(
        start in (0u32..8, 0u32..8),
        goal in (0u32..8, 0u32..8),
        blockers in proptest::collection::vec((0u32..8, 0u32..8), 0..20),
    ) {
        let mut grid = BattleGrid::default();
        for (i, &(c, r)) in blockers.iter().enumerate() {
            if (c, r) != start {
                grid.place(c, r, UnitId(100 + i as u32));
            }
        }

        let path = find_path(&grid, start, goal, 8 * 8 * 4);
        let mut prev = start;
        for (i, &cell) in path.iter().enumerate() {
            prop_assert_eq!(prev.0.abs_diff(cell.0) + prev.1.abs_diff(cell.1), 1);
            if i + 1 < path.len() {
                prop_assert!(!grid.is_occupied(cell.0, cell.1));
            }
            prev = cell;
        }
        if let Some(&last) = path.last() {
            prop_assert_eq!(last, goal);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_occupancy_holds_every_tick(mut battle in arb_battle(16)) {
        for tick in 0..60 {
            let events = battle.step(fixed(DT));

            prop_assert!(battle.check_occupancy().is_ok(), "tick {}: {:?}", tick, battle.check_occupancy());
            for event in &events {
                if let CombatEvent::Move { from, to, .. } = *event {
                    prop_assert_eq!(from.0.abs_diff(to.0) + from.1.abs_diff(to.1), 1);
                }
            }
            prop_assert!(battle.allies().iter().all(Unit::is_alive));
            prop_assert!(battle.enemies().iter().all(Unit::is_alive));

            if battle.outcome().is_over() {
                break;
            }
        }
    }

    #[test]
    fn prop_health_never_rises(mut battle in arb_battle(12)) {
        let mut last: Vec<(UnitId, u32)> = battle
            .allies()
            .iter()
            .chain(battle.enemies())
            .map(|u| (u.id, u.health))
            .collect();

        for _ in 0..40 {
            battle.step(fixed(DT));
            for (id, health) in &last {
                if let Some(unit) = battle.unit(*id) {
                    prop_assert!(unit.health <= *health);
                }
            }
            last = battle
                .allies()
                .iter()
                .chain(battle.enemies())
                .map(|u| (u.id, u.health))
                .collect();
        }
    }

    #[test]
    fn prop_random_battles_are_deterministic(placements in arb_placements(16)) {
        prop_assert!(verify_battle_determinism(|| build_battle(&placements), fixed(DT), 80));
    }
}
