//! End-to-end battle tests for autobattler_core.
//!
//! These drive whole battles through [`Battle`] and check the observable
//! results: events, rosters, grid occupancy and outcome.

use autobattler_core::prelude::*;
use autobattler_test_utils::fixtures::{
    battle_with, duel_battle, fixed, fixed_f, melee, skirmish_battle, unit, UnitBuilder,
};

fn attacks_by(events: &[CombatEvent], id: u32) -> Vec<(UnitId, u32)> {
    events
        .iter()
        .filter_map(|e| match *e {
            CombatEvent::Attack {
                source,
                target,
                damage,
                ..
            } if source == UnitId(id) => Some((target, damage)),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Full battles
// =============================================================================

mod full_battle {
    use super::*;

    /// Two identical Physical knights meet in the middle of column 0.
    ///
    /// Same-element halves the 10 attack to 5, so 100 health takes 20 hits.
    /// The ally acts first every tick and lands the last blow.
    #[test]
    fn test_duel_plays_out_exactly() {
        let mut battle = duel_battle();
        let summary = battle.run_until_over(fixed(1), 500);

        assert_eq!(summary.outcome, CombatOutcome::AllyWin);
        // Three ticks of walking, then twenty ticks of trading blows
        assert_eq!(summary.ticks, 23);
        assert_eq!(summary.attacks, 39);
        assert_eq!(summary.ally_damage, 100);
        assert_eq!(summary.enemy_damage, 95);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.allies_remaining, 1);
        assert_eq!(summary.enemies_remaining, 0);

        let survivor = &battle.allies()[0];
        assert_eq!(survivor.health, 5);
        assert_eq!(survivor.cell(), (0, 3));
        assert_eq!(battle.grid().occupied_count(), 1);
        assert!(battle.check_occupancy().is_ok());
    }

    #[test]
    fn test_approach_moves_one_cell_per_tick() {
        let mut battle = duel_battle();

        let first = battle.step(fixed(1));
        assert_eq!(
            first,
            vec![
                CombatEvent::Move {
                    unit: UnitId(1),
                    from: (0, 0),
                    to: (0, 1),
                },
                CombatEvent::Move {
                    unit: UnitId(2),
                    from: (0, 7),
                    to: (0, 6),
                },
            ]
        );

        battle.step(fixed(1));
        let third = battle.step(fixed(1));
        assert!(third.iter().all(CombatEvent::is_move));
        assert_eq!(battle.allies()[0].cell(), (0, 3));
        assert_eq!(battle.enemies()[0].cell(), (0, 4));

        // Adjacent now: the fourth tick is pure combat
        let fourth = battle.step(fixed(1));
        assert_eq!(fourth.len(), 2);
        assert!(fourth.iter().all(CombatEvent::is_attack));
    }

    #[test]
    fn test_skirmish_finishes_with_consistent_grid() {
        let mut battle = skirmish_battle();
        let mut ticks = 0;

        while !battle.outcome().is_over() && ticks < 1_000 {
            battle.step(fixed(1));
            assert!(battle.check_occupancy().is_ok(), "tick {ticks}");
            ticks += 1;
        }

        let summary = battle.summary();
        assert!(summary.outcome.is_over(), "skirmish stalled: {summary:?}");
        assert_eq!(
            battle.grid().occupied_count(),
            summary.allies_remaining + summary.enemies_remaining
        );
    }

    #[test]
    fn test_tick_limit_leaves_battle_ongoing() {
        let mut battle = duel_battle();
        let summary = battle.run_until_over(fixed(1), 5);
        assert_eq!(summary.outcome, CombatOutcome::Ongoing);
        assert_eq!(summary.ticks, 5);
    }
}

// =============================================================================
// Damage and elements
// =============================================================================

mod elements {
    use super::*;

    fn first_hit(attacker: UnitBuilder, defender: UnitBuilder) -> u32 {
        let mut battle = battle_with(vec![
            attacker.spawn(1, Side::Ally, (2, 2)),
            defender.attack(0).health(1_000).spawn(2, Side::Enemy, (2, 3)),
        ]);
        let events = battle.step(fixed(1));
        let hits = attacks_by(&events, 1);
        assert_eq!(hits.len(), 1);
        hits[0].1
    }

    #[test]
    fn test_counter_element_bonus() {
        // 15 * 1.5 = 22.5, rounded half up
        let damage = first_hit(
            UnitBuilder::new("tide").attack(15).element(Element::Water),
            UnitBuilder::new("ember").element(Element::Fire),
        );
        assert_eq!(damage, 23);
    }

    #[test]
    fn test_same_element_penalty() {
        let damage = first_hit(
            UnitBuilder::new("a").attack(20).element(Element::Fire),
            UnitBuilder::new("b").element(Element::Fire),
        );
        assert_eq!(damage, 10);
    }

    #[test]
    fn test_neutral_matchup_with_defense() {
        // 20 - 5 * 0.5 = 17.5 -> 18
        let damage = first_hit(
            UnitBuilder::new("a").attack(20),
            UnitBuilder::new("b").defense(5).element(Element::Light),
        );
        assert_eq!(damage, 18);
    }

    #[test]
    fn test_heavy_defense_still_deals_minimum() {
        let damage = first_hit(
            UnitBuilder::new("a").attack(3),
            UnitBuilder::new("wall").defense(500).element(Element::Earth),
        );
        assert_eq!(damage, 1);
    }

    #[test]
    fn test_star_scaling_applies_to_battle_stats() {
        let def = UnitBuilder::new("knight").health(100).attack(15).build();
        let two = Unit::new(UnitId(1), Side::Ally, def.clone(), StarLevel::Two, (0, 0));
        let three = Unit::new(UnitId(2), Side::Ally, def, StarLevel::Three, (1, 0));

        assert_eq!(two.max_health, 180);
        assert_eq!(two.attack, 27);
        assert_eq!(three.max_health, 320);
        assert_eq!(three.attack, 48);
    }
}

// =============================================================================
// Targeting and movement
// =============================================================================

mod targeting {
    use super::*;

    #[test]
    fn test_retargets_after_kill() {
        let killer = UnitBuilder::new("killer").attack(40).spawn(1, Side::Ally, (3, 3));
        let weak = UnitBuilder::new("weak").health(10).spawn(2, Side::Enemy, (3, 4));
        let far = UnitBuilder::new("far")
            .attack(0)
            .element(Element::Dark)
            .spawn(3, Side::Enemy, (5, 3));
        let mut battle = battle_with(vec![killer, weak, far]);

        let first = battle.step(fixed(1));
        assert_eq!(attacks_by(&first, 1), vec![(UnitId(2), 20)]);
        assert!(first.contains(&CombatEvent::Death { unit: UnitId(2) }));
        // The survivor closed in during the same tick
        assert_eq!(battle.unit(UnitId(3)).map(Unit::cell), Some((4, 3)));

        let second = battle.step(fixed(1));
        assert_eq!(attacks_by(&second, 1), vec![(UnitId(3), 40)]);
        assert_eq!(battle.allies()[0].target(), Some(UnitId(3)));
    }

    #[test]
    fn test_ranged_unit_holds_position() {
        let archer = UnitBuilder::new("archer")
            .range(3)
            .element(Element::Lightning)
            .spawn(1, Side::Ally, (0, 0));
        let dummy = UnitBuilder::new("dummy")
            .attack(0)
            .move_speed(fixed(0))
            .spawn(2, Side::Enemy, (3, 2));
        let mut battle = battle_with(vec![archer, dummy]);

        for _ in 0..5 {
            let events = battle.step(fixed(1));
            assert!(!events.iter().any(CombatEvent::is_move));
        }
        assert_eq!(battle.allies()[0].cell(), (0, 0));
        assert_eq!(battle.enemies()[0].health, 50);
    }

    #[test]
    fn test_boxed_in_unit_holds() {
        let def = melee();
        let wall = UnitBuilder::new("wall").attack(0).move_speed(fixed(0)).build();
        let mut battle = battle_with(vec![
            unit(1, Side::Ally, &def, (0, 0)),
            unit(2, Side::Ally, &wall, (1, 0)),
            unit(3, Side::Ally, &wall, (0, 1)),
            unit(4, Side::Enemy, &wall, (7, 7)),
        ]);

        for _ in 0..3 {
            let events = battle.step(fixed(1));
            assert!(events.is_empty());
        }
        assert_eq!(battle.allies()[0].cell(), (0, 0));
        assert_eq!(battle.allies()[0].target(), Some(UnitId(4)));
    }

    #[test]
    fn test_slow_unit_moves_every_other_tick() {
        let slow = UnitBuilder::new("slow")
            .move_speed(fixed_f(0.5))
            .spawn(1, Side::Ally, (0, 0));
        let dummy = UnitBuilder::new("dummy")
            .attack(0)
            .move_speed(fixed(0))
            .spawn(2, Side::Enemy, (0, 7));
        let mut battle = battle_with(vec![slow, dummy]);

        let moves: Vec<usize> = (0..6)
            .map(|_| battle.step(fixed(1)).iter().filter(|e| e.is_move()).count())
            .collect();
        assert_eq!(moves, vec![1, 0, 1, 0, 1, 0]);
        assert_eq!(battle.allies()[0].cell(), (0, 3));
    }
}

// =============================================================================
// Outcome
// =============================================================================

mod outcome {
    use super::*;

    #[test]
    fn test_mutual_wipe_is_enemy_win() {
        let def = melee();
        let mut allies = vec![unit(1, Side::Ally, &def, (0, 0))];
        let mut enemies = vec![unit(2, Side::Enemy, &def, (0, 1))];
        allies[0].take_damage(1_000);
        enemies[0].take_damage(1_000);

        assert_eq!(is_combat_over(&allies, &enemies), CombatOutcome::EnemyWin);
    }

    #[test]
    fn test_dead_units_do_not_count() {
        let def = melee();
        let allies = vec![unit(1, Side::Ally, &def, (0, 0))];
        let mut enemies = vec![
            unit(2, Side::Enemy, &def, (0, 1)),
            unit(3, Side::Enemy, &def, (0, 2)),
        ];
        assert_eq!(is_combat_over(&allies, &enemies), CombatOutcome::Ongoing);

        for enemy in &mut enemies {
            enemy.take_damage(1_000);
        }
        assert_eq!(is_combat_over(&allies, &enemies), CombatOutcome::AllyWin);
    }

    #[test]
    fn test_no_events_once_decided() {
        let mut battle = duel_battle();
        battle.run_until_over(fixed(1), 500);
        assert!(battle.step(fixed(1)).is_empty());
    }
}
