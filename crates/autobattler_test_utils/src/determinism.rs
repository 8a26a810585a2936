//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Battles must replay exactly so that every client agrees on the winner.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   Timers use [`autobattler_core::math::Fixed`] and damage uses integer
//!   hundredths.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Rosters are vectors processed in order; A* ties break on coordinates.
//!
//! - **System randomness**: Nothing in the core draws random numbers.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use autobattler_core::battle::Battle;
use autobattler_core::math::Fixed;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use autobattler_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a battle twice from the same setup and compare final state hashes.
pub fn verify_battle_determinism<F>(setup_fn: F, dt: Fixed, num_ticks: u64) -> bool
where
    F: Fn() -> Battle,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |battle| {
            battle.step(dt);
        },
        Battle::state_hash,
    )
    .is_deterministic
}

/// Run the same battle on several threads and collect final hashes.
///
/// Catches non-determinism that only shows up under different memory
/// layouts or scheduling.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, dt: Fixed, num_ticks: u64) -> Vec<u64>
where
    F: Fn() -> Battle + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        battle.step(dt);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    })
}

/// Compare two battle runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` at the first tick
/// where their hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, dt: Fixed, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let events_a = a.step(dt);
        let events_b = b.step(dt);

        if events_a != events_b || a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible unit definitions and
/// deployments for property-based testing.
pub mod strategies {
    use std::sync::Arc;

    use autobattler_core::battle::Battle;
    use autobattler_core::config::CombatConfig;
    use autobattler_core::element::Element;
    use autobattler_core::grid::CellCoord;
    use autobattler_core::math::Fixed;
    use autobattler_core::unit::{
        BaseStats, Role, Side, StarLevel, Unit, UnitDefinition, UnitId,
    };
    use proptest::prelude::*;

    /// Any element.
    pub fn arb_element() -> impl Strategy<Value = Element> {
        prop_oneof![
            Just(Element::Physical),
            Just(Element::Fire),
            Just(Element::Water),
            Just(Element::Earth),
            Just(Element::Lightning),
            Just(Element::Light),
            Just(Element::Dark),
        ]
    }

    /// Any star level.
    pub fn arb_star() -> impl Strategy<Value = StarLevel> {
        prop_oneof![
            Just(StarLevel::One),
            Just(StarLevel::Two),
            Just(StarLevel::Three),
        ]
    }

    /// Attack or defense values (0-200).
    pub fn arb_stat() -> impl Strategy<Value = u32> {
        0u32..200u32
    }

    /// Speeds and attack rates in quarter steps from 0.25 to 3.
    pub fn arb_rate() -> impl Strategy<Value = Fixed> {
        (1i32..=12i32).prop_map(|q| Fixed::from_num(q) / Fixed::from_num(4))
    }

    /// Base stats a designer might plausibly write.
    pub fn arb_stats() -> impl Strategy<Value = BaseStats> {
        (
            20u32..300u32,
            arb_stat(),
            0u32..40u32,
            arb_rate(),
            1u32..=4u32,
            arb_rate(),
        )
            .prop_map(
                |(health, attack, defense, move_speed, attack_range, attacks_per_second)| {
                    BaseStats {
                        health,
                        attack,
                        defense,
                        move_speed,
                        attack_range,
                        attacks_per_second,
                    }
                },
            )
    }

    /// A unit definition with random element and stats.
    pub fn arb_definition() -> impl Strategy<Value = Arc<UnitDefinition>> {
        (arb_element(), arb_stats()).prop_map(|(element, stats)| {
            Arc::new(UnitDefinition {
                id: format!("{element:?}").to_lowercase(),
                name: format!("{element} unit"),
                archetype: "generic".to_owned(),
                element,
                role: Role::default(),
                stats,
            })
        })
    }

    /// One deployment: a definition, a star level and a cell.
    #[derive(Debug, Clone)]
    pub struct Placement {
        /// Roster.
        pub side: Side,
        /// Star level.
        pub star: StarLevel,
        /// Cell.
        pub cell: CellCoord,
        /// Definition.
        pub definition: Arc<UnitDefinition>,
    }

    /// Random deployments on an 8x8 board.
    ///
    /// Cells are distinct. Units in rows 0-3 are allies, rows 4-7 enemies.
    pub fn arb_placements(max_units: usize) -> impl Strategy<Value = Vec<Placement>> {
        let cells: Vec<CellCoord> = (0..8u32)
            .flat_map(|row| (0..8u32).map(move |col| (col, row)))
            .collect();
        let max_units = max_units.clamp(2, cells.len());

        proptest::sample::subsequence(cells, 2..=max_units).prop_flat_map(|cells| {
            let n = cells.len();
            (
                Just(cells),
                proptest::collection::vec((arb_definition(), arb_star()), n),
            )
                .prop_map(|(cells, specs)| {
                    cells
                        .into_iter()
                        .zip(specs)
                        .map(|(cell, (definition, star))| Placement {
                            side: if cell.1 < 4 { Side::Ally } else { Side::Enemy },
                            star,
                            cell,
                            definition,
                        })
                        .collect()
                })
        })
    }

    /// Deploy placements into a default-config battle, numbering units from 1.
    ///
    /// # Panics
    ///
    /// Panics if the placements collide, which [`arb_placements`] never does.
    #[must_use]
    pub fn build_battle(placements: &[Placement]) -> Battle {
        let mut battle = Battle::new(CombatConfig::default()).expect("default config is valid");
        for (i, p) in placements.iter().enumerate() {
            let id = UnitId(u32::try_from(i + 1).expect("placement count fits u32"));
            let unit = Unit::new(id, p.side, p.definition.clone(), p.star, p.cell);
            battle.deploy(unit).expect("generated placements never collide");
        }
        battle
    }

    /// A random battle of up to `max_units` units.
    pub fn arb_battle(max_units: usize) -> impl Strategy<Value = Battle> {
        arb_placements(max_units).prop_map(|p| build_battle(&p))
    }
}
