//! ASCII board renderer for quick terminal review of a battle.
//!
//! Allies render in lowercase, enemies in uppercase, keyed by role.
//! Colour (ANSI) marks health: green above two thirds, yellow above one
//! third, red below.

use std::fmt::Write;

use autobattler_core::battle::Battle;
use autobattler_core::math::Fixed;
use autobattler_core::unit::{Role, Side, Unit};

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct BoardStyle {
    /// Use colored output (ANSI).
    pub use_color: bool,
    /// Append a per-side unit count line.
    pub show_legend: bool,
}

impl Default for BoardStyle {
    fn default() -> Self {
        Self {
            use_color: true,
            show_legend: true,
        }
    }
}

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
}

fn unit_char(unit: &Unit) -> char {
    let base = match unit.definition().role {
        Role::Tank => 't',
        Role::Warrior => 'w',
        Role::Ranger => 'r',
        Role::Mage => 'm',
        Role::Assassin => 'a',
        Role::Support => 's',
    };
    match unit.side {
        Side::Ally => base,
        Side::Enemy => base.to_ascii_uppercase(),
    }
}

fn health_color(unit: &Unit) -> &'static str {
    let fraction = unit.health_fraction();
    if fraction * 3 > Fixed::from_num(2) {
        colors::GREEN
    } else if fraction * 3 > Fixed::ONE {
        colors::YELLOW
    } else {
        colors::RED
    }
}

/// Render the battle's grid, one text row per grid row (row 0 first).
pub fn render_board(battle: &Battle, style: &BoardStyle) -> String {
    let grid = battle.grid();
    let mut output = String::new();

    let _ = writeln!(output, "+{}+", "-".repeat(grid.width() as usize));
    for row in 0..grid.height() {
        output.push('|');
        for col in 0..grid.width() {
            match grid.occupant(col, row).and_then(|id| battle.unit(id)) {
                Some(unit) if style.use_color => {
                    output.push_str(health_color(unit));
                    output.push(unit_char(unit));
                    output.push_str(colors::RESET);
                }
                Some(unit) => output.push(unit_char(unit)),
                None => output.push('.'),
            }
        }
        output.push_str("|\n");
    }
    let _ = writeln!(output, "+{}+", "-".repeat(grid.width() as usize));

    if style.show_legend {
        let _ = writeln!(
            output,
            "tick {}: {} allies (lower), {} enemies (UPPER)",
            battle.get_tick(),
            battle.allies().len(),
            battle.enemies().len()
        );
    }

    output
}
