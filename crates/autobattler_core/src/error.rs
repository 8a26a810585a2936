//! Error types for battle setup and configuration.
//!
//! The per-tick simulation never fails: blocked moves, unreachable targets
//! and empty rosters are sentinels. Errors only arise while configuring a
//! battle or deploying units into it.

use thiserror::Error;

use crate::unit::UnitId;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Top-level error type for battle setup.
#[derive(Debug, Error)]
pub enum CombatError {
    /// Configuration values are out of range.
    #[error("Invalid combat config: {0}")]
    InvalidConfig(String),

    /// Data text failed to parse.
    #[error("Failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed.
        what: &'static str,
        /// Parser message.
        message: String,
    },

    /// A unit with this id is already deployed.
    #[error("Duplicate unit ID: {0}")]
    DuplicateUnit(UnitId),

    /// The requested cell is outside the grid.
    #[error("Cell ({col}, {row}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        col: u32,
        /// Requested row.
        row: u32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// The requested cell already holds a unit.
    #[error("Cell ({col}, {row}) is already occupied by unit {occupant}")]
    CellOccupied {
        /// Requested column.
        col: u32,
        /// Requested row.
        row: u32,
        /// Unit currently in the cell.
        occupant: UnitId,
    },

    /// A unit definition id was not found.
    #[error("Unknown unit definition: {0}")]
    UnknownDefinition(String),

    /// A unit's recorded cell disagrees with grid occupancy.
    #[error("Occupancy mismatch for unit {unit}: {detail}")]
    OccupancyMismatch {
        /// Unit whose bookkeeping diverged.
        unit: UnitId,
        /// What was found.
        detail: String,
    },
}
