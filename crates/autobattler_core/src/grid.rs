//! Battlefield occupancy grid.
//!
//! A fixed `width x height` table mapping each cell to at most one unit.
//! Every operation is total: out-of-range input yields `None`/`false`
//! instead of an error, so the resolver never has to handle failures.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::error::{CombatError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::unit::UnitId;

/// Grid coordinates as `(column, row)`.
pub type CellCoord = (u32, u32);

/// Which half of the board a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    /// Rows `0..height/2`, where allies deploy.
    Near,
    /// Rows `height/2..height`, where enemies deploy.
    Far,
}

/// One cell of the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Column index.
    pub col: u32,
    /// Row index.
    pub row: u32,
    /// World-space center, precomputed at construction.
    pub center: Vec2Fixed,
    /// Unit standing in this cell, if any.
    pub occupant: Option<UnitId>,
}

/// Fixed-size occupancy table.
#[derive(Debug, Clone)]
pub struct BattleGrid {
    width: u32,
    height: u32,
    cell_size: Fixed,
    /// Cells stored in row-major order.
    cells: Vec<GridCell>,
}

impl BattleGrid {
    /// Create an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or if `cell_size` is not positive.
    /// Use [`BattleGrid::from_config`] for checked construction.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: Fixed) -> Self {
        assert!(width > 0, "BattleGrid width must be positive");
        assert!(height > 0, "BattleGrid height must be positive");
        assert!(cell_size > Fixed::ZERO, "BattleGrid cell_size must be positive");

        let half = cell_size / Fixed::from_num(2);
        let cells = (0..height)
            .flat_map(|row| (0..width).map(move |col| (col, row)))
            .map(|(col, row)| GridCell {
                col,
                row,
                center: Vec2Fixed::new(
                    Fixed::from_num(col) * cell_size + half,
                    Fixed::from_num(row) * cell_size + half,
                ),
                occupant: None,
            })
            .collect();

        Self {
            width,
            height,
            cell_size,
            cells,
        }
    }

    /// Create an empty grid sized by a validated config.
    pub fn from_config(config: &CombatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.grid_width,
            config.grid_height,
            config.cell_size,
        ))
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    #[inline]
    fn index(&self, col: u32, row: u32) -> Option<usize> {
        self.in_bounds(col, row)
            .then(|| (row as usize) * (self.width as usize) + (col as usize))
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, col: u32, row: u32) -> bool {
        col < self.width && row < self.height
    }

    /// Get the cell at coordinates, or `None` if out of range.
    #[must_use]
    pub fn cell_at(&self, col: u32, row: u32) -> Option<&GridCell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    /// Convert a world position to the cell containing it.
    ///
    /// Returns `None` if the position lies outside the grid's world extent.
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2Fixed) -> Option<CellCoord> {
        if pos.x < Fixed::ZERO || pos.y < Fixed::ZERO {
            return None;
        }

        let col = pos.x.checked_div(self.cell_size)?.to_num::<i64>();
        let row = pos.y.checked_div(self.cell_size)?.to_num::<i64>();

        if col < self.width as i64 && row < self.height as i64 {
            Some((col as u32, row as u32))
        } else {
            None
        }
    }

    /// Convert grid coordinates to the world position of the cell center.
    ///
    /// Total: coordinates outside the grid extrapolate along the same lattice,
    /// saturating at the fixed-point range.
    #[must_use]
    pub fn grid_to_world(&self, col: u32, row: u32) -> Vec2Fixed {
        if let Some(cell) = self.cell_at(col, row) {
            return cell.center;
        }
        let half = self.cell_size / Fixed::from_num(2);
        let axis = |n: u32| {
            Fixed::saturating_from_num(n)
                .saturating_mul(self.cell_size)
                .saturating_add(half)
        };
        Vec2Fixed::new(axis(col), axis(row))
    }

    /// Put a unit into a cell.
    ///
    /// Returns `false` without touching the grid if the cell is out of range
    /// or already occupied.
    pub fn place(&mut self, col: u32, row: u32, id: UnitId) -> bool {
        match self.index(col, row) {
            Some(i) if self.cells[i].occupant.is_none() => {
                self.cells[i].occupant = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Clear a cell. No-op if it is already empty or out of range.
    pub fn remove(&mut self, col: u32, row: u32) {
        if let Some(i) = self.index(col, row) {
            self.cells[i].occupant = None;
        }
    }

    /// Check if a cell holds a unit. Out-of-range cells are never occupied.
    #[must_use]
    pub fn is_occupied(&self, col: u32, row: u32) -> bool {
        self.occupant(col, row).is_some()
    }

    /// The unit standing in a cell.
    #[must_use]
    pub fn occupant(&self, col: u32, row: u32) -> Option<UnitId> {
        self.cell_at(col, row).and_then(|c| c.occupant)
    }

    /// Locate the cell holding a unit.
    #[must_use]
    pub fn find(&self, id: UnitId) -> Option<CellCoord> {
        self.cells
            .iter()
            .find(|c| c.occupant == Some(id))
            .map(|c| (c.col, c.row))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Which half of the board a row belongs to.
    #[must_use]
    pub fn half_of(&self, row: u32) -> Half {
        if row < self.height / 2 {
            Half::Near
        } else {
            Half::Far
        }
    }

    /// Coordinates of every cell in one half, row-major.
    #[must_use]
    pub fn cells_in_half(&self, half: Half) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|c| self.half_of(c.row) == half)
            .map(|c| (c.col, c.row))
            .collect()
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.occupant = None;
        }
    }

    /// Check a placement request, reporting why it would fail.
    pub(crate) fn check_placement(&self, col: u32, row: u32) -> Result<()> {
        if !self.in_bounds(col, row) {
            return Err(CombatError::OutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            });
        }
        match self.occupant(col, row) {
            Some(occupant) => Err(CombatError::CellOccupied { col, row, occupant }),
            None => Ok(()),
        }
    }
}

impl Default for BattleGrid {
    /// The reference 8x8 board with unit-sized cells.
    fn default() -> Self {
        Self::new(8, 8, Fixed::ONE)
    }
}
