use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::CoreError;

/// Fixed grid width in columns.
pub const GRID_WIDTH: u32 = 32;
/// Fixed grid height in rows.
pub const GRID_HEIGHT: u32 = 32;

const CELL_COUNT: usize = (GRID_WIDTH * GRID_HEIGHT) as usize;

/// How [`SemanticGrid::apply_rect`] combines new flags with existing cell
/// contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Replace the cell's contents with `flags`.
    Overwrite,
    /// OR `flags` into the cell's existing contents.
    Add,
    /// Clear `flags` from the cell's existing contents.
    Remove,
}

/// Fixed 32×32 row-major grid of semantic tile flags.
///
/// Coordinates `(x, y)` have `y` increasing downward; row 0 is the top.
/// `SemanticGrid` owns its cell storage exclusively — every copy is deep and
/// independent, and equality is a byte-exact comparison of all 1024 cells.
#[derive(Clone, PartialEq, Eq)]
pub struct SemanticGrid {
    cells: Box<[Cell; CELL_COUNT]>,
}

impl Default for SemanticGrid {
    fn default() -> Self {
        SemanticGrid {
            cells: Box::new([Cell::EMPTY; CELL_COUNT]),
        }
    }
}

/// Wire format for a serialized [`SemanticGrid`]: `cells` is the base64
/// encoding of the 1024 raw cell bytes, row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedGrid {
    /// Always 32; mismatches fail deserialization.
    pub width: u32,
    /// Always 32; mismatches fail deserialization.
    pub height: u32,
    /// Base64 encoding of the 1024 raw cell bytes.
    pub cells: String,
}

impl SemanticGrid {
    /// Returns a new, entirely empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(x: i32, y: i32) -> Result<usize, CoreError> {
        if x < 0 || y < 0 || x >= GRID_WIDTH as i32 || y >= GRID_HEIGHT as i32 {
            return Err(CoreError::OutOfBounds {
                x,
                y,
                width: GRID_WIDTH,
                height: GRID_HEIGHT,
            });
        }
        Ok((y as usize) * (GRID_WIDTH as usize) + (x as usize))
    }

    /// Returns the cell at `(x, y)`. Fails with [`CoreError::OutOfBounds`]
    /// when `x` or `y` is outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Result<Cell, CoreError> {
        Ok(self.cells[Self::index(x, y)?])
    }

    /// Overwrites the cell at `(x, y)` with `flags`. Fails with
    /// [`CoreError::OutOfBounds`] when `x` or `y` is outside the grid.
    pub fn set(&mut self, x: i32, y: i32, flags: Cell) -> Result<(), CoreError> {
        let idx = Self::index(x, y)?;
        self.cells[idx] = flags;
        Ok(())
    }

    /// ORs `flags` into the cell at `(x, y)`. Fails with
    /// [`CoreError::OutOfBounds`] when `x` or `y` is outside the grid.
    pub fn add_flags(&mut self, x: i32, y: i32, flags: Cell) -> Result<(), CoreError> {
        let idx = Self::index(x, y)?;
        self.cells[idx] |= flags;
        Ok(())
    }

    /// Clears `flags` from the cell at `(x, y)`. Fails with
    /// [`CoreError::OutOfBounds`] when `x` or `y` is outside the grid.
    pub fn remove_flags(&mut self, x: i32, y: i32, flags: Cell) -> Result<(), CoreError> {
        let idx = Self::index(x, y)?;
        self.cells[idx] = self.cells[idx] & !flags;
        Ok(())
    }

    /// Sets every cell in the grid to `flags`.
    pub fn fill(&mut self, flags: Cell) {
        self.cells.fill(flags);
    }

    /// Zeroes every cell in the grid. Equivalent to `fill(Cell::EMPTY)`.
    pub fn clear(&mut self) {
        self.fill(Cell::EMPTY);
    }

    /// Returns a deep, independent copy of this grid.
    #[must_use]
    pub fn copy(&self) -> SemanticGrid {
        self.clone()
    }

    /// Applies `flags` to the rectangle with top-left `(x, y)`, width `w`,
    /// height `h`, combined according to `mode`.
    ///
    /// Cells outside the 32×32 boundary are silently skipped; this never
    /// fails, even when the rectangle extends entirely past the grid.
    pub fn apply_rect(&mut self, x: i32, y: i32, w: i32, h: i32, flags: Cell, mode: ApplyMode) {
        for ry in y..y.saturating_add(h) {
            for rx in x..x.saturating_add(w) {
                if rx < 0 || ry < 0 || rx >= GRID_WIDTH as i32 || ry >= GRID_HEIGHT as i32 {
                    continue;
                }
                let idx = (ry as usize) * (GRID_WIDTH as usize) + (rx as usize);
                self.cells[idx] = match mode {
                    ApplyMode::Overwrite => flags,
                    ApplyMode::Add => self.cells[idx] | flags,
                    ApplyMode::Remove => self.cells[idx] & !flags,
                };
            }
        }
    }

    /// Serializes this grid into the wire format: `{width, height, cells}`
    /// with `cells` base64-encoded, row-major, one byte per cell.
    #[must_use]
    pub fn to_serialized(&self) -> SerializedGrid {
        let raw: Vec<u8> = self.cells.iter().map(|c| c.bits()).collect();
        SerializedGrid {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            cells: STANDARD.encode(raw),
        }
    }

    /// Deserializes a grid from the wire format produced by
    /// [`SemanticGrid::to_serialized`]. Fails with
    /// [`CoreError::Serialization`] when `width`/`height` aren't 32, the
    /// base64 payload is malformed, or the decoded byte count isn't 1024.
    pub fn from_serialized(data: &SerializedGrid) -> Result<SemanticGrid, CoreError> {
        if data.width != GRID_WIDTH || data.height != GRID_HEIGHT {
            return Err(CoreError::Serialization(format!(
                "expected {GRID_WIDTH}x{GRID_HEIGHT} grid, got {}x{}",
                data.width, data.height
            )));
        }
        let raw = STANDARD
            .decode(&data.cells)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        if raw.len() != CELL_COUNT {
            return Err(CoreError::Serialization(format!(
                "expected {CELL_COUNT} bytes, got {}",
                raw.len()
            )));
        }
        let mut cells = Box::new([Cell::EMPTY; CELL_COUNT]);
        for (slot, byte) in cells.iter_mut().zip(raw.iter()) {
            *slot = Cell::from_bits_truncate(*byte);
        }
        Ok(SemanticGrid { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut grid = SemanticGrid::new();
        grid.set(3, 4, Cell::SOLID).unwrap();
        assert_eq!(grid.get(3, 4).unwrap(), Cell::SOLID);
    }

    #[test]
    fn out_of_bounds_fails() {
        let grid = SemanticGrid::new();
        assert!(grid.get(-1, 0).is_err());
        assert!(grid.get(0, GRID_HEIGHT as i32).is_err());
    }

    #[test]
    fn add_and_remove_flags() {
        let mut grid = SemanticGrid::new();
        grid.add_flags(0, 0, Cell::SOLID).unwrap();
        grid.add_flags(0, 0, Cell::HAZARD).unwrap();
        assert!(grid.get(0, 0).unwrap().contains(Cell::SOLID | Cell::HAZARD));
        grid.remove_flags(0, 0, Cell::HAZARD).unwrap();
        let cell = grid.get(0, 0).unwrap();
        assert!(cell.contains(Cell::SOLID));
        assert!(!cell.intersects(Cell::HAZARD));
    }

    #[test]
    fn copy_is_independent() {
        let grid = SemanticGrid::new();
        let mut other = grid.copy();
        other.set(1, 1, Cell::SOLID).unwrap();
        assert_eq!(grid.get(1, 1).unwrap(), Cell::EMPTY);
        assert_ne!(grid, other);
    }

    #[test]
    fn apply_rect_clips_silently() {
        let mut grid = SemanticGrid::new();
        grid.apply_rect(30, 30, 10, 10, Cell::SOLID, ApplyMode::Overwrite);
        assert_eq!(grid.get(31, 31).unwrap(), Cell::SOLID);
        // Nothing panicked, and cells that would be out of bounds were skipped.
    }

    #[test]
    fn apply_rect_modes() {
        let mut grid = SemanticGrid::new();
        grid.apply_rect(0, 0, 2, 2, Cell::SOLID, ApplyMode::Overwrite);
        grid.apply_rect(0, 0, 2, 2, Cell::HAZARD, ApplyMode::Add);
        assert!(grid.get(0, 0).unwrap().contains(Cell::SOLID | Cell::HAZARD));
        grid.apply_rect(0, 0, 2, 2, Cell::SOLID, ApplyMode::Remove);
        let cell = grid.get(0, 0).unwrap();
        assert!(!cell.intersects(Cell::SOLID));
        assert!(cell.intersects(Cell::HAZARD));
    }

    #[test]
    fn serialization_round_trip() {
        let mut grid = SemanticGrid::new();
        grid.set(5, 5, Cell::START).unwrap();
        grid.set(26, 26, Cell::GOAL).unwrap();
        let serialized = grid.to_serialized();
        let restored = SemanticGrid::from_serialized(&serialized).unwrap();
        assert_eq!(grid, restored);
    }

    #[test]
    fn serialization_rejects_bad_dimensions() {
        let bad = SerializedGrid {
            width: 31,
            height: 32,
            cells: String::new(),
        };
        assert!(matches!(
            SemanticGrid::from_serialized(&bad),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn serialization_rejects_bad_length() {
        let bad = SerializedGrid {
            width: 32,
            height: 32,
            cells: STANDARD.encode([0u8; 10]),
        };
        assert!(matches!(
            SemanticGrid::from_serialized(&bad),
            Err(CoreError::Serialization(_))
        ));
    }
}
