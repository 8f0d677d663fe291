#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maps a [`SemanticGrid`] to a 32×32 tile-ID grid for rendering/export.
//!
//! Precedence per cell, highest to lowest: `SOLID` (optionally autotiled via
//! a 4-neighbor bitmask), `HAZARD`, `ONEWAY`, `LADDER`, `GOAL` (if
//! `goal_marker != 0`), `START` (if `start_marker != 0`), otherwise empty.

use std::collections::HashMap;

use levelforge_core::{Cell, SemanticGrid, GRID_HEIGHT, GRID_WIDTH};

const W: i32 = GRID_WIDTH as i32;
const H: i32 = GRID_HEIGHT as i32;

/// North neighbor (`y - 1`) is `SOLID`.
pub const NEIGHBOR_N: u8 = 0b0001;
/// East neighbor (`x + 1`) is `SOLID`.
pub const NEIGHBOR_E: u8 = 0b0010;
/// South neighbor (`y + 1`) is `SOLID`.
pub const NEIGHBOR_S: u8 = 0b0100;
/// West neighbor (`x - 1`) is `SOLID`.
pub const NEIGHBOR_W: u8 = 0b1000;

/// Tile-ID mapping consumed by [`SemanticToTilemap`].
///
/// `solid_variants` maps a 4-neighbor `SOLID` bitmask (`0..=15`, built from
/// [`NEIGHBOR_N`]/[`NEIGHBOR_E`]/[`NEIGHBOR_S`]/[`NEIGHBOR_W`]) to a tile ID.
/// Leave it empty to disable autotiling; every `SOLID` cell then maps to
/// `solid_base`. A bitmask absent from a non-empty table also falls back to
/// `solid_base`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileIds {
    /// Used for every `SOLID` cell when `solid_variants` is empty, and as
    /// the fallback for any bitmask missing from it.
    pub solid_base: i32,
    /// 4-neighbor bitmask → tile ID. Empty disables autotiling.
    pub solid_variants: HashMap<u8, i32>,
    /// Tile ID for `ONEWAY` cells.
    pub oneway: i32,
    /// Tile ID for `HAZARD` cells.
    pub hazard: i32,
    /// Tile ID for `LADDER` cells.
    pub ladder: i32,
    /// Tile ID for `START` cells. `0` leaves them rendered as empty.
    pub start_marker: i32,
    /// Tile ID for `GOAL` cells. `0` leaves them rendered as empty.
    pub goal_marker: i32,
    /// Tile ID for cells carrying no flags.
    pub empty: i32,
}

impl Default for TileIds {
    fn default() -> Self {
        TileIds {
            solid_base: 1,
            solid_variants: HashMap::new(),
            oneway: 2,
            hazard: 3,
            ladder: 4,
            start_marker: 0,
            goal_marker: 0,
            empty: 0,
        }
    }
}

/// Converts a [`SemanticGrid`] into a row-major 32×32 tile-ID grid.
#[derive(Clone, Debug)]
pub struct SemanticToTilemap {
    tile_ids: TileIds,
}

impl SemanticToTilemap {
    /// Creates a mapper with the given tile IDs.
    #[must_use]
    pub fn new(tile_ids: TileIds) -> Self {
        SemanticToTilemap { tile_ids }
    }

    /// Returns `result[y][x]`, the tile ID at column `x`, row `y`.
    #[must_use]
    pub fn convert(&self, grid: &SemanticGrid) -> Vec<Vec<i32>> {
        let mut result = vec![vec![self.tile_ids.empty; W as usize]; H as usize];
        for y in 0..H {
            for x in 0..W {
                result[y as usize][x as usize] = self.resolve(grid, x, y);
            }
        }
        result
    }

    /// Returns the 4-neighbor `SOLID` bitmask for `(x, y)`. Out-of-bounds
    /// neighbors count as `SOLID`, so edge cells don't read as unbordered.
    #[must_use]
    pub fn neighbor_mask(&self, grid: &SemanticGrid, x: i32, y: i32) -> u8 {
        let is_solid = |nx: i32, ny: i32| -> bool {
            if nx < 0 || nx >= W || ny < 0 || ny >= H {
                return true;
            }
            grid.get(nx, ny)
                .map(|c| c.intersects(Cell::SOLID))
                .unwrap_or(true)
        };

        let mut mask = 0u8;
        if is_solid(x, y - 1) {
            mask |= NEIGHBOR_N;
        }
        if is_solid(x + 1, y) {
            mask |= NEIGHBOR_E;
        }
        if is_solid(x, y + 1) {
            mask |= NEIGHBOR_S;
        }
        if is_solid(x - 1, y) {
            mask |= NEIGHBOR_W;
        }
        mask
    }

    fn resolve(&self, grid: &SemanticGrid, x: i32, y: i32) -> i32 {
        let flags = grid.get(x, y).expect("0..W, 0..H are in-bounds");
        let t = &self.tile_ids;

        if flags.intersects(Cell::SOLID) {
            return self.solid_tile(grid, x, y);
        }
        if flags.intersects(Cell::HAZARD) {
            return t.hazard;
        }
        if flags.intersects(Cell::ONEWAY) {
            return t.oneway;
        }
        if flags.intersects(Cell::LADDER) {
            return t.ladder;
        }
        if flags.intersects(Cell::GOAL) && t.goal_marker != 0 {
            return t.goal_marker;
        }
        if flags.intersects(Cell::START) && t.start_marker != 0 {
            return t.start_marker;
        }
        t.empty
    }

    fn solid_tile(&self, grid: &SemanticGrid, x: i32, y: i32) -> i32 {
        let t = &self.tile_ids;
        if t.solid_variants.is_empty() {
            return t.solid_base;
        }
        let mask = self.neighbor_mask(grid, x, y);
        t.solid_variants.get(&mask).copied().unwrap_or(t.solid_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelforge_core::ApplyMode;

    #[test]
    fn precedence_favors_solid_over_hazard() {
        let mut grid = SemanticGrid::new();
        grid.set(0, 0, Cell::SOLID | Cell::HAZARD).unwrap();
        let mapper = SemanticToTilemap::new(TileIds::default());
        let tiles = mapper.convert(&grid);
        assert_eq!(tiles[0][0], TileIds::default().solid_base);
    }

    #[test]
    fn empty_cell_maps_to_empty_tile() {
        let grid = SemanticGrid::new();
        let mapper = SemanticToTilemap::new(TileIds::default());
        let tiles = mapper.convert(&grid);
        assert_eq!(tiles[5][5], 0);
    }

    #[test]
    fn markers_default_to_empty_unless_configured() {
        let mut grid = SemanticGrid::new();
        grid.set(1, 1, Cell::START).unwrap();
        grid.set(2, 2, Cell::GOAL).unwrap();
        let mapper = SemanticToTilemap::new(TileIds::default());
        let tiles = mapper.convert(&grid);
        assert_eq!(tiles[1][1], 0);
        assert_eq!(tiles[2][2], 0);

        let configured = TileIds {
            start_marker: 9,
            goal_marker: 10,
            ..TileIds::default()
        };
        let mapper = SemanticToTilemap::new(configured);
        let tiles = mapper.convert(&grid);
        assert_eq!(tiles[1][1], 9);
        assert_eq!(tiles[2][2], 10);
    }

    #[test]
    fn neighbor_mask_treats_out_of_bounds_as_solid() {
        let grid = SemanticGrid::new();
        let mapper = SemanticToTilemap::new(TileIds::default());
        let mask = mapper.neighbor_mask(&grid, 0, 0);
        assert_eq!(mask & NEIGHBOR_N, NEIGHBOR_N);
        assert_eq!(mask & NEIGHBOR_W, NEIGHBOR_W);
    }

    #[test]
    fn autotile_variant_overrides_solid_base() {
        let mut grid = SemanticGrid::new();
        grid.apply_rect(0, 0, 3, 1, Cell::SOLID, ApplyMode::Overwrite);
        let mut variants = HashMap::new();
        let _ = variants.insert(NEIGHBOR_E | NEIGHBOR_W, 42);
        let tile_ids = TileIds {
            solid_variants: variants,
            ..TileIds::default()
        };
        let mapper = SemanticToTilemap::new(tile_ids);
        let tiles = mapper.convert(&grid);
        assert_eq!(tiles[0][1], 42);
    }
}
