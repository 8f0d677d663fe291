#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Conservative platformer reachability validator.
//!
//! Builds two derived masks over a [`SemanticGrid`] — *standable* and
//! *clearance* — and runs a breadth-first search over the movement graph
//! they induce to decide whether a goal position is reachable from a start
//! position under a [`PlayerSpec`].

use std::collections::{HashSet, VecDeque};

use levelforge_core::{Cell, PlayerSpec, Pos, ReachabilityReport, SemanticGrid, GRID_HEIGHT, GRID_WIDTH};

const W: i32 = GRID_WIDTH as i32;
const H: i32 = GRID_HEIGHT as i32;

/// Validates grid traversability under a configured [`PlayerSpec`].
#[derive(Clone, Copy, Debug)]
pub struct ReachabilityValidator {
    spec: PlayerSpec,
}

impl ReachabilityValidator {
    /// Creates a validator for the given movement spec.
    #[must_use]
    pub const fn new(spec: PlayerSpec) -> Self {
        ReachabilityValidator { spec }
    }

    /// Returns the standable mask: `mask[y][x]` is `true` iff `(x, y + 1)`
    /// carries `SOLID` or `ONEWAY` and `(x, y)` carries neither `SOLID` nor
    /// `HAZARD`. The bottom row is never standable.
    #[must_use]
    pub fn compute_standable_mask(&self, grid: &SemanticGrid) -> Vec<Vec<bool>> {
        let surface = Cell::SOLID | Cell::ONEWAY;
        let bad_feet = Cell::SOLID | Cell::HAZARD;
        let mut mask = vec![vec![false; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        for y in 0..H - 1 {
            for x in 0..W {
                let below = cell_at(grid, x, y + 1);
                let here = cell_at(grid, x, y);
                if below.intersects(surface) && !here.intersects(bad_feet) {
                    mask[y as usize][x as usize] = true;
                }
            }
        }
        mask
    }

    /// Returns the clearance mask: `mask[y][x]` is `true` iff every row from
    /// `y` up to `y - height + 1` is in-bounds and `SOLID`-free.
    #[must_use]
    pub fn compute_clearance_mask(&self, grid: &SemanticGrid) -> Vec<Vec<bool>> {
        let height = self.spec.height;
        let mut mask = vec![vec![false; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        for y in 0..H {
            for x in 0..W {
                let mut ok = true;
                for dh in 0..height {
                    let ny = y - dh;
                    if ny < 0 || cell_at(grid, x, ny).intersects(Cell::SOLID) {
                        ok = false;
                        break;
                    }
                }
                mask[y as usize][x as usize] = ok;
            }
        }
        mask
    }

    /// Determines whether `goal` is reachable from `start` on `grid`.
    ///
    /// When `start`/`goal` are `None`, the first cell (row-major) carrying
    /// `START`/`GOAL` is used. The returned report's `reasons` are non-empty
    /// whenever `reachable` is `false`.
    #[must_use]
    pub fn validate(
        &self,
        grid: &SemanticGrid,
        start: Option<Pos>,
        goal: Option<Pos>,
    ) -> ReachabilityReport {
        let mut reasons = Vec::new();
        let start = start.or_else(|| find_flag(grid, Cell::START));
        let goal = goal.or_else(|| find_flag(grid, Cell::GOAL));

        if start.is_none() {
            reasons.push("No START marker found".to_string());
        }
        if goal.is_none() {
            reasons.push("No GOAL marker found".to_string());
        }
        if !reasons.is_empty() {
            return ReachabilityReport::unreachable(reasons);
        }
        let start = start.expect("checked above");
        let goal = goal.expect("checked above");

        let standable = self.compute_standable_mask(grid);
        let clearance = self.compute_clearance_mask(grid);
        let valid = combine(&standable, &clearance);

        if !valid_at(&valid, start) {
            reasons.push(format!(
                "START ({}, {}) is not a valid standing position",
                start.0, start.1
            ));
        }
        if !valid_at(&valid, goal) {
            reasons.push(format!(
                "GOAL ({}, {}) is not a valid standing position",
                goal.0, goal.1
            ));
        }
        if !reasons.is_empty() {
            return ReachabilityReport::unreachable(reasons);
        }

        match self.shortest_path(grid, &valid, start, goal) {
            Some(path) => {
                let jump_count = count_jumps(&path);
                let min_landing_width = min_landing_width(&valid, &path);
                ReachabilityReport::reachable(path.len() as i32, jump_count, min_landing_width)
            }
            None => ReachabilityReport::unreachable(self.diagnose(grid, &valid, start, goal)),
        }
    }

    /// Returns every position reachable from `start` on `grid`'s movement
    /// graph, ignoring whether `start` is itself the flagged START cell.
    /// Used by seam detection during region refinement.
    #[must_use]
    pub fn reachable_set(&self, grid: &SemanticGrid, start: Pos) -> HashSet<Pos> {
        let standable = self.compute_standable_mask(grid);
        let clearance = self.compute_clearance_mask(grid);
        let valid = combine(&standable, &clearance);

        let mut visited = HashSet::new();
        let _ = visited.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for next in self.neighbors(grid, &valid, pos) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    fn shortest_path(
        &self,
        grid: &SemanticGrid,
        valid: &[Vec<bool>],
        start: Pos,
        goal: Pos,
    ) -> Option<Vec<Pos>> {
        let mut parent: std::collections::HashMap<Pos, Option<Pos>> = std::collections::HashMap::new();
        let _ = parent.insert(start, None);
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cur) = queue.pop_front() {
            if cur == goal {
                return Some(reconstruct(&parent, goal));
            }
            for next in self.neighbors(grid, valid, cur) {
                if !parent.contains_key(&next) {
                    let _ = parent.insert(next, Some(cur));
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn neighbors(&self, grid: &SemanticGrid, valid: &[Vec<bool>], pos: Pos) -> Vec<Pos> {
        let (x1, y1) = pos;
        let spec = &self.spec;
        let mut out = Vec::new();
        for dx in -spec.max_jump_distance..=spec.max_jump_distance {
            for dy in -spec.max_jump_height..=spec.max_safe_drop {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (x2, y2) = (x1 + dx, y1 + dy);
                if x2 < 0 || x2 >= W || y2 < 0 || y2 >= H {
                    continue;
                }
                if !valid_at(valid, (x2, y2)) {
                    continue;
                }
                if self.corridor_ok(grid, x1, y1, x2, y2) {
                    out.push((x2, y2));
                }
            }
        }
        out
    }

    /// Conservative linear sweep: rejects the move if any sampled body
    /// column along the path from `(x1, y1)` to `(x2, y2)` intersects a
    /// `SOLID` tile. For very steep jumps (`|dy| >> |dx|`), the
    /// column-stepping sweep skips rows between samples; this is an
    /// under-approximation inherited unchanged from the reference
    /// behaviour, not a bug to be fixed here.
    fn corridor_ok(&self, grid: &SemanticGrid, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let height = self.spec.height;
        let body_clear = |ix: i32, iy: i32| -> bool {
            for dh in 0..height {
                let cy = iy - dh;
                if cy >= 0 && cy < H && ix >= 0 && ix < W && cell_at(grid, ix, cy).intersects(Cell::SOLID) {
                    return false;
                }
            }
            true
        };

        let dx = x2 - x1;
        if dx == 0 {
            let (lo, hi) = (y1.min(y2), y1.max(y2));
            for cy in lo..=hi {
                if !body_clear(x1, cy) {
                    return false;
                }
            }
            return true;
        }

        let step = if dx > 0 { 1 } else { -1 };
        let mut ix = x1;
        loop {
            let t = (ix - x1) as f64 / dx as f64;
            let iy = (y1 as f64 + t * (y2 - y1) as f64).round() as i32;
            if !body_clear(ix, iy) {
                return false;
            }
            if ix == x2 {
                break;
            }
            ix += step;
        }
        true
    }

    fn diagnose(&self, grid: &SemanticGrid, valid: &[Vec<bool>], start: Pos, goal: Pos) -> Vec<String> {
        let mut visited = HashSet::new();
        let _ = visited.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for next in self.neighbors(grid, valid, pos) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let mut msgs = vec![
            format!(
                "GOAL ({}, {}) unreachable from START ({}, {})",
                goal.0, goal.1, start.0, start.1
            ),
            format!("{} valid position(s) reachable from START", visited.len()),
        ];

        let h_gap = (goal.0 - start.0).abs();
        let v_up = start.1 - goal.1;
        let v_dn = goal.1 - start.1;
        if h_gap > self.spec.max_jump_distance {
            msgs.push(format!(
                "Horizontal gap ~{h_gap} > max_jump_distance {}",
                self.spec.max_jump_distance
            ));
        }
        if v_up > self.spec.max_jump_height {
            msgs.push(format!(
                "Height gain ~{v_up} > max_jump_height {}",
                self.spec.max_jump_height
            ));
        }
        if v_dn > self.spec.max_safe_drop {
            msgs.push(format!(
                "Drop ~{v_dn} > max_safe_drop {}",
                self.spec.max_safe_drop
            ));
        }
        msgs
    }
}

fn cell_at(grid: &SemanticGrid, x: i32, y: i32) -> Cell {
    grid.get(x, y).expect("coordinates are bounds-checked by the caller's 0..WIDTH/0..HEIGHT loop")
}

fn combine(standable: &[Vec<bool>], clearance: &[Vec<bool>]) -> Vec<Vec<bool>> {
    standable
        .iter()
        .zip(clearance.iter())
        .map(|(srow, crow)| srow.iter().zip(crow.iter()).map(|(s, c)| *s && *c).collect())
        .collect()
}

fn valid_at(valid: &[Vec<bool>], pos: Pos) -> bool {
    let (x, y) = pos;
    if x < 0 || y < 0 || x >= W || y >= H {
        return false;
    }
    valid[y as usize][x as usize]
}

fn find_flag(grid: &SemanticGrid, flag: Cell) -> Option<Pos> {
    for y in 0..H {
        for x in 0..W {
            if cell_at(grid, x, y).intersects(flag) {
                return Some((x, y));
            }
        }
    }
    None
}

fn reconstruct(parent: &std::collections::HashMap<Pos, Option<Pos>>, goal: Pos) -> Vec<Pos> {
    let mut path = Vec::new();
    let mut node = Some(goal);
    while let Some(p) = node {
        path.push(p);
        node = *parent.get(&p).expect("every visited node has a parent entry");
    }
    path.reverse();
    path
}

/// Number of consecutive-edge pairs along `path` with `dy != 0` or
/// `|dx| > 1` — i.e. moves that aren't a simple floor-level step.
fn count_jumps(path: &[Pos]) -> i32 {
    path.windows(2)
        .filter(|pair| {
            let (a, b) = (pair[0], pair[1]);
            b.1 != a.1 || (b.0 - a.0).abs() > 1
        })
        .count() as i32
}

/// Minimum horizontal run of valid cells at any path node's row.
///
/// This is computed only at path nodes, not along traversed rows between
/// jumps, which may report optimistic widths for paths that pass through
/// narrow rows only via jumps. Preserved unchanged from the reference
/// behaviour.
fn min_landing_width(valid: &[Vec<bool>], path: &[Pos]) -> i32 {
    let mut min_w = W;
    for &(x, y) in path {
        let row = &valid[y as usize];
        let mut lo = x;
        let mut hi = x;
        while lo > 0 && row[(lo - 1) as usize] {
            lo -= 1;
        }
        while hi < W - 1 && row[(hi + 1) as usize] {
            hi += 1;
        }
        min_w = min_w.min(hi - lo + 1);
    }
    min_w
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelforge_core::ApplyMode;

    fn floor_grid() -> SemanticGrid {
        let mut grid = SemanticGrid::new();
        grid.apply_rect(0, 31, 32, 1, Cell::SOLID, ApplyMode::Overwrite);
        grid
    }

    #[test]
    fn missing_markers_report_reasons() {
        let grid = SemanticGrid::new();
        let validator = ReachabilityValidator::new(PlayerSpec::default());
        let report = validator.validate(&grid, None, None);
        assert!(!report.reachable);
        assert_eq!(report.reasons.len(), 2);
    }

    #[test]
    fn adjacent_standing_cells_are_reachable() {
        let mut grid = floor_grid();
        grid.set(2, 30, Cell::START).unwrap();
        grid.set(3, 30, Cell::GOAL).unwrap();
        let validator = ReachabilityValidator::new(PlayerSpec::default());
        let report = validator.validate(&grid, None, None);
        assert!(report.reachable);
        assert_eq!(report.path_length, 2);
        assert_eq!(report.jump_count, 0);
    }

    #[test]
    fn hazard_gap_is_traversable_by_jump() {
        let mut grid = floor_grid();
        grid.apply_rect(14, 30, 3, 1, Cell::HAZARD, ApplyMode::Overwrite);
        grid.set(2, 30, Cell::START).unwrap();
        grid.set(28, 30, Cell::GOAL).unwrap();
        let spec = PlayerSpec::new(4, 5, 6);
        let validator = ReachabilityValidator::new(spec);
        let report = validator.validate(&grid, None, None);
        assert!(report.reachable);
        assert!(report.jump_count >= 1);
    }

    #[test]
    fn wall_blocks_path() {
        let mut grid = floor_grid();
        grid.apply_rect(14, 30, 3, 1, Cell::HAZARD, ApplyMode::Overwrite);
        grid.apply_rect(15, 1, 1, 30, Cell::SOLID, ApplyMode::Add);
        grid.set(2, 30, Cell::START).unwrap();
        grid.set(28, 30, Cell::GOAL).unwrap();
        let spec = PlayerSpec::new(4, 5, 6);
        let validator = ReachabilityValidator::new(spec);
        let report = validator.validate(&grid, None, None);
        assert!(!report.reachable);
        assert!(!report.reasons.is_empty());
    }

    #[test]
    fn three_stepped_platforms_require_several_jumps() {
        let mut grid = floor_grid();
        grid.apply_rect(5, 27, 6, 1, Cell::SOLID, ApplyMode::Overwrite);
        grid.apply_rect(13, 23, 6, 1, Cell::SOLID, ApplyMode::Overwrite);
        grid.apply_rect(21, 19, 6, 1, Cell::SOLID, ApplyMode::Overwrite);
        grid.set(2, 30, Cell::START).unwrap();
        grid.set(25, 18, Cell::GOAL).unwrap();
        let spec = PlayerSpec::default();
        let validator = ReachabilityValidator::new(spec);
        let report = validator.validate(&grid, None, None);
        assert!(report.reachable);
        assert!(report.jump_count >= 3);
    }
}
