#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Foothold-chain level generator.
//!
//! Places a sequence of [`Foothold`]s left-to-right across the grid,
//! enforcing forward progress toward the goal column, clearance
//! non-conflict between footholds, and bounded jump geometry, then
//! materialises the chain into a [`SemanticGrid`] and re-validates it with
//! [`ReachabilityValidator`]. Retries with a fresh seed up to
//! [`MAX_OUTER`] times.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use levelforge_core::{
    ApplyMode, Cell, CoreError, Foothold, GenerationResult, GeneratorKnobs, PlayerSpec,
    SemanticGrid, GRID_HEIGHT, GRID_WIDTH,
};
use levelforge_system_reachability::ReachabilityValidator;

const W: i32 = GRID_WIDTH as i32;
const H: i32 = GRID_HEIGHT as i32;

/// Outer whole-level retries: each uses `seed + attempt` as its sub-seed.
pub const MAX_OUTER: u32 = 40;
/// Inner attempts per individual foothold placement.
pub const MAX_STEP: u32 = 50;
/// The last foothold's left edge must reach at least this column.
pub const GOAL_X_MIN: i32 = 26;

/// Produces a validated, traversable level from footholds.
#[derive(Clone, Copy, Debug)]
pub struct LevelGenerator {
    spec: PlayerSpec,
}

impl LevelGenerator {
    /// Creates a generator for the given movement spec.
    #[must_use]
    pub const fn new(spec: PlayerSpec) -> Self {
        LevelGenerator { spec }
    }

    /// Generates a validated level for `(seed, knobs, spec)`.
    ///
    /// Retries with `seed + attempt` up to [`MAX_OUTER`] times. Fails with
    /// [`CoreError::GenerationFailed`] if every attempt fails to produce a
    /// reachable grid. Repeated in-process calls with the same inputs yield
    /// byte-identical grids.
    pub fn generate(&self, seed: u64, knobs: GeneratorKnobs) -> Result<GenerationResult, CoreError> {
        let validator = ReachabilityValidator::new(self.spec);

        for attempt in 0..MAX_OUTER {
            let seed_used = seed.wrapping_add(u64::from(attempt));
            let mut rng = ChaCha8Rng::seed_from_u64(seed_used);
            let Some(footholds) = generate_footholds(&mut rng, &knobs, &self.spec) else {
                continue;
            };

            let grid = footholds_to_grid(&footholds, self.spec.height);
            let report = validator.validate(&grid, None, None);
            if report.reachable {
                return Ok(GenerationResult {
                    grid,
                    footholds,
                    report,
                    seed_used,
                    attempts: attempt + 1,
                });
            }
        }

        Err(CoreError::GenerationFailed {
            attempts: MAX_OUTER,
            seed_start: seed,
            seed_end: seed.wrapping_add(u64::from(MAX_OUTER)),
        })
    }
}

/// Ceiling of `(target_x - current_x) / steps_remaining`, clamped to
/// `[1, max_dx]`. Returns `1` once `current_x` already reaches `target_x`.
/// Shared with the region refiner, which drives its inner foothold chain
/// toward a different target column.
#[must_use]
pub fn min_dx_for_progress(current_x: i32, steps_remaining: i32, target_x: i32, max_dx: i32) -> i32 {
    let needed = target_x - current_x;
    if needed <= 0 || steps_remaining <= 0 {
        return 1;
    }
    let ceil_div = (needed + steps_remaining - 1) / steps_remaining;
    ceil_div.clamp(1, max_dx)
}

/// Returns `false` if `new_fh`'s surface falls inside any `existing`
/// foothold's clearance zone, or vice versa, for footholds whose columns
/// overlap. Shared with the region refiner.
#[must_use]
pub fn clearance_ok(existing: &[Foothold], new_fh: Foothold, height: i32) -> bool {
    let new_cols: Vec<i32> = new_fh.x_cols().collect();
    let new_clearance: Vec<i32> = new_fh.clearance_rows(height).collect();

    for fh in existing {
        let cols_overlap = fh.x_cols().any(|c| new_cols.contains(&c));
        if !cols_overlap {
            continue;
        }

        let fh_clearance = fh.clearance_rows(height);
        if fh_clearance.contains(&new_fh.surface_y()) {
            return false;
        }
        if new_clearance.contains(&fh.surface_y()) {
            return false;
        }
    }
    true
}

fn generate_footholds(
    rng: &mut ChaCha8Rng,
    knobs: &GeneratorKnobs,
    spec: &PlayerSpec,
) -> Option<Vec<Foothold>> {
    let n = knobs.target_foothold_count;
    let height = spec.height;

    let mid_y = H / 2;
    let y_lo = (height).max(mid_y - 5);
    let y_hi = (H - 3).min(mid_y + 5);
    let first_y = rng.gen_range(y_lo..=y_hi);
    let first_x = rng.gen_range(2..=5);
    let mut first_w = rng
        .gen_range(knobs.min_foothold_width..=knobs.max_foothold_width)
        .min(W - 1 - first_x);
    first_w = first_w.max(knobs.min_foothold_width);

    let mut footholds = vec![Foothold::new(first_x, first_y, first_w)];

    for i in 1..n {
        let prev = *footholds.last().expect("first foothold always present");
        let is_last = i == n - 1;
        let steps_remaining = n - i;

        let prog_min = min_dx_for_progress(prev.x, steps_remaining, GOAL_X_MIN, spec.max_jump_distance);
        let diff_min = (spec.max_jump_distance as f64 * 0.25 * knobs.difficulty).round() as i32;
        let min_dx = prog_min.max(diff_min).max(1).min(spec.max_jump_distance);

        let max_up = ((spec.max_jump_height as f64) * knobs.verticality).round().max(0.0) as i32;
        let max_down = ((spec.max_safe_drop as f64) * knobs.verticality).round().max(0.0) as i32;

        let eff_max_w = knobs.min_foothold_width.max(
            knobs.max_foothold_width
                - ((knobs.difficulty) * f64::from(knobs.max_foothold_width - knobs.min_foothold_width))
                    .round() as i32,
        );

        let mut placed = false;
        for _ in 0..MAX_STEP {
            let dx = rng.gen_range(min_dx..=spec.max_jump_distance);
            let dy = if max_up + max_down > 0 {
                rng.gen_range(-max_up..=max_down)
            } else {
                0
            };
            let w = rng.gen_range(knobs.min_foothold_width..=eff_max_w);
            let new_x = prev.x + dx;
            let new_y = prev.y + dy;

            if new_x < 1 || new_x + w - 1 > W - 2 {
                continue;
            }
            if new_y < height {
                continue;
            }
            if new_y + 1 > H - 2 {
                continue;
            }
            if is_last && new_x < GOAL_X_MIN {
                continue;
            }

            let candidate = Foothold::new(new_x, new_y, w);
            if !clearance_ok(&footholds, candidate, height) {
                continue;
            }

            footholds.push(candidate);
            placed = true;
            break;
        }

        if !placed {
            return None;
        }
    }

    Some(footholds)
}

/// Materialises a foothold chain into a [`SemanticGrid`].
///
/// Phase 1 paints a full-width safety floor at the bottom row. Phase 2 OR's
/// `SOLID` into each foothold's surface row. Phase 3 clears `SOLID` from
/// each foothold's clearance rows, never erasing another foothold's
/// surface. Phase 4 marks the centre of the first foothold `START` and the
/// centre of the last `GOAL`.
#[must_use]
pub fn footholds_to_grid(footholds: &[Foothold], player_height: i32) -> SemanticGrid {
    let mut grid = SemanticGrid::new();

    grid.apply_rect(0, H - 1, W, 1, Cell::SOLID, ApplyMode::Overwrite);

    let mut surface_cells = std::collections::HashSet::new();
    for fh in footholds {
        let sy = fh.surface_y();
        if sy < 0 || sy >= H {
            continue;
        }
        for x in fh.x_cols() {
            if x < 0 || x >= W {
                continue;
            }
            grid.add_flags(x, sy, Cell::SOLID).expect("bounds checked above");
            let _ = surface_cells.insert((x, sy));
        }
    }

    for fh in footholds {
        for x in fh.x_cols() {
            if x < 0 || x >= W {
                continue;
            }
            for row in fh.clearance_rows(player_height) {
                if row < 0 || row >= H || surface_cells.contains(&(x, row)) {
                    continue;
                }
                grid.remove_flags(x, row, Cell::SOLID).expect("bounds checked above");
            }
        }
    }

    let first = footholds.first().expect("generator always produces at least one foothold");
    let last = footholds.last().expect("generator always produces at least one foothold");
    grid.set(first.x + first.width / 2, first.y, Cell::START)
        .expect("first foothold center is in-bounds by construction");
    grid.set(last.x + last.width / 2, last.y, Cell::GOAL)
        .expect("last foothold center is in-bounds by construction");

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let generator = LevelGenerator::new(PlayerSpec::default());
        let knobs = GeneratorKnobs::default();
        let a = generator.generate(42, knobs).unwrap();
        let b = generator.generate(42, knobs).unwrap();
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn generated_levels_are_reachable() {
        let generator = LevelGenerator::new(PlayerSpec::default());
        let knobs = GeneratorKnobs::default();
        let result = generator.generate(42, knobs).unwrap();
        assert!(result.report.reachable);
    }

    #[test]
    fn foothold_count_matches_knobs() {
        let generator = LevelGenerator::new(PlayerSpec::default());
        let knobs = GeneratorKnobs {
            target_foothold_count: 9,
            min_foothold_width: 2,
            max_foothold_width: 5,
            verticality: 0.5,
            difficulty: 0.4,
        };
        let result = generator.generate(100, knobs).unwrap();
        assert_eq!(result.footholds.len(), 9);
    }

    #[test]
    fn first_and_last_foothold_bounds() {
        let generator = LevelGenerator::new(PlayerSpec::default());
        let knobs = GeneratorKnobs {
            target_foothold_count: 10,
            min_foothold_width: 2,
            max_foothold_width: 4,
            verticality: 0.9,
            difficulty: 0.7,
        };
        let result = generator.generate(777, knobs).unwrap();
        let first = result.footholds.first().unwrap();
        let last = result.footholds.last().unwrap();
        assert!((2..=5).contains(&first.x));
        assert!(last.x >= GOAL_X_MIN);
        assert!(result.report.path_length >= 2);
    }

    #[test]
    fn clearance_conflict_detected() {
        let a = Foothold::new(5, 10, 4);
        let b = Foothold::new(6, 9, 3);
        assert!(!clearance_ok(&[a], b, 2));
    }

    #[test]
    fn clearance_no_conflict_when_far_apart() {
        let a = Foothold::new(5, 10, 4);
        let b = Foothold::new(20, 10, 3);
        assert!(clearance_ok(&[a], b, 2));
    }
}
