#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Region-scoped re-synthesis: preserves everything outside a rectangle and
//! re-sculpts its interior.
//!
//! Detects boundary *seams* on the reachable set from START, regenerates
//! the interior foothold chain entry-to-exit confined to the rectangle,
//! optionally mutates silhouette/secret-platform structure, and
//! re-validates full-level reachability. Retries with a fresh seed up to
//! [`MAX_INNER`] times; on total failure the caller still receives a valid,
//! independent grid copy of the original.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use levelforge_core::{
    Cell, Foothold, GeneratorKnobs, PlayerSpec, Pos, RefineRect, RefineReport, RefineRequest,
    SemanticGrid, GRID_HEIGHT, GRID_WIDTH,
};
use levelforge_system_generator::{clearance_ok, min_dx_for_progress, MAX_STEP};
use levelforge_system_reachability::ReachabilityValidator;

const W: i32 = GRID_WIDTH as i32;
const H: i32 = GRID_HEIGHT as i32;

/// Inner whole-rectangle retries: each uses `seed + attempt` as its
/// sub-seed.
pub const MAX_INNER: u32 = 30;

/// Regenerates the interior of a [`RefineRect`] while preserving everything
/// outside it.
#[derive(Clone, Copy, Debug)]
pub struct RegionRefiner {
    spec: PlayerSpec,
}

impl RegionRefiner {
    /// Creates a refiner for the given movement spec.
    #[must_use]
    pub const fn new(spec: PlayerSpec) -> Self {
        RegionRefiner { spec }
    }

    /// Refines `rect` within `grid`, producing a new grid and a report.
    ///
    /// On any failure path, the returned grid is `grid.copy()`: callers
    /// always receive a usable, independent grid.
    #[must_use]
    pub fn refine(
        &self,
        grid: &SemanticGrid,
        rect: RefineRect,
        request: RefineRequest,
        seed: u64,
        knobs: GeneratorKnobs,
    ) -> (SemanticGrid, RefineReport) {
        let validator = ReachabilityValidator::new(self.spec);

        let orig_report = validator.validate(grid, None, None);
        if !orig_report.reachable {
            return (
                grid.copy(),
                RefineReport {
                    reasons: vec!["Original grid is not reachable".to_string()],
                    reachability: Some(orig_report),
                    ..RefineReport::default()
                },
            );
        }

        let (seam_entry, seam_exit) = self.find_seams(grid, rect, &validator);
        let (Some(seam_entry), Some(seam_exit)) = (seam_entry, seam_exit) else {
            return (
                grid.copy(),
                RefineReport {
                    seam_entry,
                    seam_exit,
                    reasons: vec!["Could not detect seam points on rect boundary".to_string()],
                    reachability: Some(orig_report),
                    ..RefineReport::default()
                },
            );
        };

        let inner_knobs = apply_deltas(knobs, request);

        let orig_start = find_flag(grid, Cell::START);
        let orig_goal = find_flag(grid, Cell::GOAL);
        let start_inside = orig_start.is_some_and(|p| rect.contains(p.0, p.1));
        let goal_inside = orig_goal.is_some_and(|p| rect.contains(p.0, p.1));

        for attempt in 0..MAX_INNER {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(attempt)));

            let Some(inner_fhs) = self.generate_inner_footholds(
                &mut rng,
                &inner_knobs,
                rect,
                seam_entry,
                seam_exit,
            ) else {
                continue;
            };

            let mut new_grid = grid.copy();
            clear_rect(&mut new_grid, rect);
            paint_inner_footholds(&mut new_grid, &inner_fhs, rect, self.spec.height);

            if start_inside {
                let fh = inner_fhs[0];
                new_grid
                    .set(fh.x + fh.width / 2, fh.y, Cell::START)
                    .expect("entry foothold center is clipped to the rect, in-bounds");
            }
            if goal_inside {
                let fh = *inner_fhs.last().expect("chain always has at least the exit foothold");
                new_grid
                    .set(fh.x + fh.width / 2, fh.y, Cell::GOAL)
                    .expect("exit foothold center is clipped to the rect, in-bounds");
            }

            if request.add_secret {
                add_secret(&mut new_grid, &inner_fhs, rect, self.spec.height, &mut rng);
            }
            if request.smooth_silhouette {
                smooth_silhouette(&mut new_grid, rect);
            }

            let report = validator.validate(&new_grid, None, None);
            if report.reachable {
                return (
                    new_grid,
                    RefineReport {
                        success: true,
                        seam_entry: Some(seam_entry),
                        seam_exit: Some(seam_exit),
                        inner_footholds: inner_fhs.len() as i32,
                        reachability: Some(report),
                        reasons: Vec::new(),
                    },
                );
            }
        }

        (
            grid.copy(),
            RefineReport {
                seam_entry: Some(seam_entry),
                seam_exit: Some(seam_exit),
                reasons: vec![format!("All {MAX_INNER} refinement attempts failed")],
                reachability: Some(orig_report),
                ..RefineReport::default()
            },
        )
    }

    /// Detects the entry (left rect boundary) and exit (right rect
    /// boundary) seam cells: standable, rect-boundary cells lying on the
    /// reachable set from START on the unmodified grid.
    ///
    /// Preferred: nearest the rect's vertical midpoint on the left/right
    /// edges. Falls back to any reachable boundary cell (by x) when a
    /// preferred edge yields no candidates.
    fn find_seams(
        &self,
        grid: &SemanticGrid,
        rect: RefineRect,
        validator: &ReachabilityValidator,
    ) -> (Option<Pos>, Option<Pos>) {
        let Some(start) = find_flag(grid, Cell::START) else {
            return (None, None);
        };

        let reachable = validator.reachable_set(grid, start);
        let mid_y = (rect.y + rect.bottom()) / 2;

        let left_cands: Vec<Pos> = (rect.y..=rect.bottom())
            .map(|gy| (rect.x, gy))
            .filter(|p| reachable.contains(p))
            .collect();
        let right_cands: Vec<Pos> = (rect.y..=rect.bottom())
            .map(|gy| (rect.right(), gy))
            .filter(|p| reachable.contains(p))
            .collect();

        let mut seam_entry = nearest_to(&left_cands, mid_y);
        let mut seam_exit = nearest_to(&right_cands, mid_y);

        if seam_entry.is_none() || seam_exit.is_none() {
            let mut all_cands: HashSet<Pos> = left_cands.into_iter().chain(right_cands).collect();
            for gy in [rect.y, rect.bottom()] {
                for gx in rect.x..=rect.right() {
                    if reachable.contains(&(gx, gy)) {
                        let _ = all_cands.insert((gx, gy));
                    }
                }
            }
            let mut sorted: Vec<Pos> = all_cands.into_iter().collect();
            sorted.sort_by_key(|p| p.0);
            if !sorted.is_empty() {
                if seam_entry.is_none() {
                    seam_entry = sorted.first().copied();
                }
                if seam_exit.is_none() {
                    seam_exit = sorted.last().copied();
                }
            }
        }

        (seam_entry, seam_exit)
    }

    /// Generates a foothold chain from `entry` to `exit_point`, confined to
    /// `rect`. The entry foothold is left-aligned to the seam column; the
    /// exit foothold is right-aligned to it, so the seam's standing floor
    /// is always repainted.
    fn generate_inner_footholds(
        &self,
        rng: &mut ChaCha8Rng,
        knobs: &GeneratorKnobs,
        rect: RefineRect,
        entry: Pos,
        exit_point: Pos,
    ) -> Option<Vec<Foothold>> {
        let height = self.spec.height;
        let dx_total = exit_point.0 - entry.0;
        if dx_total <= 0 {
            return None;
        }

        let avg_hop = (1).max((self.spec.max_jump_distance + 1) / 2);
        let n_inter = 0.max(6.min(dx_total / avg_hop - 1));

        let e_w = knobs
            .min_foothold_width
            .max(rng.gen_range(knobs.min_foothold_width..=knobs.max_foothold_width))
            .min(rect.right() - entry.0 + 1);
        let mut footholds = vec![Foothold::new(entry.0, entry.1, e_w)];

        let max_up = ((self.spec.max_jump_height as f64) * knobs.verticality).round().max(0.0) as i32;
        let max_down = ((self.spec.max_safe_drop as f64) * knobs.verticality).round().max(0.0) as i32;
        let eff_max_w = knobs.min_foothold_width.max(
            knobs.max_foothold_width
                - (knobs.difficulty * f64::from(knobs.max_foothold_width - knobs.min_foothold_width))
                    .round() as i32,
        );

        for step in 0..n_inter {
            let prev = *footholds.last().expect("entry foothold always present");
            let steps_left = n_inter - step + 1;
            let target_x = exit_point.0;

            let prog_min = min_dx_for_progress(prev.x, steps_left, target_x, self.spec.max_jump_distance);
            let diff_min = (self.spec.max_jump_distance as f64 * 0.25 * knobs.difficulty).round() as i32;
            let min_dx = prog_min.max(diff_min).max(1).min(self.spec.max_jump_distance);

            let mut placed = false;
            for _ in 0..MAX_STEP {
                let max_dx = self.spec.max_jump_distance.min(target_x - prev.x - 1);
                if max_dx < min_dx {
                    break;
                }

                let dx = rng.gen_range(min_dx..=max_dx);
                let dy = if max_up + max_down > 0 {
                    rng.gen_range(-max_up..=max_down)
                } else {
                    0
                };
                let w = rng.gen_range(knobs.min_foothold_width..=eff_max_w);
                let nx = prev.x + dx;
                let ny = prev.y + dy;

                if nx < rect.x || nx + w - 1 > rect.right() {
                    continue;
                }
                if ny < rect.y + height {
                    continue;
                }
                if ny + 1 > rect.bottom() {
                    continue;
                }

                let candidate = Foothold::new(nx, ny, w);
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

        let last = *footholds.last().expect("entry foothold always present");
        let mut x_w = knobs
            .min_foothold_width
            .max(rng.gen_range(knobs.min_foothold_width..=knobs.max_foothold_width))
            .min(exit_point.0 - rect.x + 1);
        x_w = x_w.max(1);
        let exit_x = exit_point.0 - x_w + 1;

        let dy_to_exit = exit_point.1 - last.y;
        let min_jump_dx = 0.max(exit_x - last.right());

        if min_jump_dx > self.spec.max_jump_distance {
            return None;
        }
        if dy_to_exit > self.spec.max_safe_drop {
            return None;
        }
        if dy_to_exit < -self.spec.max_jump_height {
            return None;
        }

        let exit_fh = Foothold::new(exit_x, exit_point.1, x_w);
        if !clearance_ok(&footholds, exit_fh, height) {
            return None;
        }

        footholds.push(exit_fh);
        Some(footholds)
    }
}

fn nearest_to(candidates: &[Pos], mid_y: i32) -> Option<Pos> {
    candidates
        .iter()
        .copied()
        .min_by_key(|p| (p.1 - mid_y).abs())
}

fn apply_deltas(base: GeneratorKnobs, req: RefineRequest) -> GeneratorKnobs {
    GeneratorKnobs {
        target_foothold_count: base.target_foothold_count,
        min_foothold_width: base.min_foothold_width,
        max_foothold_width: base.max_foothold_width,
        verticality: (base.verticality + req.verticality_delta).clamp(0.0, 1.0),
        difficulty: (base.difficulty + req.difficulty_delta).clamp(0.0, 1.0),
    }
}

fn clear_rect(grid: &mut SemanticGrid, rect: RefineRect) {
    for ry in rect.y..=rect.bottom() {
        for rx in rect.x..=rect.right() {
            grid.set(rx, ry, Cell::EMPTY).expect("rect lies wholly inside the grid");
        }
    }
}

fn paint_inner_footholds(grid: &mut SemanticGrid, footholds: &[Foothold], rect: RefineRect, height: i32) {
    let mut surface_cells = HashSet::new();
    for fh in footholds {
        let sy = fh.surface_y();
        for fx in fh.x_cols() {
            if rect.x <= fx && fx <= rect.right() && rect.y <= sy && sy <= rect.bottom() {
                grid.add_flags(fx, sy, Cell::SOLID).expect("clipped to rect");
                let _ = surface_cells.insert((fx, sy));
            }
        }
    }

    for fh in footholds {
        for fx in fh.x_cols() {
            for row in fh.clearance_rows(height) {
                if rect.x <= fx
                    && fx <= rect.right()
                    && rect.y <= row
                    && row <= rect.bottom()
                    && !surface_cells.contains(&(fx, row))
                {
                    grid.remove_flags(fx, row, Cell::SOLID).expect("clipped to rect");
                }
            }
        }
    }
}

fn smooth_silhouette(grid: &mut SemanticGrid, rect: RefineRect) {
    let top_y = rect.y;
    for fx in rect.x..=rect.right() {
        if !grid.get(fx, top_y).expect("within rect, within grid").intersects(Cell::SOLID) {
            continue;
        }
        let left_solid = fx > rect.x
            && grid
                .get(fx - 1, top_y)
                .expect("within rect, within grid")
                .intersects(Cell::SOLID);
        let right_solid = fx < rect.right()
            && grid
                .get(fx + 1, top_y)
                .expect("within rect, within grid")
                .intersects(Cell::SOLID);
        if !left_solid && !right_solid {
            grid.remove_flags(fx, top_y, Cell::SOLID).expect("within rect, within grid");
        }
    }
}

fn add_secret(
    grid: &mut SemanticGrid,
    footholds: &[Foothold],
    rect: RefineRect,
    height: i32,
    rng: &mut ChaCha8Rng,
) {
    if footholds.is_empty() {
        return;
    }
    let base = footholds[rng.gen_range(0..footholds.len())];
    for _ in 0..20 {
        let sx = base.x + rng.gen_range(-1..=1);
        let sy = base.y - rng.gen_range(3..=5);
        let sw = rng.gen_range(2..=3);

        if sx < rect.x || sx + sw - 1 > rect.right() {
            continue;
        }
        if sy < rect.y + height || sy + 1 > rect.bottom() {
            continue;
        }

        let secret = Foothold::new(sx, sy, sw);
        if !clearance_ok(footholds, secret, height) {
            continue;
        }

        for fx in secret.x_cols() {
            if rect.x <= fx && fx <= rect.right() && rect.y <= secret.surface_y() && secret.surface_y() <= rect.bottom() {
                grid.add_flags(fx, secret.surface_y(), Cell::SOLID).expect("clipped to rect");
            }
        }
        for fx in secret.x_cols() {
            for row in secret.clearance_rows(height) {
                if rect.x <= fx && fx <= rect.right() && rect.y <= row && row <= rect.bottom() {
                    grid.remove_flags(fx, row, Cell::SOLID).expect("clipped to rect");
                }
            }
        }
        break;
    }
}

fn find_flag(grid: &SemanticGrid, flag: Cell) -> Option<Pos> {
    for y in 0..H {
        for x in 0..W {
            if grid.get(x, y).expect("0..W, 0..H are in-bounds").intersects(flag) {
                return Some((x, y));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelforge_system_generator::LevelGenerator;

    fn base_grid() -> SemanticGrid {
        let generator = LevelGenerator::new(PlayerSpec::default());
        generator
            .generate(100, GeneratorKnobs::default())
            .unwrap()
            .grid
    }

    #[test]
    fn basic_refine_preserves_outside_rect() {
        let grid = base_grid();
        let rect = RefineRect::new(7, 4, 16, 24);
        let refiner = RegionRefiner::new(PlayerSpec::default());
        let (new_grid, report) = refiner.refine(
            &grid,
            rect,
            RefineRequest::default(),
            100,
            GeneratorKnobs::default(),
        );
        assert!(report.success, "{report:?}");
        for y in 0..H {
            for x in 0..W {
                if !rect.contains(x, y) {
                    assert_eq!(grid.get(x, y).unwrap(), new_grid.get(x, y).unwrap());
                }
            }
        }

        let (sx, sy) = report.seam_entry.expect("success implies seams were found");
        assert!(new_grid.get(sx, sy + 1).unwrap().intersects(Cell::SOLID));
        assert!(!new_grid.get(sx, sy).unwrap().intersects(Cell::SOLID));
    }

    #[test]
    fn harder_refine_request_still_reachable() {
        let grid = base_grid();
        let rect = RefineRect::new(7, 4, 16, 24);
        let refiner = RegionRefiner::new(PlayerSpec::default());
        let request = RefineRequest {
            difficulty_delta: 0.5,
            verticality_delta: 0.4,
            ..RefineRequest::default()
        };
        let (_new_grid, report) = refiner.refine(&grid, rect, request, 200, GeneratorKnobs::default());
        assert!(report.success, "{report:?}");
        assert!(report.reachability.unwrap().reachable);
    }

    #[test]
    fn secret_request_adds_a_solid_cell_inside_rect() {
        let grid = base_grid();
        let rect = RefineRect::new(7, 4, 16, 24);
        let refiner = RegionRefiner::new(PlayerSpec::default());
        let request = RefineRequest {
            add_secret: true,
            ..RefineRequest::default()
        };
        let (new_grid, report) = refiner.refine(&grid, rect, request, 300, GeneratorKnobs::default());
        assert!(report.success, "{report:?}");
        let mut solids = 0;
        for y in rect.y..=rect.bottom() {
            for x in rect.x..=rect.right() {
                if new_grid.get(x, y).unwrap().intersects(Cell::SOLID) {
                    solids += 1;
                }
            }
        }
        assert!(solids >= 1);
    }

    #[test]
    fn smooth_silhouette_removes_isolated_spikes() {
        let grid = base_grid();
        let rect = RefineRect::new(7, 4, 16, 24);
        let refiner = RegionRefiner::new(PlayerSpec::default());
        let request = RefineRequest {
            smooth_silhouette: true,
            ..RefineRequest::default()
        };
        let (new_grid, report) = refiner.refine(&grid, rect, request, 400, GeneratorKnobs::default());
        assert!(report.success, "{report:?}");
        for x in rect.x..=rect.right() {
            if new_grid.get(x, rect.y).unwrap().intersects(Cell::SOLID) {
                let left = x > rect.x && new_grid.get(x - 1, rect.y).unwrap().intersects(Cell::SOLID);
                let right = x < rect.right() && new_grid.get(x + 1, rect.y).unwrap().intersects(Cell::SOLID);
                assert!(left || right);
            }
        }
    }

    #[test]
    fn unreachable_original_fails_immediately() {
        let grid = SemanticGrid::new();
        let rect = RefineRect::new(7, 4, 16, 24);
        let refiner = RegionRefiner::new(PlayerSpec::default());
        let (new_grid, report) = refiner.refine(
            &grid,
            rect,
            RefineRequest::default(),
            1,
            GeneratorKnobs::default(),
        );
        assert!(!report.success);
        assert_eq!(new_grid, grid);
    }
}
