use std::fmt;

use crate::foothold::Foothold;
use crate::grid::SemanticGrid;

/// Outcome of [`ReachabilityValidator::validate`](../levelforge_system_reachability/index.html).
#[derive(Clone, Debug, PartialEq)]
pub struct ReachabilityReport {
    /// Whether the goal is reachable from the start.
    pub reachable: bool,
    /// Node count along the shortest path, start-first (0 when unreachable).
    pub path_length: i32,
    /// Number of consecutive-edge pairs with `dy != 0` or `|dx| > 1`.
    pub jump_count: i32,
    /// Narrowest horizontal run of valid cells at any path node's row.
    pub min_landing_width: i32,
    /// Diagnostic messages; non-empty whenever `reachable` is `false`.
    pub reasons: Vec<String>,
}

impl ReachabilityReport {
    /// Builds a report describing a reachable path.
    #[must_use]
    pub fn reachable(path_length: i32, jump_count: i32, min_landing_width: i32) -> Self {
        ReachabilityReport {
            reachable: true,
            path_length,
            jump_count,
            min_landing_width,
            reasons: Vec::new(),
        }
    }

    /// Builds a report describing an unreachable goal, with at least one
    /// diagnostic reason.
    #[must_use]
    pub fn unreachable(reasons: Vec<String>) -> Self {
        ReachabilityReport {
            reachable: false,
            path_length: 0,
            jump_count: 0,
            min_landing_width: 0,
            reasons,
        }
    }
}

impl fmt::Display for ReachabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reachable {
            write!(
                f,
                "REACHABLE path={} nodes | jumps={} | min_platform={} tiles",
                self.path_length, self.jump_count, self.min_landing_width
            )
        } else {
            write!(f, "UNREACHABLE: {}", self.reasons.join(" | "))
        }
    }
}

/// Outcome of [`RegionRefiner::refine`](../levelforge_system_refiner/index.html).
#[derive(Clone, Debug, PartialEq)]
pub struct RefineReport {
    /// Whether refinement succeeded and `new_grid` differs from the input.
    pub success: bool,
    /// Detected entry seam, absolute `(x, y)`.
    pub seam_entry: Option<(i32, i32)>,
    /// Detected exit seam, absolute `(x, y)`.
    pub seam_exit: Option<(i32, i32)>,
    /// Number of footholds placed inside the rectangle.
    pub inner_footholds: i32,
    /// Full-grid reachability after refinement (or of the original grid, on
    /// early failure).
    pub reachability: Option<ReachabilityReport>,
    /// Diagnostic messages explaining a failure.
    pub reasons: Vec<String>,
}

impl Default for RefineReport {
    fn default() -> Self {
        RefineReport {
            success: false,
            seam_entry: None,
            seam_exit: None,
            inner_footholds: 0,
            reachability: None,
            reasons: Vec::new(),
        }
    }
}

impl fmt::Display for RefineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ok = if self.success { "OK" } else { "FAIL" };
        let reachable = self
            .reachability
            .as_ref()
            .map(|r| r.reachable.to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "RefineReport({ok} entry={:?} exit={:?} inner={} reachable={reachable})",
            self.seam_entry, self.seam_exit, self.inner_footholds
        )
    }
}

/// Outcome of [`LevelGenerator::generate`](../levelforge_system_generator/index.html).
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationResult {
    /// The generated, validated grid.
    pub grid: SemanticGrid,
    /// The footholds that were placed to produce `grid`.
    pub footholds: Vec<Foothold>,
    /// The reachability report confirming the grid is traversable.
    pub report: ReachabilityReport,
    /// The concrete seed (`seed + attempt`) that produced this result.
    pub seed_used: u64,
    /// Number of outer attempts made, including the successful one.
    pub attempts: u32,
}
