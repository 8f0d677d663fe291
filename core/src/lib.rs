#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared data contracts for the LevelForge procedural platformer core.
//!
//! This crate holds the pure value types passed between the generation,
//! validation, refinement and tilemap systems: the semantic tile grid, the
//! movement/generation knobs, the foothold geometry, and the report and
//! error types every system surfaces to its callers. It performs no
//! generation, validation or I/O itself.

mod cell;
mod error;
mod foothold;
mod grid;
mod knobs;
mod player;
mod refine;
mod report;

pub use cell::Cell;
pub use error::CoreError;
pub use foothold::Foothold;
pub use grid::{ApplyMode, SemanticGrid, SerializedGrid, GRID_HEIGHT, GRID_WIDTH};
pub use knobs::GeneratorKnobs;
pub use player::PlayerSpec;
pub use refine::{RefineRect, RefineRequest};
pub use report::{GenerationResult, ReachabilityReport, RefineReport};

/// A grid column/row pair, always within `[0, GRID_WIDTH)` x `[0, GRID_HEIGHT)`
/// once validated by a grid accessor.
pub type Pos = (i32, i32);
