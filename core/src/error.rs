/// Errors surfaced directly by the core data model and its systems.
///
/// `RefinementFailed` from the specification is deliberately not a variant
/// here: a failed refinement is represented structurally by
/// [`crate::RefineReport`] with `success = false`, so callers always receive
/// a usable grid rather than an `Err`. Likewise `validate` is infallible and
/// always returns a [`crate::ReachabilityReport`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A cell accessor was called with coordinates outside the grid.
    #[error("({x}, {y}) is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        /// Column that was requested.
        x: i32,
        /// Row that was requested.
        y: i32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// A serialized grid payload failed to decode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Level generation exhausted every outer attempt without producing a
    /// reachable grid.
    #[error(
        "level generation failed after {attempts} attempts (seed range {seed_start}..{seed_end})"
    )]
    GenerationFailed {
        /// Number of outer attempts made.
        attempts: u32,
        /// First seed tried.
        seed_start: u64,
        /// One past the last seed tried.
        seed_end: u64,
    },
}
