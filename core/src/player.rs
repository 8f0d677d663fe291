/// Movement capabilities used by the reachability validator, generator and
/// refiner.
///
/// `width` is reserved: the reference implementation and this port both
/// treat the player as a single column wide, matching an inconsistency
/// observed in the original source (`width` is accepted but never read by
/// the corridor predicate or clearance mask).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSpec {
    /// Reserved; implementations may treat the player as 1 column wide.
    pub width: i32,
    /// Body height in rows, including the feet row.
    pub height: i32,
    /// Maximum rows the player can ascend in a single move.
    pub max_jump_height: i32,
    /// Maximum column delta the player can cover in a single move.
    pub max_jump_distance: i32,
    /// Maximum rows the player can descend in a single move.
    pub max_safe_drop: i32,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        PlayerSpec {
            width: 1,
            height: 2,
            max_jump_height: 4,
            max_jump_distance: 5,
            max_safe_drop: 6,
        }
    }
}

impl PlayerSpec {
    /// Creates a spec with the given jump geometry and the default body
    /// size (`width = 1`, `height = 2`).
    #[must_use]
    pub const fn new(max_jump_height: i32, max_jump_distance: i32, max_safe_drop: i32) -> Self {
        PlayerSpec {
            width: 1,
            height: 2,
            max_jump_height,
            max_jump_distance,
            max_safe_drop,
        }
    }
}
