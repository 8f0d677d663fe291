use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Bitflag tile contents: a subset of the six semantic flags below, packed
/// into a single byte. Unused bits are always zero.
///
/// ```text
/// SOLID  = 0x01 — fully blocking terrain
/// ONEWAY = 0x02 — passable from below, solid from above
/// HAZARD = 0x04 — kills the player on contact
/// LADDER = 0x08 — climbable surface
/// GOAL   = 0x10 — level exit / win condition
/// START  = 0x20 — player spawn point
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Cell(u8);

impl Cell {
    /// Empty cell; no flags set.
    pub const EMPTY: Cell = Cell(0);
    /// Fully blocking terrain.
    pub const SOLID: Cell = Cell(0x01);
    /// Passable from below, solid from above.
    pub const ONEWAY: Cell = Cell(0x02);
    /// Kills the player on contact. Does not block movement through the air.
    pub const HAZARD: Cell = Cell(0x04);
    /// Climbable surface.
    pub const LADDER: Cell = Cell(0x08);
    /// Level exit / win condition marker.
    pub const GOAL: Cell = Cell(0x10);
    /// Player spawn point marker.
    pub const START: Cell = Cell(0x20);

    /// Mask covering every flag defined above; all other bits are invalid.
    pub const ALL: u8 = 0x01 | 0x02 | 0x04 | 0x08 | 0x10 | 0x20;

    /// Builds a `Cell` from a raw byte, truncating any bits outside
    /// [`Cell::ALL`]. This is the only way raw bytes enter a `Cell`; it
    /// guarantees unused bits stay zero.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Cell(bits & Self::ALL)
    }

    /// Returns the raw byte representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if `self` contains every flag set in `other`.
    #[must_use]
    pub const fn contains(self, other: Cell) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if `self` and `other` share any flag.
    #[must_use]
    pub const fn intersects(self, other: Cell) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns `true` if no flags are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Cell {
    type Output = Cell;
    fn bitor(self, rhs: Cell) -> Cell {
        Cell::from_bits_truncate(self.0 | rhs.0)
    }
}

impl BitOrAssign for Cell {
    fn bitor_assign(&mut self, rhs: Cell) {
        *self = *self | rhs;
    }
}

impl BitAnd for Cell {
    type Output = Cell;
    fn bitand(self, rhs: Cell) -> Cell {
        Cell::from_bits_truncate(self.0 & rhs.0)
    }
}

impl Not for Cell {
    type Output = Cell;
    fn not(self) -> Cell {
        Cell::from_bits_truncate(!self.0)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell.0
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMED: [(Cell, &str); 6] = [
            (Cell::SOLID, "SOLID"),
            (Cell::ONEWAY, "ONEWAY"),
            (Cell::HAZARD, "HAZARD"),
            (Cell::LADDER, "LADDER"),
            (Cell::GOAL, "GOAL"),
            (Cell::START, "START"),
        ];
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        let mut first = true;
        for (flag, name) in NAMED {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_unused_bits() {
        let cell = Cell::from_bits_truncate(0xFF);
        assert_eq!(cell.bits(), Cell::ALL);
    }

    #[test]
    fn contains_and_intersects() {
        let cell = Cell::SOLID | Cell::HAZARD;
        assert!(cell.contains(Cell::SOLID));
        assert!(cell.intersects(Cell::HAZARD));
        assert!(!cell.contains(Cell::GOAL));
    }

    #[test]
    fn empty_by_default() {
        assert!(Cell::default().is_empty());
    }
}
