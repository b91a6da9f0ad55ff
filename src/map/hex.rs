//! Hex coordinate system for game boards
//!
//! Boards are stored in "odd-r" offset coordinates (odd rows shoved right by
//! half a tile). Distance and neighbor math happens in cube coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Offset (row, col) coordinate in odd-r layout
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OffsetCoord {
    pub row: i32,
    pub col: i32,
}

impl OffsetCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn to_cube(self) -> CubeCoord {
        let q = self.col - (self.row - (self.row & 1)) / 2;
        let r = self.row;
        CubeCoord::new(q, r, -q - r)
    }

    /// Hex distance between two offset positions
    pub fn distance(&self, other: &Self) -> u32 {
        self.to_cube().distance(&other.to_cube())
    }

    /// All 6 neighbors in `HexDirection::all()` order (may be off-map)
    pub fn neighbors(&self) -> [OffsetCoord; 6] {
        self.to_cube().neighbors().map(CubeCoord::to_offset)
    }

    pub fn neighbor(&self, direction: HexDirection) -> OffsetCoord {
        self.to_cube().neighbor(direction).to_offset()
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.distance(other) == 1
    }

    /// All positions within `range` (inclusive), nearest ring first
    pub fn within_range(&self, range: u32) -> Vec<OffsetCoord> {
        let mut results = self.to_cube().within_range(range);
        results.sort_by_key(|c| c.distance(&self.to_cube()));
        results.into_iter().map(CubeCoord::to_offset).collect()
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cube hex coordinate; invariant `q + r + s == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl CubeCoord {
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        debug_assert_eq!(q + r + s, 0, "cube coordinates must sum to zero");
        Self { q, r, s }
    }

    pub fn to_offset(self) -> OffsetCoord {
        let col = self.q + (self.r - (self.r & 1)) / 2;
        OffsetCoord::new(self.r, col)
    }

    /// Max of the absolute per-axis deltas
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s - other.s).unsigned_abs();
        dq.max(dr).max(ds)
    }

    pub fn neighbor(&self, direction: HexDirection) -> CubeCoord {
        let d = direction.offset();
        CubeCoord::new(self.q + d.q, self.r + d.r, self.s + d.s)
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [CubeCoord; 6] {
        HexDirection::all().map(|dir| self.neighbor(dir))
    }

    /// Get all hexes within range (inclusive)
    pub fn within_range(&self, range: u32) -> Vec<CubeCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for dq in -range..=range {
            for dr in (-range).max(-dq - range)..=range.min(-dq + range) {
                let q = self.q + dq;
                let r = self.r + dr;
                results.push(CubeCoord::new(q, r, -q - r));
            }
        }
        results
    }
}

/// The six hex directions, in the fixed order used for every scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// Get the cube offset for this direction
    pub fn offset(&self) -> CubeCoord {
        match self {
            HexDirection::East => CubeCoord::new(1, 0, -1),
            HexDirection::NorthEast => CubeCoord::new(1, -1, 0),
            HexDirection::NorthWest => CubeCoord::new(0, -1, 1),
            HexDirection::West => CubeCoord::new(-1, 0, 1),
            HexDirection::SouthWest => CubeCoord::new(-1, 1, 0),
            HexDirection::SouthEast => CubeCoord::new(0, 1, -1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }

    /// All directions
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }

    /// All directions, starting from the one at `start % 6`
    pub fn rotated(start: usize) -> [HexDirection; 6] {
        let all = Self::all();
        std::array::from_fn(|i| all[(start + i) % 6])
    }
}
