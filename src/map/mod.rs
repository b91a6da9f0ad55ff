//! Board geometry - hex coordinates, terrain, static tiles and pathfinding

pub mod board;
pub mod hex;
pub mod pathfinding;
pub mod terrain;

pub use board::{Board, BoardDef, DepositDef, Tile};
pub use hex::{CubeCoord, HexDirection, OffsetCoord};
pub use pathfinding::{find_path, path_cost};
pub use terrain::{ResourceKind, Terrain};
