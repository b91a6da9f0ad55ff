//! Static board template: tiles, terrain and resource deposits
//!
//! A board is seeded once per map and never mutated by play. Each game copies
//! the template stock into its own `ResourceStock`.

use serde::{Deserialize, Serialize};

use crate::core::error::LoadError;
use crate::map::hex::OffsetCoord;
use crate::map::terrain::{ResourceKind, Terrain};

/// A single tile of the board template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: OffsetCoord,
    pub terrain: Terrain,
    pub resource: Option<ResourceKind>,
    /// Template amount copied into every new game
    pub stock: u32,
}

impl Tile {
    pub fn new(coord: OffsetCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            resource: None,
            stock: 0,
        }
    }
}

/// A resource deposit in a board definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositDef {
    pub row: i32,
    pub col: i32,
    pub kind: ResourceKind,
    pub amount: u32,
}

/// Serialized board description
///
/// `rows` holds one glyph string per row (see `Terrain::glyph`); missing rows
/// or columns fall back to `default_terrain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDef {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub default_terrain: Terrain,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub deposits: Vec<DepositDef>,
}

/// The full board, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Create a board filled with plains
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Terrain::Plains)
    }

    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                tiles.push(Tile::new(OffsetCoord::new(row, col), terrain));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn from_def(def: &BoardDef) -> Result<Self, LoadError> {
        if def.width == 0 || def.height == 0 {
            return Err(LoadError::Invalid("board must have at least one tile".into()));
        }

        let mut board = Self::filled(def.width, def.height, def.default_terrain);

        for (row, line) in def.rows.iter().enumerate() {
            for (col, glyph) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let terrain = Terrain::from_glyph(glyph).ok_or_else(|| {
                    LoadError::Invalid(format!("unknown terrain glyph '{}' in row {}", glyph, row))
                })?;
                board.set_terrain(OffsetCoord::new(row as i32, col as i32), terrain);
            }
        }

        for deposit in &def.deposits {
            let coord = OffsetCoord::new(deposit.row, deposit.col);
            if !board.in_bounds(coord) {
                return Err(LoadError::Invalid(format!("deposit at {} is off the board", coord)));
            }
            board.set_deposit(coord, deposit.kind, deposit.amount);
        }

        Ok(board)
    }

    /// Row-major index of a coordinate, `None` when off the board
    pub fn index_of(&self, coord: OffsetCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(coord.row as usize * self.width as usize + coord.col as usize)
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: OffsetCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && coord.row < self.height as i32
            && coord.col < self.width as i32
    }

    pub fn tile(&self, coord: OffsetCoord) -> Option<&Tile> {
        self.index_of(coord).map(|i| &self.tiles[i])
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Off-board tiles count as impassable
    pub fn is_passable(&self, coord: OffsetCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.terrain.is_passable())
    }

    pub fn set_terrain(&mut self, coord: OffsetCoord, terrain: Terrain) {
        if let Some(i) = self.index_of(coord) {
            self.tiles[i].terrain = terrain;
        }
    }

    pub fn set_deposit(&mut self, coord: OffsetCoord, kind: ResourceKind, amount: u32) {
        if let Some(i) = self.index_of(coord) {
            self.tiles[i].resource = Some(kind);
            self.tiles[i].stock = amount;
        }
    }

    /// Template stock per tile, in board order
    pub fn template_stock(&self) -> Vec<u32> {
        self.tiles.iter().map(|t| t.stock).collect()
    }

    /// One glyph line per row, odd rows indented by one space
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        for row in 0..self.height as i32 {
            if row & 1 == 1 {
                out.push(' ');
            }
            for col in 0..self.width as i32 {
                let glyph = self
                    .tile(OffsetCoord::new(row, col))
                    .map(|t| t.terrain.glyph())
                    .unwrap_or(' ');
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_creation() {
        let board = Board::new(10, 8);
        assert_eq!(board.len(), 80);
        assert_eq!(board.tile(OffsetCoord::new(7, 9)).unwrap().coord, OffsetCoord::new(7, 9));
    }

    #[test]
    fn test_board_out_of_bounds() {
        let board = Board::new(10, 10);
        assert!(board.tile(OffsetCoord::new(10, 0)).is_none());
        assert!(board.tile(OffsetCoord::new(0, -1)).is_none());
        assert!(!board.is_passable(OffsetCoord::new(-1, 0)));
    }

    #[test]
    fn test_board_from_def() {
        let def: BoardDef = toml::from_str(
            r#"
            width = 4
            height = 2
            rows = ["..~.", ". ^ f"]

            [[deposits]]
            row = 0
            col = 1
            kind = "iron"
            amount = 12
            "#,
        )
        .unwrap();

        let board = Board::from_def(&def).unwrap();
        assert_eq!(board.tile(OffsetCoord::new(0, 2)).unwrap().terrain, Terrain::Water);
        assert_eq!(board.tile(OffsetCoord::new(1, 1)).unwrap().terrain, Terrain::Mountain);
        assert_eq!(board.tile(OffsetCoord::new(1, 2)).unwrap().terrain, Terrain::Forest);
        assert_eq!(board.tile(OffsetCoord::new(1, 3)).unwrap().terrain, Terrain::Plains);

        let deposit = board.tile(OffsetCoord::new(0, 1)).unwrap();
        assert_eq!(deposit.resource, Some(ResourceKind::Iron));
        assert_eq!(deposit.stock, 12);
    }

    #[test]
    fn test_board_rejects_unknown_glyph() {
        let def = BoardDef {
            width: 2,
            height: 1,
            default_terrain: Terrain::Plains,
            rows: vec!["?.".into()],
            deposits: vec![],
        };
        assert!(Board::from_def(&def).is_err());
    }

    #[test]
    fn test_template_stock_matches_deposits() {
        let mut board = Board::new(3, 1);
        board.set_deposit(OffsetCoord::new(0, 2), ResourceKind::Stone, 5);
        assert_eq!(board.template_stock(), vec![0, 0, 5]);
    }
}
