//! Terrain and resource kinds

use serde::{Deserialize, Serialize};

/// Primary terrain type for a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plains,
    Grassland,
    Forest,
    Hills,
    Desert,
    Mountain, // Impassable
    Water,    // Impassable
}

impl Terrain {
    /// Can units stand on, spawn on, or be granted this terrain?
    pub fn is_passable(&self) -> bool {
        !matches!(self, Terrain::Mountain | Terrain::Water)
    }

    /// Single-character glyph used by text renderings of a board
    pub fn glyph(&self) -> char {
        match self {
            Terrain::Plains => '.',
            Terrain::Grassland => ',',
            Terrain::Forest => 'f',
            Terrain::Hills => 'h',
            Terrain::Desert => 'd',
            Terrain::Mountain => '^',
            Terrain::Water => '~',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Terrain> {
        match glyph {
            '.' => Some(Terrain::Plains),
            ',' => Some(Terrain::Grassland),
            'f' => Some(Terrain::Forest),
            'h' => Some(Terrain::Hills),
            'd' => Some(Terrain::Desert),
            '^' => Some(Terrain::Mountain),
            '~' => Some(Terrain::Water),
            _ => None,
        }
    }
}

/// Harvestable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wheat,
    Iron,
    Stone,
}

impl ResourceKind {
    pub fn all() -> [ResourceKind; 3] {
        [ResourceKind::Wheat, ResourceKind::Iron, ResourceKind::Stone]
    }
}
