//! Cities: owned tile, HP, territory and stockpile

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::city::stockpile::Stockpile;
use crate::core::types::{CityId, ParticipantId};
use crate::map::hex::OffsetCoord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub owner: ParticipantId,
    pub coord: OffsetCoord,
    pub hp: u32,
    pub max_hp: u32,
    /// Harvestable tiles, always including `coord`
    pub territory: BTreeSet<OffsetCoord>,
    /// Size of the territory granted at game start
    pub initial_territory: u32,
    pub stockpile: Stockpile,
    /// Set after producing a unit; cleared when the owner's turn begins
    pub has_acted: bool,
}

impl City {
    pub fn new(
        id: CityId,
        name: impl Into<String>,
        owner: ParticipantId,
        coord: OffsetCoord,
        max_hp: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            coord,
            hp: max_hp,
            max_hp,
            territory: BTreeSet::from([coord]),
            initial_territory: 1,
            stockpile: Stockpile::new(),
            has_acted: false,
        }
    }

    /// Tiles claimed beyond the initial grant
    pub fn extra_tiles(&self) -> u32 {
        (self.territory.len() as u32).saturating_sub(self.initial_territory)
    }

    pub fn has_fallen(&self) -> bool {
        self.hp == 0
    }

    /// Is `coord` next to any territory tile?
    pub fn borders(&self, coord: OffsetCoord) -> bool {
        self.territory.iter().any(|t| t.is_adjacent(&coord))
    }
}
