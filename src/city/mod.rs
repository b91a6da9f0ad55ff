//! City layer - settlements, territory, economy and production

pub mod economy;
pub mod production;
pub mod settlement;
pub mod stockpile;
pub mod territory;

pub use economy::{harvest, is_under_siege, regenerate};
pub use production::{auto_produce, select_spawn_tile, spawn_scan_order, ProductionResult};
pub use settlement::City;
pub use stockpile::Stockpile;
pub use territory::{check_expansion, initial_territory};
