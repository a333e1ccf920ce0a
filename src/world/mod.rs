//! World module - tile maps
//!
//! - `Tile`: one cell (blocking, NPC, object, exit, 4 graphic layers, trigger, particle)
//! - `MapGrid`: bounds-checked storage for one loaded map

mod grid;
mod tile;

pub use grid::*;
pub use tile::*;
