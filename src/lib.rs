//! MAPFORGE: the editing core of a 2D tile-map editor
//!
//! Maps are grids of tiles with four graphic layers, a blocked flag, exits
//! and entity slots. Every change goes through reversible commands:
//! - `world`: tiles and the map grid
//! - `editor`: commands, per-map undo history, open documents, exit tools
//! - `catalog`: named GRH palette
//! - `prefab`: capture, store and stamp reusable map fragments
//! - `config`: editor settings

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod config;
pub mod editor;
pub mod prefab;
pub mod world;
