//! Prefabs - reusable map fragments
//!
//! A prefab is captured from a rectangle of a map, stored as JSON, and
//! stamped back onto any map as a single undoable batch.

mod apply;
mod capture;
mod io;
mod library;
mod model;

pub use apply::*;
pub use capture::*;
pub use io::*;
pub use library::*;
pub use model::*;
