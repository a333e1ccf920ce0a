//! Map Editor core
//!
//! Everything that changes a map goes through here:
//! - `Command`: reversible single-field edits (plus batches)
//! - `CommandHistory`: bounded undo/redo stacks
//! - `MapContext` / `Workspace`: open documents, passed explicitly
//! - `TransferStaging` / `TransferTool`: exit placement

mod command;
mod context;
mod history;
mod transfer;

pub use command::*;
pub use context::*;
pub use history::*;
pub use transfer::*;
