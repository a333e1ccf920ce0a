//! Open documents
//!
//! A `MapContext` is one open map: its grid, its own undo history and the
//! dirty flag used for save prompts. Core operations take a context
//! explicitly; the `Workspace` only tracks which one the UI has active.

use std::path::{Path, PathBuf};

use super::command::Command;
use super::history::{CommandHistory, HistoryError};
use super::transfer::TransferStaging;
use crate::world::MapGrid;

/// One open map document
#[derive(Debug, Clone)]
pub struct MapContext {
    grid: MapGrid,
    history: CommandHistory,
    dirty: bool,
    file_path: Option<PathBuf>,
}

impl MapContext {
    pub fn new(grid: MapGrid) -> Self {
        Self {
            grid,
            history: CommandHistory::new(),
            dirty: false,
            file_path: None,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history.set_limit(limit);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn grid(&self) -> &MapGrid {
        &self.grid
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Display name: the file name, or "Untitled" for a new map
    pub fn name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Apply a command through the history. The map is marked as modified
    /// only if the command was recorded; returns whether it was.
    pub fn execute(&mut self, cmd: Command) -> Result<bool, HistoryError> {
        let recorded = self.history.execute(&mut self.grid, cmd)?;
        self.dirty |= recorded;
        Ok(recorded)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.grid);
        self.dirty |= changed;
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.grid);
        self.dirty |= changed;
        changed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the save flow once the map has been written out
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Swap in a freshly loaded grid. History and dirty state start over.
    pub fn replace_grid(&mut self, grid: MapGrid) {
        self.grid = grid;
        self.history.clear();
        self.dirty = false;
    }
}

/// All open maps plus editor-wide scratch state
#[derive(Debug, Default)]
pub struct Workspace {
    contexts: Vec<MapContext>,
    active: Option<usize>,
    staging: TransferStaging,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a map and make it active. Returns its index.
    pub fn open(&mut self, ctx: MapContext) -> usize {
        self.contexts.push(ctx);
        let idx = self.contexts.len() - 1;
        self.active = Some(idx);
        idx
    }

    /// Close a map. The active index follows the remaining documents.
    pub fn close(&mut self, index: usize) -> Option<MapContext> {
        if index >= self.contexts.len() {
            return None;
        }
        let ctx = self.contexts.remove(index);
        self.active = match self.active {
            _ if self.contexts.is_empty() => None,
            Some(a) if a > index => Some(a - 1),
            Some(a) if a == index => Some(index.min(self.contexts.len() - 1)),
            other => other,
        };
        Some(ctx)
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.contexts.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&MapContext> {
        self.active.and_then(|i| self.contexts.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut MapContext> {
        self.active.and_then(|i| self.contexts.get_mut(i))
    }

    pub fn get(&self, index: usize) -> Option<&MapContext> {
        self.contexts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MapContext> {
        self.contexts.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Find an open map by id
    pub fn find_map(&self, map_id: u32) -> Option<usize> {
        self.contexts.iter().position(|c| c.grid().map_id() == map_id)
    }

    pub fn staging(&self) -> &TransferStaging {
        &self.staging
    }

    pub fn staging_mut(&mut self) -> &mut TransferStaging {
        &mut self.staging
    }

    /// Active context and the staging register, borrowed together
    pub fn active_with_staging(&mut self) -> Option<(&mut MapContext, &mut TransferStaging)> {
        let idx = self.active?;
        let ctx = self.contexts.get_mut(idx)?;
        Some((ctx, &mut self.staging))
    }

    pub fn any_dirty(&self) -> bool {
        self.contexts.iter().any(|c| c.is_dirty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_tracking() {
        let mut ctx = MapContext::new(MapGrid::new(1, 4, 4));
        assert!(!ctx.is_dirty());

        let cmd = Command::set_blocked(ctx.grid(), 1, 1, true).unwrap();
        ctx.execute(cmd).unwrap();
        assert!(ctx.is_dirty());

        ctx.mark_saved();
        assert!(!ctx.is_dirty());
        assert!(ctx.undo());
        assert!(ctx.is_dirty());

        ctx.mark_saved();
        assert!(ctx.redo());
        assert!(ctx.is_dirty());
        ctx.mark_saved();
        assert!(!ctx.redo());
        assert!(!ctx.is_dirty());
    }

    #[test]
    fn test_noop_does_not_dirty() {
        let mut ctx = MapContext::new(MapGrid::new(1, 4, 4));
        let cmd = Command::set_trigger(ctx.grid(), 1, 1, 0).unwrap();
        assert!(!ctx.execute(cmd).unwrap());
        assert_eq!(ctx.history().undo_len(), 0);
        assert!(!ctx.is_dirty());
    }

    #[test]
    fn test_stale_command_after_replace_grid() {
        let mut ctx = MapContext::new(MapGrid::new(1, 100, 100));
        let stale = Command::set_npc(ctx.grid(), 50, 50, 7).unwrap();
        ctx.replace_grid(MapGrid::new(1, 4, 4));

        assert!(matches!(ctx.execute(stale), Err(HistoryError::MapMismatch { .. })));
        assert!(!ctx.is_dirty());
        assert!(ctx.grid().iter().all(|(_, _, t)| t.is_empty()));
    }

    #[test]
    fn test_replace_grid_resets_history() {
        let mut ctx = MapContext::new(MapGrid::new(1, 4, 4)).with_history_limit(10);
        let cmd = Command::set_npc(ctx.grid(), 0, 0, 5).unwrap();
        ctx.execute(cmd).unwrap();

        ctx.replace_grid(MapGrid::new(1, 6, 6));
        assert!(!ctx.history().can_undo());
        assert!(!ctx.is_dirty());
        assert_eq!(ctx.grid().width(), 6);
        assert_eq!(ctx.history().limit(), 10);
    }

    #[test]
    fn test_name() {
        let ctx = MapContext::new(MapGrid::new(1, 4, 4));
        assert_eq!(ctx.name(), "Untitled");
        let ctx = ctx.with_path("maps/Mapa1.map");
        assert_eq!(ctx.name(), "Mapa1.map");
    }

    #[test]
    fn test_workspace_active_follows_close() {
        let mut ws = Workspace::new();
        assert!(ws.active().is_none());

        ws.open(MapContext::new(MapGrid::new(1, 4, 4)));
        ws.open(MapContext::new(MapGrid::new(2, 4, 4)));
        let third = ws.open(MapContext::new(MapGrid::new(3, 4, 4)));
        assert_eq!(ws.active_index(), Some(third));

        assert!(ws.set_active(0));
        assert!(!ws.set_active(9));
        ws.close(1);
        assert_eq!(ws.active().unwrap().grid().map_id(), 1);

        ws.close(0);
        assert_eq!(ws.active().unwrap().grid().map_id(), 3);
        assert_eq!(ws.find_map(3), Some(0));

        ws.close(0);
        assert!(ws.active().is_none());
        assert!(ws.is_empty());
    }

    #[test]
    fn test_histories_are_per_map() {
        let mut ws = Workspace::new();
        let a = ws.open(MapContext::new(MapGrid::new(1, 4, 4)));
        let b = ws.open(MapContext::new(MapGrid::new(2, 4, 4)));

        let ctx = ws.get_mut(a).unwrap();
        let cmd = Command::set_trigger(ctx.grid(), 0, 0, 1).unwrap();
        ctx.execute(cmd).unwrap();

        assert!(ws.get(a).unwrap().history().can_undo());
        assert!(!ws.get(b).unwrap().history().can_undo());
        assert!(ws.any_dirty());
    }
}
