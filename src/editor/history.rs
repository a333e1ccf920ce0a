//! Undo/redo stacks
//!
//! `CommandHistory` is the only place that applies commands to a grid.
//! One history belongs to one open map.

use tracing::{debug, warn};

use super::command::Command;
use crate::world::MapGrid;

/// Default number of undo steps kept per map
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Error type for history operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The command was built against a different map than the one being edited
    MapMismatch { expected: u32, label: String },
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::MapMismatch { expected, label } => {
                write!(f, "command '{}' does not target map {}", label, expected)
            }
        }
    }
}

impl std::error::Error for HistoryError {}

/// Undo and redo stacks, most recent last
#[derive(Debug, Clone)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth, 0 = unbounded
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the undo depth, dropping the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    /// Apply a command and record it. Clears the redo stack.
    ///
    /// Commands addressed to another grid are rejected. Commands that would
    /// not change anything are dropped without touching either stack.
    /// Returns true if the command was recorded.
    pub fn execute(&mut self, grid: &mut MapGrid, cmd: Command) -> Result<bool, HistoryError> {
        if !cmd.targets_grid(grid) {
            warn!(map = grid.map_id(), command = cmd.label(), "rejected command for another map");
            return Err(HistoryError::MapMismatch {
                expected: grid.map_id(),
                label: cmd.label().to_string(),
            });
        }
        if cmd.is_noop() {
            debug!(map = grid.map_id(), command = cmd.label(), "dropped no-op");
            return Ok(false);
        }

        cmd.apply_forward(grid);
        debug!(map = grid.map_id(), command = cmd.label(), writes = cmd.len(), "execute");
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
        self.trim();
        Ok(true)
    }

    /// Revert the most recent command. Returns false if there was nothing to undo.
    pub fn undo(&mut self, grid: &mut MapGrid) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        if !cmd.targets_grid(grid) {
            warn!(map = grid.map_id(), command = cmd.label(), "undo skipped, grid changed");
            self.undo_stack.push(cmd);
            return false;
        }
        cmd.apply_backward(grid);
        debug!(map = grid.map_id(), command = cmd.label(), "undo");
        self.redo_stack.push(cmd);
        true
    }

    /// Re-apply the most recently undone command. Returns false if there was nothing to redo.
    pub fn redo(&mut self, grid: &mut MapGrid) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        if !cmd.targets_grid(grid) {
            warn!(map = grid.map_id(), command = cmd.label(), "redo skipped, grid changed");
            self.redo_stack.push(cmd);
            return false;
        }
        cmd.apply_forward(grid);
        debug!(map = grid.map_id(), command = cmd.label(), "redo");
        self.undo_stack.push(cmd);
        self.trim();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Labels of undoable commands, most recent first
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo_stack.iter().rev().map(|c| c.label()).collect()
    }

    /// Labels of redoable commands, next redo first
    pub fn redo_labels(&self) -> Vec<&str> {
        self.redo_stack.iter().rev().map(|c| c.label()).collect()
    }

    /// Forget all history (e.g. when a new map is loaded)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn trim(&mut self) {
        if self.limit == 0 {
            return;
        }
        if self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Exit, Layer};
    use proptest::prelude::*;

    fn grid() -> MapGrid {
        MapGrid::new(1, 8, 8)
    }

    #[test]
    fn test_execute_then_undo_restores_every_field() {
        let mut grid = grid();
        let before = grid.clone();
        let cmds = vec![
            Command::set_blocked(&grid, 1, 1, true).unwrap(),
            Command::set_npc(&grid, 1, 1, 12).unwrap(),
            Command::set_obj(&grid, 1, 1, 40).unwrap(),
            Command::set_obj_amount(&grid, 1, 1, 5).unwrap(),
            Command::set_trigger(&grid, 1, 1, 3).unwrap(),
            Command::set_particle(&grid, 1, 1, 8).unwrap(),
            Command::set_exit(&grid, 1, 1, Exit::new(2, 50, 50)).unwrap(),
            Command::set_layer(&grid, 1, 1, Layer::L2, 600).unwrap(),
        ];

        let mut history = CommandHistory::new();
        for cmd in cmds {
            history.execute(&mut grid, cmd).unwrap();
            assert_ne!(grid, before);
            assert!(history.undo(&mut grid));
            assert_eq!(grid, before);
        }
    }

    #[test]
    fn test_undo_redo_on_empty_stacks() {
        let mut grid = grid();
        let mut history = CommandHistory::new();
        assert!(!history.undo(&mut grid));
        assert!(!history.redo(&mut grid));
        assert_eq!(grid, MapGrid::new(1, 8, 8));
    }

    #[test]
    fn test_execute_clears_redo() {
        let mut grid = grid();
        let mut history = CommandHistory::new();

        let cmd = Command::set_npc(&grid, 0, 0, 1).unwrap();
        history.execute(&mut grid, cmd).unwrap();
        history.undo(&mut grid);
        assert!(history.can_redo());

        let other = Command::set_trigger(&grid, 3, 3, 7).unwrap();
        history.execute(&mut grid, other).unwrap();
        assert!(!history.can_redo());
        assert!(!history.redo(&mut grid));
        assert_eq!(grid.tile(0, 0).unwrap().npc(), 0);
        assert_eq!(grid.tile(3, 3).unwrap().trigger(), 7);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut grid = grid();
        let mut history = CommandHistory::with_limit(3);
        for npc in 1..=5 {
            let cmd = Command::set_npc(&grid, 0, 0, npc).unwrap();
            history.execute(&mut grid, cmd).unwrap();
        }
        assert_eq!(history.undo_len(), 3);

        while history.undo(&mut grid) {}
        // The two oldest steps were dropped, so undo stops at npc 2
        assert_eq!(grid.tile(0, 0).unwrap().npc(), 2);

        history.set_limit(1);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 3);
    }

    #[test]
    fn test_unbounded_history() {
        let mut grid = grid();
        let mut history = CommandHistory::with_limit(0);
        for npc in 1..=150 {
            let cmd = Command::set_npc(&grid, 0, 0, npc).unwrap();
            history.execute(&mut grid, cmd).unwrap();
        }
        assert_eq!(history.undo_len(), 150);
    }

    #[test]
    fn test_rejects_command_for_other_map() {
        let other_map = MapGrid::new(2, 8, 8);
        let cmd = Command::set_blocked(&other_map, 0, 0, true).unwrap();

        let mut grid = grid();
        let mut history = CommandHistory::new();
        let result = history.execute(&mut grid, cmd);
        assert!(matches!(result, Err(HistoryError::MapMismatch { expected: 1, .. })));
        assert!(!history.can_undo());
        assert!(!grid.tile(0, 0).unwrap().blocked());
    }

    #[test]
    fn test_noop_leaves_stacks_alone() {
        let mut grid = grid();
        let mut history = CommandHistory::new();
        let cmd = Command::set_npc(&grid, 2, 2, 4).unwrap();
        history.execute(&mut grid, cmd).unwrap();
        history.undo(&mut grid);

        let noop = Command::set_trigger(&grid, 1, 1, 0).unwrap();
        assert!(!history.execute(&mut grid, noop).unwrap());
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
        assert!(!history.execute(&mut grid, Command::batch("empty", vec![])).unwrap());
        assert!(history.redo(&mut grid));
    }

    #[test]
    fn test_rejects_command_for_larger_grid_with_same_id() {
        let larger = MapGrid::new(1, 100, 100);
        let cmd = Command::set_npc(&larger, 50, 50, 7).unwrap();

        let mut grid = MapGrid::new(1, 4, 4);
        let mut history = CommandHistory::new();
        let result = history.execute(&mut grid, cmd);
        assert!(matches!(result, Err(HistoryError::MapMismatch { expected: 1, .. })));
        assert!(!history.can_undo());
        assert_eq!(grid, MapGrid::new(1, 4, 4));
    }

    #[test]
    fn test_undo_refuses_other_grid() {
        let mut grid = grid();
        let mut history = CommandHistory::new();
        let cmd = Command::set_npc(&grid, 6, 6, 3).unwrap();
        history.execute(&mut grid, cmd).unwrap();

        let mut smaller = MapGrid::new(1, 2, 2);
        assert!(!history.undo(&mut smaller));
        assert_eq!(history.undo_len(), 1);
        assert!(history.undo(&mut grid));
        assert_eq!(grid.tile(6, 6).unwrap().npc(), 0);
    }

    #[test]
    fn test_labels_most_recent_first() {
        let mut grid = grid();
        let mut history = CommandHistory::new();
        let cmd = Command::set_blocked(&grid, 0, 0, true).unwrap();
        history.execute(&mut grid, cmd).unwrap();
        let cmd = Command::set_exit(&grid, 0, 0, Exit::new(3, 1, 1)).unwrap();
        history.execute(&mut grid, cmd).unwrap();

        assert_eq!(history.undo_labels(), vec!["Transfer", "Block"]);
        history.undo(&mut grid);
        assert_eq!(history.redo_labels(), vec!["Transfer"]);
    }

    /// One random edit: (field selector, x, y, value)
    fn edit_strategy() -> impl Strategy<Value = (u8, i64, i64, u32)> {
        (0u8..8, 0i64..8, 0i64..8, 0u32..50)
    }

    fn build(grid: &MapGrid, (field, x, y, value): (u8, i64, i64, u32)) -> Command {
        let cmd = match field {
            0 => Command::set_blocked(grid, x, y, value % 2 == 1),
            1 => Command::set_npc(grid, x, y, value),
            2 => Command::set_obj(grid, x, y, value),
            3 => Command::set_obj_amount(grid, x, y, value),
            4 => Command::set_trigger(grid, x, y, value),
            5 => Command::set_particle(grid, x, y, value),
            6 => Command::set_exit(grid, x, y, Exit::new(value, value / 2, value / 3)),
            _ => Command::set_layer(grid, x, y, Layer::ALL[(value % 4) as usize], value),
        };
        cmd.unwrap()
    }

    proptest! {
        #[test]
        fn prop_undo_all_then_redo_all(edits in prop::collection::vec(edit_strategy(), 1..40)) {
            let mut grid = grid();
            let mut history = CommandHistory::with_limit(0);
            let start = grid.clone();

            let mut recorded = 0;
            for edit in &edits {
                let cmd = build(&grid, *edit);
                let noop = cmd.is_noop();
                let pushed = history.execute(&mut grid, cmd).unwrap();
                prop_assert_eq!(pushed, !noop);
                recorded += pushed as usize;
            }
            prop_assert_eq!(history.undo_len(), recorded);
            let end = grid.clone();

            for _ in 0..recorded {
                prop_assert!(history.undo(&mut grid));
            }
            prop_assert!(!history.can_undo());
            prop_assert_eq!(&grid, &start);

            for _ in 0..recorded {
                prop_assert!(history.redo(&mut grid));
            }
            prop_assert_eq!(&grid, &end);
        }
    }
}
