//! Reversible map edits
//!
//! Every command is a pair of plain field writes on one tile: forward writes
//! the new value, backward writes the old one. `Batch` groups commands into a
//! single undo step. Only `CommandHistory` applies commands.

use crate::catalog::GrhIndexRecord;
use crate::world::{Exit, GridError, Layer, MapGrid, TilePos};

/// Old and new value of one tile field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

impl<T: Copy + PartialEq> Change<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }

    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    fn pick(&self, dir: Direction) -> T {
        match dir {
            Direction::Forward => self.new,
            Direction::Backward => self.old,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// A single undoable edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    BlockToggle { at: TilePos, change: Change<bool> },
    /// 0 removes the NPC
    NpcChange { at: TilePos, change: Change<u32> },
    /// 0 removes the object
    ObjChange { at: TilePos, change: Change<u32> },
    ObjAmountChange { at: TilePos, change: Change<u32> },
    TriggerChange { at: TilePos, change: Change<u32> },
    ParticleChange { at: TilePos, change: Change<u32> },
    /// Map, x and y of the exit are always written together
    TransferChange { at: TilePos, change: Change<Exit> },
    LayerGraphicChange { at: TilePos, layer: Layer, change: Change<u32> },
    /// Several edits undone and redone as one step
    Batch { label: String, commands: Vec<Command> },
}

impl Command {
    pub fn set_blocked(grid: &MapGrid, x: i64, y: i64, blocked: bool) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).blocked();
        Ok(Command::BlockToggle { at, change: Change::new(old, blocked) })
    }

    /// Flip the blocked flag of a tile
    pub fn toggle_blocked(grid: &MapGrid, x: i64, y: i64) -> Result<Command, GridError> {
        let blocked = grid.tile(x, y)?.blocked();
        Self::set_blocked(grid, x, y, !blocked)
    }

    pub fn set_npc(grid: &MapGrid, x: i64, y: i64, npc: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).npc();
        Ok(Command::NpcChange { at, change: Change::new(old, npc) })
    }

    pub fn set_obj(grid: &MapGrid, x: i64, y: i64, obj_index: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).obj_index();
        Ok(Command::ObjChange { at, change: Change::new(old, obj_index) })
    }

    pub fn set_obj_amount(grid: &MapGrid, x: i64, y: i64, amount: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).obj_amount();
        Ok(Command::ObjAmountChange { at, change: Change::new(old, amount) })
    }

    pub fn set_trigger(grid: &MapGrid, x: i64, y: i64, trigger: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).trigger();
        Ok(Command::TriggerChange { at, change: Change::new(old, trigger) })
    }

    pub fn set_particle(grid: &MapGrid, x: i64, y: i64, particle: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).particle();
        Ok(Command::ParticleChange { at, change: Change::new(old, particle) })
    }

    pub fn set_exit(grid: &MapGrid, x: i64, y: i64, exit: Exit) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).exit();
        Ok(Command::TransferChange { at, change: Change::new(old, exit) })
    }

    pub fn set_layer(grid: &MapGrid, x: i64, y: i64, layer: Layer, grh: u32) -> Result<Command, GridError> {
        let at = grid.target(x, y)?;
        let old = grid.tile_at(at).layer(layer);
        Ok(Command::LayerGraphicChange { at, layer, change: Change::new(old, grh) })
    }

    /// Place a catalog graphic on its layer, blocking the tile if the record asks for it
    ///
    /// Records with an invalid layer are placed on layer 1.
    pub fn place_graphic(
        grid: &MapGrid,
        x: i64,
        y: i64,
        record: &GrhIndexRecord,
    ) -> Result<Command, GridError> {
        let layer = record.target_layer().unwrap_or(Layer::L1);
        let mut commands = vec![Self::set_layer(grid, x, y, layer, record.grh_index)?];
        if record.auto_block {
            commands.push(Self::set_blocked(grid, x, y, true)?);
        }
        Ok(Command::batch(format!("Place {}", record.name), commands))
    }

    /// Group commands into one undo step
    pub fn batch(label: impl Into<String>, commands: Vec<Command>) -> Command {
        Command::Batch { label: label.into(), commands }
    }

    /// Name shown in the history panel
    pub fn label(&self) -> &str {
        match self {
            Command::BlockToggle { .. } => "Block",
            Command::NpcChange { .. } => "NPC",
            Command::ObjChange { .. } => "Object",
            Command::ObjAmountChange { .. } => "Object amount",
            Command::TriggerChange { .. } => "Trigger",
            Command::ParticleChange { .. } => "Particle",
            Command::TransferChange { .. } => "Transfer",
            Command::LayerGraphicChange { .. } => "Tile",
            Command::Batch { label, .. } => label,
        }
    }

    fn position(&self) -> Option<TilePos> {
        match self {
            Command::BlockToggle { at, .. }
            | Command::NpcChange { at, .. }
            | Command::ObjChange { at, .. }
            | Command::ObjAmountChange { at, .. }
            | Command::TriggerChange { at, .. }
            | Command::ParticleChange { at, .. }
            | Command::TransferChange { at, .. }
            | Command::LayerGraphicChange { at, .. } => Some(*at),
            Command::Batch { .. } => None,
        }
    }

    /// Visit every single-field write, depth first
    fn for_each_write<F: FnMut(&Command)>(&self, f: &mut F) {
        match self {
            Command::Batch { commands, .. } => {
                for cmd in commands {
                    cmd.for_each_write(f);
                }
            }
            write => f(write),
        }
    }

    /// Number of single-field writes
    pub fn len(&self) -> usize {
        let mut n = 0;
        self.for_each_write(&mut |_| n += 1);
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if applying the command would not change anything
    pub fn is_noop(&self) -> bool {
        let mut noop = true;
        self.for_each_write(&mut |cmd| {
            noop &= match cmd {
                Command::BlockToggle { change, .. } => change.is_noop(),
                Command::NpcChange { change, .. }
                | Command::ObjChange { change, .. }
                | Command::ObjAmountChange { change, .. }
                | Command::TriggerChange { change, .. }
                | Command::ParticleChange { change, .. }
                | Command::LayerGraphicChange { change, .. } => change.is_noop(),
                Command::TransferChange { change, .. } => change.is_noop(),
                Command::Batch { .. } => true,
            };
        });
        noop
    }

    /// True if every write addresses the given map
    pub fn targets_map(&self, map_id: u32) -> bool {
        let mut same = true;
        self.for_each_write(&mut |cmd| {
            if let Some(at) = cmd.position() {
                same &= at.map_id() == map_id;
            }
        });
        same
    }

    /// True if every write was addressed against a grid with this map id and size
    pub fn targets_grid(&self, grid: &MapGrid) -> bool {
        let mut same = true;
        self.for_each_write(&mut |cmd| {
            if let Some(at) = cmd.position() {
                same &= grid.owns(at);
            }
        });
        same
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of the touched tiles
    pub fn affected_bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        self.for_each_write(&mut |cmd| {
            if let Some(at) = cmd.position() {
                let (x, y) = (at.x(), at.y());
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        });
        bounds
    }

    pub(crate) fn apply_forward(&self, grid: &mut MapGrid) {
        self.apply(grid, Direction::Forward);
    }

    pub(crate) fn apply_backward(&self, grid: &mut MapGrid) {
        self.apply(grid, Direction::Backward);
    }

    fn apply(&self, grid: &mut MapGrid, dir: Direction) {
        match self {
            Command::BlockToggle { at, change } => grid.tile_at_mut(*at).set_blocked(change.pick(dir)),
            Command::NpcChange { at, change } => grid.tile_at_mut(*at).set_npc(change.pick(dir)),
            Command::ObjChange { at, change } => grid.tile_at_mut(*at).set_obj_index(change.pick(dir)),
            Command::ObjAmountChange { at, change } => {
                grid.tile_at_mut(*at).set_obj_amount(change.pick(dir))
            }
            Command::TriggerChange { at, change } => grid.tile_at_mut(*at).set_trigger(change.pick(dir)),
            Command::ParticleChange { at, change } => {
                grid.tile_at_mut(*at).set_particle(change.pick(dir))
            }
            Command::TransferChange { at, change } => grid.tile_at_mut(*at).set_exit(change.pick(dir)),
            Command::LayerGraphicChange { at, layer, change } => {
                grid.tile_at_mut(*at).set_layer(*layer, change.pick(dir))
            }
            Command::Batch { commands, .. } => match dir {
                Direction::Forward => {
                    for cmd in commands {
                        cmd.apply(grid, dir);
                    }
                }
                // Reverse order so overlapping writes restore the oldest value
                Direction::Backward => {
                    for cmd in commands.iter().rev() {
                        cmd.apply(grid, dir);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_rejects_out_of_bounds() {
        let grid = MapGrid::new(1, 4, 4);
        assert!(matches!(
            Command::set_blocked(&grid, 4, 0, true),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(Command::set_exit(&grid, 0, -1, Exit::new(2, 3, 4)).is_err());
        assert!(Command::set_layer(&grid, 3, 3, Layer::L4, 12).is_ok());
    }

    #[test]
    fn test_forward_backward_single_field() {
        let mut grid = MapGrid::new(1, 4, 4);
        let cmd = Command::set_npc(&grid, 2, 1, 33).unwrap();

        cmd.apply_forward(&mut grid);
        assert_eq!(grid.tile(2, 1).unwrap().npc(), 33);
        cmd.apply_backward(&mut grid);
        assert_eq!(grid.tile(2, 1).unwrap().npc(), 0);
    }

    #[test]
    fn test_transfer_writes_whole_triple() {
        let mut grid = MapGrid::new(1, 4, 4);
        let first = Command::set_exit(&grid, 1, 1, Exit::new(5, 10, 20)).unwrap();
        first.apply_forward(&mut grid);

        let second = Command::set_exit(&grid, 1, 1, Exit::new(6, 0, 0)).unwrap();
        second.apply_forward(&mut grid);
        assert_eq!(grid.tile(1, 1).unwrap().exit(), Exit::new(6, 0, 0));

        second.apply_backward(&mut grid);
        assert_eq!(grid.tile(1, 1).unwrap().exit(), Exit::new(5, 10, 20));
    }

    #[test]
    fn test_batch_backward_runs_in_reverse() {
        let mut grid = MapGrid::new(1, 4, 4);
        let at = grid.target(0, 0).unwrap();
        // Two writes to the same field: undo must end at the first old value
        let batch = Command::batch(
            "twice",
            vec![
                Command::TriggerChange { at, change: Change::new(0, 1) },
                Command::TriggerChange { at, change: Change::new(1, 2) },
            ],
        );

        batch.apply_forward(&mut grid);
        assert_eq!(grid.tile(0, 0).unwrap().trigger(), 2);
        batch.apply_backward(&mut grid);
        assert_eq!(grid.tile(0, 0).unwrap().trigger(), 0);
    }

    #[test]
    fn test_place_graphic_auto_block() {
        let mut grid = MapGrid::new(1, 4, 4);
        let wall = GrhIndexRecord::new("Stone Wall", 100).on_layer(3).auto_block(true);
        let cmd = Command::place_graphic(&grid, 2, 2, &wall).unwrap();

        assert_eq!(cmd.len(), 2);
        assert_eq!(cmd.label(), "Place Stone Wall");
        cmd.apply_forward(&mut grid);
        let tile = grid.tile(2, 2).unwrap();
        assert_eq!(tile.layer(Layer::L3), 100);
        assert!(tile.blocked());
    }

    #[test]
    fn test_noop_and_bounds() {
        let grid = MapGrid::new(1, 8, 8);
        assert!(Command::set_trigger(&grid, 1, 1, 0).unwrap().is_noop());

        let batch = Command::batch(
            "area",
            vec![
                Command::set_trigger(&grid, 1, 5, 0).unwrap(),
                Command::set_particle(&grid, 6, 2, 4).unwrap(),
            ],
        );
        assert!(!batch.is_noop());
        assert_eq!(batch.affected_bounds(), Some((1, 2, 6, 5)));
        assert!(batch.targets_map(1));
        assert!(!batch.targets_map(2));
        assert!(batch.targets_grid(&grid));
        assert!(!batch.targets_grid(&MapGrid::new(1, 4, 4)));
        assert_eq!(Command::batch("empty", vec![]).affected_bounds(), None);
    }
}
