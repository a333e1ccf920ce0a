//! Map exits (transfers)
//!
//! `TransferStaging` is a single-slot register: the user captures a
//! destination on one map and consumes it when placing an exit, possibly on
//! another map. `TransferTool` turns clicks into `TransferChange` commands.

use super::command::Command;
use super::context::MapContext;
use super::history::HistoryError;
use crate::world::{Exit, GridError};

/// Valid destination range for exits
pub mod limits {
    pub const MIN_MAP: u32 = 1;
    pub const MAX_MAP: u32 = 9000;
    pub const MIN_COORD: u32 = 1;
    pub const MAX_COORD: u32 = 100;
}

/// Pending exit destination. Capturing overwrites, consuming clears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferStaging {
    pending: Option<Exit>,
}

impl TransferStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a destination, replacing any pending one
    pub fn capture(&mut self, map: u32, x: u32, y: u32) {
        self.pending = Some(Exit::new(map, x, y));
    }

    /// Take the pending destination, leaving the slot empty
    pub fn consume(&mut self) -> Option<Exit> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<Exit> {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Error type for the transfer tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    InvalidDestination(Exit),
    Grid(GridError),
    History(HistoryError),
}

impl From<GridError> for TransferError {
    fn from(e: GridError) -> Self {
        TransferError::Grid(e)
    }
}

impl From<HistoryError> for TransferError {
    fn from(e: HistoryError) -> Self {
        TransferError::History(e)
    }
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::InvalidDestination(e) => {
                write!(f, "invalid destination: map {} ({}, {})", e.map, e.x, e.y)
            }
            TransferError::Grid(e) => write!(f, "{}", e),
            TransferError::History(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransferError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Insert,
    Remove,
}

/// Neighbouring maps for edge auto-union
///
/// `None` leaves an edge alone, `Some(0)` clears its exits,
/// `Some(map)` links it to `map`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeLinks {
    pub north: Option<u32>,
    pub south: Option<u32>,
    pub east: Option<u32>,
    pub west: Option<u32>,
}

/// Exit placement tool
#[derive(Debug, Clone)]
pub struct TransferTool {
    pub mode: TransferMode,
    destination: Exit,
    /// Mirror the clicked edge position onto the destination map
    pub manual_union: bool,
    view_half_width: u32,
    view_half_height: u32,
}

impl TransferTool {
    /// `view_half_*` is half the client view in tiles; map borders inside it are unwalkable
    pub fn new(view_half_width: u32, view_half_height: u32) -> Self {
        Self {
            mode: TransferMode::Insert,
            destination: Exit::NONE,
            manual_union: false,
            view_half_width,
            view_half_height,
        }
    }

    pub fn destination(&self) -> Exit {
        self.destination
    }

    pub fn set_destination(&mut self, destination: Exit) {
        self.destination = destination;
    }

    /// Use the staged destination. An empty register leaves the destination unset.
    pub fn take_staged(&mut self, staging: &mut TransferStaging) {
        self.destination = staging.consume().unwrap_or(Exit::NONE);
    }

    pub fn validate_destination(&self) -> Result<(), TransferError> {
        let d = self.destination;
        let map_ok = (limits::MIN_MAP..=limits::MAX_MAP).contains(&d.map);
        let coord_ok = |c: u32| (limits::MIN_COORD..=limits::MAX_COORD).contains(&c);
        if map_ok && coord_ok(d.x) && coord_ok(d.y) {
            Ok(())
        } else {
            Err(TransferError::InvalidDestination(d))
        }
    }

    /// Insert or remove an exit at (x, y). Returns true if the map changed.
    pub fn apply_at(&self, ctx: &mut MapContext, x: i64, y: i64) -> Result<bool, TransferError> {
        let target = match self.mode {
            TransferMode::Insert => {
                self.validate_destination()?;
                if self.manual_union {
                    self.mirrored_destination(ctx, x, y)
                } else {
                    self.destination
                }
            }
            TransferMode::Remove => Exit::NONE,
        };

        let cmd = Command::set_exit(ctx.grid(), x, y, target)?;
        if cmd.is_noop() {
            return Ok(false);
        }
        ctx.execute(cmd)?;
        Ok(true)
    }

    /// Destination for a tile on a map edge: the opposite edge of the target map
    fn mirrored_destination(&self, ctx: &MapContext, x: i64, y: i64) -> Exit {
        let width = ctx.grid().width() as i64;
        let height = ctx.grid().height() as i64;
        let half_w = self.view_half_width as i64;
        let half_h = self.view_half_height as i64;

        let border_right = width - half_w + 1;
        let border_left = half_w;
        let border_bottom = height - half_h + 1;
        let border_top = half_h;

        let mut dest_x = self.destination.x as i64;
        let mut dest_y = self.destination.y as i64;

        if x >= border_right {
            dest_x = border_left + 1;
            dest_y = y;
        } else if x <= border_left {
            dest_x = border_right;
            dest_y = y;
        }

        if y >= border_bottom {
            dest_y = border_top + 1;
            dest_x = x;
        } else if y <= border_top {
            dest_y = border_bottom - 1;
            dest_x = x;
        }

        Exit::new(self.destination.map, dest_x.max(0) as u32, dest_y.max(0) as u32)
    }

    /// Link map edges to neighbouring maps
    ///
    /// Exits go on the first walkable line inside the view border, pointing at
    /// the mirrored line of the neighbour. All edits form one undo step.
    /// Returns the number of tiles whose exit changed.
    pub fn auto_union(&self, ctx: &mut MapContext, links: EdgeLinks) -> Result<usize, TransferError> {
        let grid = ctx.grid();
        let width = grid.width() as i64;
        let height = grid.height() as i64;
        let half_w = self.view_half_width as i64;
        let half_h = self.view_half_height as i64;

        let trigger_x_west = half_w + 1;
        let trigger_x_east = width - 1 - half_w - 1;
        let trigger_y_north = half_h + 1;
        let trigger_y_south = height - 1 - half_h - 1;

        let mut commands = Vec::new();
        let mut link_line = |map: Option<u32>, tiles: Vec<(i64, i64)>, dest: &dyn Fn(i64, i64) -> (i64, i64)| -> Result<(), TransferError> {
            let Some(map) = map else {
                return Ok(());
            };
            for (x, y) in tiles {
                if grid.tile(x, y)?.blocked() {
                    continue;
                }
                let exit = if map == 0 {
                    Exit::NONE
                } else {
                    let (dx, dy) = dest(x, y);
                    Exit::new(map, dx as u32, dy as u32)
                };
                let cmd = Command::set_exit(grid, x, y, exit)?;
                if !cmd.is_noop() {
                    commands.push(cmd);
                }
            }
            Ok(())
        };

        let row = |y: i64| (0..width).map(|x| (x, y)).collect::<Vec<_>>();
        let column = |x: i64| (0..height).map(|y| (x, y)).collect::<Vec<_>>();

        link_line(links.north, row(trigger_y_north), &|x, _| (x, trigger_y_south))?;
        link_line(links.south, row(trigger_y_south), &|x, _| (x, trigger_y_north))?;
        link_line(links.east, column(trigger_x_east), &|_, y| (trigger_x_west, y))?;
        link_line(links.west, column(trigger_x_west), &|_, y| (trigger_x_east, y))?;

        let changed = commands.len();
        if changed > 0 {
            ctx.execute(Command::batch("Auto-union", commands))?;
        }
        Ok(changed)
    }
}
