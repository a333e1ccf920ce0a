//! Stamp a prefab onto a map as one undoable step

use tracing::debug;

use super::model::{Prefab, PrefabCell, PrefabFeatures};
use crate::editor::{Change, Command, HistoryError, MapContext};
use crate::world::{Layer, MapGrid, TilePos};

/// Build the batch that writes `prefab` with its origin at (dest_x, dest_y)
///
/// Only features enabled both in the prefab and in `features` are written;
/// selected fields are written even when the cell value is zero. Cells that
/// land outside the grid are skipped. Returns the command together with the
/// number of cells that landed inside the grid.
pub fn build_apply(
    grid: &MapGrid,
    dest_x: i64,
    dest_y: i64,
    prefab: &Prefab,
    features: PrefabFeatures,
) -> (Command, usize) {
    let effective = prefab.features.intersect(&features);
    let mut commands = Vec::new();
    let mut placed = 0;

    for cell in &prefab.cells {
        let Ok(at) = grid.target(dest_x + cell.x as i64, dest_y + cell.y as i64) else {
            continue;
        };
        placed += 1;
        cell_writes(grid, at, cell, &effective, &mut commands);
    }

    let label = if prefab.name.is_empty() {
        "Paste prefab".to_string()
    } else {
        format!("Paste {}", prefab.name)
    };
    (Command::batch(label, commands), placed)
}

fn cell_writes(
    grid: &MapGrid,
    at: TilePos,
    cell: &PrefabCell,
    features: &PrefabFeatures,
    out: &mut Vec<Command>,
) {
    let tile = grid.tile_at(at);
    let mut push = |cmd: Command| {
        if !cmd.is_noop() {
            out.push(cmd);
        }
    };

    for layer in Layer::ALL {
        if features.layer(layer) {
            push(Command::LayerGraphicChange {
                at,
                layer,
                change: Change::new(tile.layer(layer), cell.layer(layer)),
            });
        }
    }
    if features.block {
        push(Command::BlockToggle { at, change: Change::new(tile.blocked(), cell.blocked) });
    }
    if features.triggers {
        push(Command::TriggerChange { at, change: Change::new(tile.trigger(), cell.trigger) });
    }
    if features.objects {
        push(Command::ObjChange { at, change: Change::new(tile.obj_index(), cell.obj_index) });
        push(Command::ObjAmountChange {
            at,
            change: Change::new(tile.obj_amount(), cell.obj_amount),
        });
    }
    if features.npcs {
        push(Command::NpcChange { at, change: Change::new(tile.npc(), cell.npc_index) });
    }
    if features.particles {
        push(Command::ParticleChange {
            at,
            change: Change::new(tile.particle(), cell.particle_index),
        });
    }
}

/// Apply a prefab through the context's history
///
/// Nothing is pushed when every write would be a no-op. Returns the number
/// of prefab cells that landed inside the grid.
pub fn apply(
    ctx: &mut MapContext,
    dest_x: i64,
    dest_y: i64,
    prefab: &Prefab,
    features: PrefabFeatures,
) -> Result<usize, HistoryError> {
    let (cmd, placed) = build_apply(ctx.grid(), dest_x, dest_y, prefab, features);
    if cmd.is_empty() {
        debug!(prefab = %prefab.name, placed, "prefab apply changed nothing");
        return Ok(placed);
    }
    debug!(prefab = %prefab.name, placed, writes = cmd.len(), "applying prefab");
    ctx.execute(cmd)?;
    Ok(placed)
}

/// Apply with the prefab centre on (anchor_x, anchor_y), as when pasting at the cursor
pub fn apply_centered(
    ctx: &mut MapContext,
    anchor_x: i64,
    anchor_y: i64,
    prefab: &Prefab,
    features: PrefabFeatures,
) -> Result<usize, HistoryError> {
    let (dest_x, dest_y) = centered_origin(anchor_x, anchor_y, prefab);
    apply(ctx, dest_x, dest_y, prefab, features)
}

/// Origin that puts the prefab centre (width/2, height/2) on the anchor
pub fn centered_origin(anchor_x: i64, anchor_y: i64, prefab: &Prefab) -> (i64, i64) {
    (anchor_x - (prefab.width / 2) as i64, anchor_y - (prefab.height / 2) as i64)
}
