//! Capture a map region into a prefab

use super::model::{Prefab, PrefabCell, PrefabFeatures};
use crate::world::{Layer, MapGrid, Tile};

/// Snapshot a rectangle of the grid
///
/// The rectangle is clipped to the grid; cell coordinates stay relative to
/// the requested origin. Only fields enabled in `features` are read, and
/// cells with nothing to store are left out.
pub fn capture(
    grid: &MapGrid,
    origin_x: i64,
    origin_y: i64,
    width: u32,
    height: u32,
    features: PrefabFeatures,
) -> Prefab {
    let mut prefab = Prefab::new("", "", width, height);
    prefab.features = features;

    if features.is_empty() {
        return prefab;
    }

    let Some(region) = grid.clip(origin_x, origin_y, width as usize, height as usize) else {
        return prefab;
    };

    for (x, y) in region.coords() {
        let Ok(tile) = grid.tile(x as i64, y as i64) else {
            continue;
        };
        let rel_x = (x as i64 - origin_x) as u32;
        let rel_y = (y as i64 - origin_y) as u32;
        if let Some(cell) = capture_cell(tile, rel_x, rel_y, &features) {
            prefab.cells.push(cell);
        }
    }

    prefab
}

fn capture_cell(tile: &Tile, x: u32, y: u32, features: &PrefabFeatures) -> Option<PrefabCell> {
    let mut cell = PrefabCell::new(x, y);

    for layer in Layer::ALL {
        if features.layer(layer) {
            cell.set_layer(layer, tile.layer(layer));
        }
    }
    if features.block {
        cell.blocked = tile.blocked();
    }
    if features.triggers {
        cell.trigger = tile.trigger();
    }
    if features.objects {
        cell.obj_index = tile.obj_index();
        cell.obj_amount = tile.obj_amount();
    }
    if features.npcs {
        cell.npc_index = tile.npc();
    }
    if features.particles {
        cell.particle_index = tile.particle();
    }

    (!cell.is_default()).then_some(cell)
}
