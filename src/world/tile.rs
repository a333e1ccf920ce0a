//! Tile - one cell of map state
//!
//! Tiles only store references (GRH indices, NPC/object ids, exits).
//! Graphic data lives in the GRH catalog and is resolved by the renderer.

use serde::{Deserialize, Serialize};

/// Graphic layer of a tile (1-4, ground to roof)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer(u8);

impl Layer {
    pub const L1: Layer = Layer(1);
    pub const L2: Layer = Layer(2);
    pub const L3: Layer = Layer(3);
    pub const L4: Layer = Layer(4);

    /// All layers, bottom to top
    pub const ALL: [Layer; 4] = [Layer::L1, Layer::L2, Layer::L3, Layer::L4];

    /// Create a layer from its 1-based number
    pub fn new(n: u32) -> Option<Layer> {
        match n {
            1..=4 => Some(Layer(n as u8)),
            _ => None,
        }
    }

    /// 1-based layer number
    pub fn number(self) -> usize {
        self.0 as usize
    }

    /// Index into a tile's 4-slot layer array
    fn slot(self) -> usize {
        self.0 as usize - 1
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer {}", self.0)
    }
}

/// Map exit (transfer). A tile with `map != 0` teleports to (map, x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Exit {
    pub map: u32,
    pub x: u32,
    pub y: u32,
}

impl Exit {
    /// No exit
    pub const NONE: Exit = Exit { map: 0, x: 0, y: 0 };

    pub fn new(map: u32, x: u32, y: u32) -> Self {
        Self { map, x, y }
    }

    pub fn is_set(&self) -> bool {
        self.map != 0
    }
}

/// One cell of a map grid
///
/// Zero means "nothing" for every id field. Setters are crate-private:
/// outside code changes tiles through `editor::Command`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tile {
    blocked: bool,
    npc: u32,
    obj_index: u32,
    obj_amount: u32,
    obj_graphic: u32,
    exit: Exit,
    layers: [u32; 4],
    trigger: u32,
    particle: u32,
}

impl Tile {
    pub fn blocked(&self) -> bool {
        self.blocked
    }

    pub fn npc(&self) -> u32 {
        self.npc
    }

    pub fn obj_index(&self) -> u32 {
        self.obj_index
    }

    pub fn obj_amount(&self) -> u32 {
        self.obj_amount
    }

    /// GRH used to draw the object lying on this tile
    pub fn obj_graphic(&self) -> u32 {
        self.obj_graphic
    }

    pub fn exit(&self) -> Exit {
        self.exit
    }

    pub fn layer(&self, layer: Layer) -> u32 {
        self.layers[layer.slot()]
    }

    pub fn trigger(&self) -> u32 {
        self.trigger
    }

    pub fn particle(&self) -> u32 {
        self.particle
    }

    /// True if every field holds its default value
    pub fn is_empty(&self) -> bool {
        *self == Tile::default()
    }

    pub(crate) fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub(crate) fn set_npc(&mut self, npc: u32) {
        self.npc = npc;
    }

    pub(crate) fn set_obj_index(&mut self, index: u32) {
        self.obj_index = index;
    }

    pub(crate) fn set_obj_amount(&mut self, amount: u32) {
        self.obj_amount = amount;
    }

    pub(crate) fn set_obj_graphic(&mut self, grh: u32) {
        self.obj_graphic = grh;
    }

    /// Exits are always written as a whole (map, x, y) triple
    pub(crate) fn set_exit(&mut self, exit: Exit) {
        self.exit = exit;
    }

    pub(crate) fn set_layer(&mut self, layer: Layer, grh: u32) {
        self.layers[layer.slot()] = grh;
    }

    pub(crate) fn set_trigger(&mut self, trigger: u32) {
        self.trigger = trigger;
    }

    pub(crate) fn set_particle(&mut self, particle: u32) {
        self.particle = particle;
    }
}
