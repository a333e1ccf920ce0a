//! Prefab data model
//!
//! Field names are part of the file format and must stay stable.

use serde::{Deserialize, Serialize};

use crate::world::Layer;

/// Which data classes take part in a capture or apply
///
/// Every flag defaults to `true`, including when missing from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefabFeatures {
    pub layer1: bool,
    pub layer2: bool,
    pub layer3: bool,
    pub layer4: bool,
    pub block: bool,
    pub triggers: bool,
    pub npcs: bool,
    pub objects: bool,
    pub particles: bool,
}

impl Default for PrefabFeatures {
    fn default() -> Self {
        Self::all()
    }
}

impl PrefabFeatures {
    pub fn all() -> Self {
        Self {
            layer1: true,
            layer2: true,
            layer3: true,
            layer4: true,
            block: true,
            triggers: true,
            npcs: true,
            objects: true,
            particles: true,
        }
    }

    pub fn none() -> Self {
        Self {
            layer1: false,
            layer2: false,
            layer3: false,
            layer4: false,
            block: false,
            triggers: false,
            npcs: false,
            objects: false,
            particles: false,
        }
    }

    /// Features enabled in both masks
    pub fn intersect(&self, other: &PrefabFeatures) -> PrefabFeatures {
        Self {
            layer1: self.layer1 && other.layer1,
            layer2: self.layer2 && other.layer2,
            layer3: self.layer3 && other.layer3,
            layer4: self.layer4 && other.layer4,
            block: self.block && other.block,
            triggers: self.triggers && other.triggers,
            npcs: self.npcs && other.npcs,
            objects: self.objects && other.objects,
            particles: self.particles && other.particles,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    pub fn layer(&self, layer: Layer) -> bool {
        match layer.number() {
            1 => self.layer1,
            2 => self.layer2,
            3 => self.layer3,
            _ => self.layer4,
        }
    }

    pub fn set_layer(&mut self, layer: Layer, enabled: bool) {
        match layer.number() {
            1 => self.layer1 = enabled,
            2 => self.layer2 = enabled,
            3 => self.layer3 = enabled,
            _ => self.layer4 = enabled,
        }
    }

    /// Short description like "L1 L3 block npcs"
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for (on, name) in [
            (self.layer1, "L1"),
            (self.layer2, "L2"),
            (self.layer3, "L3"),
            (self.layer4, "L4"),
            (self.block, "block"),
            (self.triggers, "triggers"),
            (self.npcs, "npcs"),
            (self.objects, "objects"),
            (self.particles, "particles"),
        ] {
            if on {
                parts.push(name);
            }
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// One non-empty cell of a prefab, relative to the prefab origin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabCell {
    pub x: u32,
    pub y: u32,
    /// GRH per layer; slot 0 is reserved and always 0, slots 1-4 are layers 1-4
    #[serde(default, alias = "layerGrhs")]
    pub layer_graphics: [u32; 5],
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub trigger: u32,
    #[serde(default)]
    pub obj_index: u32,
    #[serde(default)]
    pub obj_amount: u32,
    #[serde(default)]
    pub npc_index: u32,
    #[serde(default)]
    pub particle_index: u32,
}

impl PrefabCell {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn layer(&self, layer: Layer) -> u32 {
        self.layer_graphics[layer.number()]
    }

    pub fn set_layer(&mut self, layer: Layer, grh: u32) {
        self.layer_graphics[layer.number()] = grh;
    }

    /// True if the cell carries no data (position aside)
    pub fn is_default(&self) -> bool {
        *self == PrefabCell::new(self.x, self.y)
    }
}

/// A named, sparse rectangular snapshot of map cells
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub features: PrefabFeatures,
    #[serde(default, alias = "data")]
    pub cells: Vec<PrefabCell>,
}

impl Prefab {
    pub fn new(name: impl Into<String>, category: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            author: String::new(),
            width,
            height,
            features: PrefabFeatures::all(),
            cells: Vec::new(),
        }
    }

    /// Set the descriptive fields after a capture
    pub fn named(
        mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        self.name = name.into();
        self.category = category.into();
        self.author = author.into();
        self
    }

    pub fn cell_at(&self, x: u32, y: u32) -> Option<&PrefabCell> {
        self.cells.iter().find(|c| c.x == x && c.y == y)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Per-class counts of cells carrying data, for previews
    pub fn stats(&self) -> PrefabStats {
        let mut stats = PrefabStats { cells: self.cells.len(), ..Default::default() };
        for cell in &self.cells {
            for layer in Layer::ALL {
                if cell.layer(layer) != 0 {
                    stats.layers[layer.number() - 1] += 1;
                }
            }
            stats.blocked += cell.blocked as usize;
            stats.triggers += (cell.trigger != 0) as usize;
            stats.objects += (cell.obj_index != 0) as usize;
            stats.npcs += (cell.npc_index != 0) as usize;
            stats.particles += (cell.particle_index != 0) as usize;
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefabStats {
    pub cells: usize,
    pub layers: [usize; 4],
    pub blocked: usize,
    pub triggers: usize,
    pub objects: usize,
    pub npcs: usize,
    pub particles: usize,
}
