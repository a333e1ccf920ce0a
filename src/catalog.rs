//! GRH catalog - named graphics grouped by category
//!
//! The catalog is a palette for the editor: each record names a GRH index,
//! the layer it is normally placed on, and whether placing it should block
//! the tile. Stored as a JSON list of categories.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::world::Layer;

/// Error type for catalog loading and saving
#[derive(Debug)]
pub enum CatalogError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    SerializeError(serde_json::Error),
    ValidationError(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::IoError(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "IO error: {}", e),
            CatalogError::ParseError(e) => write!(f, "Parse error: {}", e),
            CatalogError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            CatalogError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

fn default_one() -> u32 {
    1
}

/// A single named graphic in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrhIndexRecord {
    pub name: String,
    pub grh_index: u32,
    /// Layer the graphic is placed on (1-4)
    #[serde(default = "default_one")]
    pub layer: u32,
    /// Placing this graphic also blocks the tile
    #[serde(default)]
    pub auto_block: bool,
    /// Footprint in tiles
    #[serde(default = "default_one")]
    pub width: u32,
    #[serde(default = "default_one")]
    pub height: u32,
}

impl GrhIndexRecord {
    pub fn new(name: impl Into<String>, grh_index: u32) -> Self {
        Self {
            name: name.into(),
            grh_index,
            layer: 1,
            auto_block: false,
            width: 1,
            height: 1,
        }
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn auto_block(mut self, auto_block: bool) -> Self {
        self.auto_block = auto_block;
        self
    }

    /// The record's layer, if it is a valid one
    pub fn target_layer(&self) -> Option<Layer> {
        Layer::new(self.layer)
    }
}

/// A named group of records
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrhCategory {
    pub name: String,
    #[serde(default)]
    pub records: Vec<GrhIndexRecord>,
}

impl GrhCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }
}

/// Ordered list of categories. Read-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrhCatalog {
    pub categories: Vec<GrhCategory>,
}

impl GrhCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed library written the first time the editor runs
    pub fn default_library() -> Self {
        let mut surfaces = GrhCategory::new("Surfaces");
        surfaces.records.push(GrhIndexRecord::new("Grass 1", 1));
        surfaces.records.push(GrhIndexRecord::new("Grass 2", 2));

        let mut walls = GrhCategory::new("Walls");
        walls
            .records
            .push(GrhIndexRecord::new("Stone Wall", 100).on_layer(3).auto_block(true));

        Self {
            categories: vec![surfaces, walls, GrhCategory::new("Decoration")],
        }
    }

    /// Find the first record for a GRH index (0 never matches)
    pub fn find(&self, grh_index: u32) -> Option<&GrhIndexRecord> {
        if grh_index == 0 {
            return None;
        }
        self.categories
            .iter()
            .flat_map(|c| c.records.iter())
            .find(|r| r.grh_index == grh_index)
    }

    pub fn category(&self, name: &str) -> Option<&GrhCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Add a category unless one with the same name exists
    pub fn add_category(&mut self, name: impl Into<String>) -> &mut GrhCategory {
        let name = name.into();
        let idx = match self.categories.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.categories.push(GrhCategory::new(name));
                self.categories.len() - 1
            }
        };
        &mut self.categories[idx]
    }

    /// Append a record to a category, creating the category if needed
    pub fn add_record(&mut self, category: &str, record: GrhIndexRecord) -> Result<(), CatalogError> {
        validate_record(&record, category)?;
        self.add_category(category).records.push(record);
        Ok(())
    }

    /// Remove a record by name; returns the removed record
    pub fn remove_record(&mut self, category: &str, name: &str) -> Option<GrhIndexRecord> {
        let cat = self.categories.iter_mut().find(|c| c.name == category)?;
        let idx = cat.records.iter().position(|r| r.name == name)?;
        Some(cat.records.remove(idx))
    }

    pub fn record_count(&self) -> usize {
        self.categories.iter().map(|c| c.records.len()).sum()
    }

    /// Parse a catalog from JSON text and validate it
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let catalog: GrhCatalog = serde_json::from_str(s).map_err(CatalogError::ParseError)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(CatalogError::SerializeError)
    }

    /// Load a catalog file. Either the whole file is accepted or an error is returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load a catalog, writing the default library first if the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            let catalog = Self::default_library();
            catalog.save(path)?;
            info!(path = %path.display(), "created default GRH catalog");
            return Ok(catalog);
        }
        Self::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let contents = self.to_json_string()?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for cat in &self.categories {
            for record in &cat.records {
                validate_record(record, &cat.name)?;
            }
        }
        Ok(())
    }
}

fn validate_record(record: &GrhIndexRecord, category: &str) -> Result<(), CatalogError> {
    if record.target_layer().is_none() {
        return Err(CatalogError::ValidationError(format!(
            "{} / {}: invalid layer {}",
            category, record.name, record.layer
        )));
    }
    if record.width == 0 || record.height == 0 {
        return Err(CatalogError::ValidationError(format!(
            "{} / {}: empty footprint {}x{}",
            category, record.name, record.width, record.height
        )));
    }
    Ok(())
}
