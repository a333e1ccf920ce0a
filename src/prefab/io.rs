//! Prefab JSON files
//!
//! One prefab per file, pretty-printed JSON. Loading is all-or-nothing: a
//! file that fails to parse or validate yields an error and no prefab.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::model::Prefab;

/// Validation limits for prefab files
pub mod limits {
    /// Maximum prefab width or height in tiles
    pub const MAX_PREFAB_SIZE: u32 = 512;
    /// Maximum length for name, category and author
    pub const MAX_STRING_LEN: usize = 256;
}

/// Error type for prefab loading, saving and library management
#[derive(Debug)]
pub enum PrefabError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    SerializeError(serde_json::Error),
    ValidationError(String),
    /// Prefabs need a name before they can be stored
    MissingName,
    /// Another prefab already uses this name
    AlreadyExists(String),
    NotFound(String),
}

impl From<std::io::Error> for PrefabError {
    fn from(e: std::io::Error) -> Self {
        PrefabError::IoError(e)
    }
}

impl std::fmt::Display for PrefabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefabError::IoError(e) => write!(f, "IO error: {}", e),
            PrefabError::ParseError(e) => write!(f, "Parse error: {}", e),
            PrefabError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            PrefabError::ValidationError(e) => write!(f, "Validation error: {}", e),
            PrefabError::MissingName => write!(f, "prefab has no name"),
            PrefabError::AlreadyExists(name) => write!(f, "prefab '{}' already exists", name),
            PrefabError::NotFound(name) => write!(f, "prefab '{}' not found", name),
        }
    }
}

impl std::error::Error for PrefabError {}

/// Check a parsed prefab before it is handed out
pub fn validate_prefab(prefab: &Prefab) -> Result<(), PrefabError> {
    if prefab.width > limits::MAX_PREFAB_SIZE || prefab.height > limits::MAX_PREFAB_SIZE {
        return Err(PrefabError::ValidationError(format!(
            "prefab size {}x{} exceeds {}",
            prefab.width, prefab.height, limits::MAX_PREFAB_SIZE
        )));
    }

    for (field, value) in [
        ("name", &prefab.name),
        ("category", &prefab.category),
        ("author", &prefab.author),
    ] {
        if value.len() > limits::MAX_STRING_LEN {
            return Err(PrefabError::ValidationError(format!(
                "{} too long ({} > {})",
                field,
                value.len(),
                limits::MAX_STRING_LEN
            )));
        }
    }

    let mut seen = HashSet::with_capacity(prefab.cells.len());
    for (i, cell) in prefab.cells.iter().enumerate() {
        if cell.x >= prefab.width || cell.y >= prefab.height {
            return Err(PrefabError::ValidationError(format!(
                "cell {} at ({}, {}) outside {}x{}",
                i, cell.x, cell.y, prefab.width, prefab.height
            )));
        }
        if cell.layer_graphics[0] != 0 {
            return Err(PrefabError::ValidationError(format!(
                "cell {} uses reserved layer slot 0",
                i
            )));
        }
        if !seen.insert((cell.x, cell.y)) {
            return Err(PrefabError::ValidationError(format!(
                "duplicate cell at ({}, {})",
                cell.x, cell.y
            )));
        }
    }

    Ok(())
}

/// Parse and validate a prefab from JSON text
pub fn prefab_from_str(s: &str) -> Result<Prefab, PrefabError> {
    let prefab: Prefab = serde_json::from_str(s).map_err(PrefabError::ParseError)?;
    validate_prefab(&prefab)?;
    Ok(prefab)
}

pub fn prefab_to_string(prefab: &Prefab) -> Result<String, PrefabError> {
    serde_json::to_string_pretty(prefab).map_err(PrefabError::SerializeError)
}

pub fn load_prefab<P: AsRef<Path>>(path: P) -> Result<Prefab, PrefabError> {
    let contents = fs::read_to_string(path.as_ref())?;
    prefab_from_str(&contents)
}

pub fn save_prefab<P: AsRef<Path>>(prefab: &Prefab, path: P) -> Result<(), PrefabError> {
    let contents = prefab_to_string(prefab)?;
    fs::write(path, contents)?;
    Ok(())
}
