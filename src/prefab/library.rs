//! Prefab Library - discovery and management of prefab files
//!
//! Each prefab lives in `<dir>/<sanitized name>.json`. The in-memory list
//! mirrors the directory after `discover()` and stays in sync through
//! `save`, `delete` and `update`.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::io::{load_prefab, save_prefab, PrefabError};
use super::model::Prefab;

/// Directory where prefabs are stored
pub const PREFABS_DIR: &str = "assets/prefabs";

/// File name for a prefab: characters outside `[a-zA-Z0-9.-]` become `_`
pub fn prefab_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}.json", stem)
}

/// A library of prefabs backed by a directory
#[derive(Debug)]
pub struct PrefabLibrary {
    prefabs: Vec<Prefab>,
    base_dir: PathBuf,
}

impl Default for PrefabLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefabLibrary {
    pub fn new() -> Self {
        Self::with_dir(PREFABS_DIR)
    }

    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefabs: Vec::new(),
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load every `*.json` prefab in the directory, replacing the current list
    ///
    /// Files that fail to load are logged and skipped. A missing directory is
    /// created. Returns the number of prefabs loaded.
    pub fn discover(&mut self) -> Result<usize, PrefabError> {
        self.prefabs.clear();

        if !self.base_dir.exists() {
            std::fs::create_dir_all(&self.base_dir)?;
            return Ok(0);
        }

        let mut entries: Vec<_> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext.to_ascii_lowercase() == "json")
                    .unwrap_or(false)
            })
            .collect();
        entries.sort();

        for path in entries {
            match load_prefab(&path) {
                Ok(prefab) => {
                    if self.contains(&prefab.name) {
                        warn!(path = %path.display(), name = %prefab.name, "duplicate prefab name, skipping");
                        continue;
                    }
                    self.prefabs.push(prefab);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load prefab");
                }
            }
        }

        info!(dir = %self.base_dir.display(), count = self.prefabs.len(), "prefabs discovered");
        Ok(self.prefabs.len())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(prefab_file_name(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.prefabs.iter().position(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Write a prefab to disk, replacing any prefab with the same name
    pub fn save(&mut self, prefab: Prefab) -> Result<PathBuf, PrefabError> {
        if prefab.name.trim().is_empty() {
            return Err(PrefabError::MissingName);
        }
        std::fs::create_dir_all(&self.base_dir)?;

        let path = self.path_for(&prefab.name);
        if self
            .prefabs
            .iter()
            .any(|p| p.name != prefab.name && self.path_for(&p.name) == path)
        {
            return Err(PrefabError::AlreadyExists(prefab.name));
        }
        save_prefab(&prefab, &path)?;
        info!(name = %prefab.name, path = %path.display(), "saved prefab");

        match self.position(&prefab.name) {
            Some(i) => self.prefabs[i] = prefab,
            None => self.prefabs.push(prefab),
        }
        Ok(path)
    }

    /// Remove a prefab and its file. Returns false if no such prefab is loaded.
    pub fn delete(&mut self, name: &str) -> Result<bool, PrefabError> {
        let Some(i) = self.position(name) else {
            return Ok(false);
        };
        let path = self.path_for(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        self.prefabs.remove(i);
        info!(name, "deleted prefab");
        Ok(true)
    }

    /// Rename and/or recategorize a prefab, moving its file if the name changes
    pub fn update(
        &mut self,
        old_name: &str,
        new_name: &str,
        new_category: &str,
    ) -> Result<(), PrefabError> {
        let i = self
            .position(old_name)
            .ok_or_else(|| PrefabError::NotFound(old_name.to_string()))?;
        if new_name.trim().is_empty() {
            return Err(PrefabError::MissingName);
        }

        let old_path = self.path_for(old_name);
        let new_path = self.path_for(new_name);
        if new_name != old_name
            && (self.contains(new_name) || (new_path != old_path && new_path.exists()))
        {
            return Err(PrefabError::AlreadyExists(new_name.to_string()));
        }

        let mut prefab = self.prefabs[i].clone();
        prefab.name = new_name.to_string();
        prefab.category = new_category.to_string();
        save_prefab(&prefab, &new_path)?;
        if new_path != old_path && old_path.exists() {
            std::fs::remove_file(&old_path)?;
        }

        self.prefabs[i] = prefab;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Prefab> {
        self.prefabs.iter().find(|p| p.name == name)
    }

    /// All loaded prefabs
    pub fn all(&self) -> &[Prefab] {
        &self.prefabs
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut cats: Vec<&str> = self
            .prefabs
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        cats.sort_unstable();
        cats.dedup();
        cats
    }

    /// Prefabs in a category; an empty category means all prefabs
    pub fn by_category(&self, category: &str) -> Vec<&Prefab> {
        self.prefabs
            .iter()
            .filter(|p| category.is_empty() || p.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefab::PrefabCell;
    use tempfile::TempDir;

    fn prefab(name: &str, category: &str) -> Prefab {
        let mut p = Prefab::new(name, category, 1, 1);
        let mut cell = PrefabCell::new(0, 0);
        cell.blocked = true;
        p.cells.push(cell);
        p
    }

    #[test]
    fn test_file_name_sanitized() {
        assert_eq!(prefab_file_name("Big House #2"), "Big_House__2.json");
        assert_eq!(prefab_file_name("tree-1.v2"), "tree-1.v2.json");
        assert_eq!(prefab_file_name("../evil"), ".._evil.json");
    }

    #[test]
    fn test_save_discover_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        lib.save(prefab("Tree", "Nature")).unwrap();
        lib.save(prefab("Rock", "Nature")).unwrap();
        lib.save(prefab("Hut", "Buildings")).unwrap();

        let mut reloaded = PrefabLibrary::with_dir(dir.path());
        assert_eq!(reloaded.discover().unwrap(), 3);
        assert_eq!(reloaded.get("Tree"), lib.get("Tree"));
        assert_eq!(reloaded.categories(), vec!["Buildings", "Nature"]);
        assert_eq!(reloaded.by_category("Nature").len(), 2);
        assert_eq!(reloaded.by_category("").len(), 3);
    }

    #[test]
    fn test_discover_skips_broken_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        lib.save(prefab("Good", "")).unwrap();

        let mut reloaded = PrefabLibrary::with_dir(dir.path());
        assert_eq!(reloaded.discover().unwrap(), 1);
        assert!(reloaded.contains("Good"));
    }

    #[test]
    fn test_discover_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("prefabs");
        let mut lib = PrefabLibrary::with_dir(&sub);
        assert_eq!(lib.discover().unwrap(), 0);
        assert!(sub.is_dir());
    }

    #[test]
    fn test_save_requires_name_and_replaces() {
        let dir = TempDir::new().unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        assert!(matches!(lib.save(prefab("  ", "")), Err(PrefabError::MissingName)));

        lib.save(prefab("Tree", "A")).unwrap();
        lib.save(prefab("Tree", "B")).unwrap();
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("Tree").unwrap().category, "B");
    }

    #[test]
    fn test_save_rejects_file_name_collision() {
        let dir = TempDir::new().unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        lib.save(prefab("A B", "First")).unwrap();

        assert!(matches!(lib.save(prefab("A_B", "Second")), Err(PrefabError::AlreadyExists(_))));
        assert_eq!(lib.len(), 1);

        let mut reloaded = PrefabLibrary::with_dir(dir.path());
        assert_eq!(reloaded.discover().unwrap(), 1);
        assert_eq!(reloaded.get("A B").unwrap().category, "First");
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        let path = lib.save(prefab("Tree", "")).unwrap();
        assert!(path.exists());

        assert!(lib.delete("Tree").unwrap());
        assert!(!path.exists());
        assert!(lib.is_empty());
        assert!(!lib.delete("Tree").unwrap());
    }

    #[test]
    fn test_update_renames_file() {
        let dir = TempDir::new().unwrap();
        let mut lib = PrefabLibrary::with_dir(dir.path());
        let old_path = lib.save(prefab("Tree", "Nature")).unwrap();
        lib.save(prefab("Rock", "Nature")).unwrap();

        lib.update("Tree", "Oak Tree", "Forest").unwrap();
        assert!(!old_path.exists());
        assert!(dir.path().join("Oak_Tree.json").exists());
        assert_eq!(lib.get("Oak Tree").unwrap().category, "Forest");
        assert!(lib.get("Tree").is_none());

        assert!(matches!(
            lib.update("Oak Tree", "Rock", "Forest"),
            Err(PrefabError::AlreadyExists(_))
        ));
        assert!(matches!(lib.update("Missing", "X", ""), Err(PrefabError::NotFound(_))));

        lib.update("Rock", "Rock", "Stones").unwrap();
        assert_eq!(lib.get("Rock").unwrap().category, "Stones");
    }
}
