//! Rule text persistence keyed by document name
//!
//! The engine never touches a store; front ends use one to keep the text a
//! user edited for each named document.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::presets;

/// Store directory the command-line front end uses unless told otherwise
pub const DEFAULT_DIR: &str = ".cellrule";

/// Errors raised by rule stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file-system failure
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    /// Key contains characters a store cannot represent
    #[error("invalid store key \"{0}\": use letters, digits, '_' or '-'")]
    InvalidKey(String),
}

/// Key-value storage for rule text
pub trait RuleStore {
    /// Stored text for `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the text stored under `key`
    fn set(&mut self, key: &str, text: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl RuleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }
}

/// Store keeping one `<key>.yaml` file per document in a directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Use `root` as the store directory; it is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.yaml")))
    }
}

impl RuleStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Stored text for `key`, falling back to the preset of the same name
pub fn load_or_default<S: RuleStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<String>, StoreError> {
    if let Some(text) = store.get(key)? {
        return Ok(Some(text));
    }
    Ok(presets::find(key).map(|preset| preset.rules.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cellrule-store-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "initial: \"0\"").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("initial: \"0\""));
    }

    #[test]
    fn test_fallback_to_preset() {
        let mut store = MemoryStore::new();
        let preset = presets::find("Addition").unwrap();
        assert_eq!(
            load_or_default(&store, "Addition").unwrap().as_deref(),
            Some(preset.rules)
        );

        store.set("Addition", "edited").unwrap();
        assert_eq!(load_or_default(&store, "Addition").unwrap().as_deref(), Some("edited"));
        assert_eq!(load_or_default(&store, "Unknown").unwrap(), None);
    }

    #[test]
    fn test_directory_store() {
        let dir = scratch_dir("roundtrip");
        let mut store = DirectoryStore::new(&dir);

        assert_eq!(store.get("Counter").unwrap(), None);
        store.set("Counter", "rules: []\n").unwrap();
        assert_eq!(store.get("Counter").unwrap().as_deref(), Some("rules: []\n"));
        assert!(dir.join("Counter.yaml").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_saved_rules_shadow_preset() {
        let dir = scratch_dir("shadow");
        let mut writer = DirectoryStore::new(&dir);
        writer.set("Addition", "initial: \"01\"\n").unwrap();

        let reader = DirectoryStore::new(&dir);
        assert_eq!(
            load_or_default(&reader, "Addition").unwrap().as_deref(),
            Some("initial: \"01\"\n")
        );
        assert_eq!(
            load_or_default(&reader, "01_Counter").unwrap().as_deref(),
            Some(presets::find("01_Counter").unwrap().rules)
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_directory_store_rejects_paths() {
        let mut store = DirectoryStore::new(scratch_dir("keys"));
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }
}
