//! Table persistence
//!
//! The flute catalogue and the allowance table are stored as JSON files.
//! Loading never fails on bad content: a missing file is created with the
//! defaults and a corrupt one is ignored in favour of the defaults. Only
//! I/O failures while writing are reported as errors.

use crate::error::{SettingsError, SettingsResult};
use cartonkit_core::{AllowanceTable, FluteCatalogue};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn write_json(path: &Path, value: &impl serde::Serialize) -> SettingsResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)
        .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Read a JSON file, `None` when it is missing, unreadable or corrupt
fn read_json(path: &Path) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt table {}: {}", path.display(), e);
            None
        }
    }
}

/// Persisted flute catalogue
#[derive(Debug, Clone)]
pub struct FluteStore {
    path: PathBuf,
    catalogue: FluteCatalogue,
}

impl FluteStore {
    /// Load the catalogue, creating the file with defaults if missing
    pub fn load(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            let store = Self {
                path: path.to_path_buf(),
                catalogue: FluteCatalogue::standard(),
            };
            store.save()?;
            return Ok(store);
        }

        let catalogue = read_json(path)
            .map(|value| FluteCatalogue::from_value(&value))
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            catalogue,
        })
    }

    pub fn save(&self) -> SettingsResult<()> {
        write_json(&self.path, &self.catalogue)?;
        info!("Saved {} flutes to {}", self.catalogue.len(), self.path.display());
        Ok(())
    }

    /// Rewrite the file with the standard catalogue
    pub fn reset(&mut self) -> SettingsResult<()> {
        self.catalogue = FluteCatalogue::standard();
        self.save()
    }

    pub fn catalogue(&self) -> &FluteCatalogue {
        &self.catalogue
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Persisted allowance table
#[derive(Debug, Clone)]
pub struct AllowanceStore {
    path: PathBuf,
    table: AllowanceTable,
}

impl AllowanceStore {
    /// Load the table.
    ///
    /// A missing file is written with defaults for every catalogued flute.
    /// Loaded tables are sanitised and completed with default rows and
    /// blank rows for catalogue flutes that have none.
    pub fn load(path: &Path, flutes: &FluteCatalogue) -> SettingsResult<Self> {
        if !path.exists() {
            let store = Self {
                path: path.to_path_buf(),
                table: AllowanceTable::defaults_for(flutes),
            };
            store.save()?;
            return Ok(store);
        }

        let table = match read_json(path) {
            Some(value) => AllowanceTable::from_value(&value).ensure_complete(flutes),
            None => AllowanceTable::defaults_for(flutes),
        };

        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    /// Sanitise and write the table as pretty JSON
    pub fn save(&self) -> SettingsResult<()> {
        let table = self.table.sanitized();
        write_json(&self.path, &table)?;
        info!(
            "Saved allowance table ({} rows) to {}",
            table.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn replace(&mut self, table: AllowanceTable) -> SettingsResult<()> {
        self.table = table.sanitized();
        self.save()
    }

    /// Rewrite the file with the defaults for a catalogue
    pub fn reset(&mut self, flutes: &FluteCatalogue) -> SettingsResult<()> {
        self.table = AllowanceTable::defaults_for(flutes);
        self.save()
    }

    pub fn table(&self) -> &AllowanceTable {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartonkit_core::GlueSide;
    use tempfile::tempdir;

    #[test]
    fn test_missing_flutes_file_is_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flutes.json");
        let store = FluteStore::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.catalogue(), &FluteCatalogue::standard());
    }

    #[test]
    fn test_corrupt_flutes_fall_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flutes.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FluteStore::load(&path).unwrap();
        assert_eq!(store.catalogue().len(), 9);
        // corrupt file is left alone
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_missing_allowances_written_for_catalogue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("allowances.json");
        let flutes = FluteCatalogue::standard();
        let store = AllowanceStore::load(&path, &flutes).unwrap();
        assert!(path.exists());
        assert_eq!(store.table().outside.len(), 9);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("allowances.json");
        let flutes = FluteCatalogue::standard();
        let mut store = AllowanceStore::load(&path, &flutes).unwrap();

        let mut edited = store.table().clone();
        edited.outside[0].panels.p1 = 42.0;
        store.replace(edited).unwrap();
        assert_eq!(store.table().outside[0].panels.p1, 42.0);

        store.reset(&flutes).unwrap();
        let reloaded = AllowanceStore::load(&path, &flutes).unwrap();
        assert_eq!(
            reloaded.table().find(GlueSide::Outside, "E").unwrap().panels.p1,
            2.0
        );
    }
}
