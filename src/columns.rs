use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::RowedError;
use crate::store::RecordStore;

/// The ordinal column. It shows the record's 1-based position in the
/// filtered view at render time, is recomputed on every render, can never
/// be hidden and is not editable.
pub const INDEX_COLUMN: &str = "Index";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPref {
    pub name: String,
    pub visible: bool,
}

/// Ordered column preferences: the sequence defines display order, the
/// flags visibility. Persisted as JSON with a longer lifecycle than the
/// record store (it survives across sessions).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPrefs {
    columns: Vec<ColumnPref>,
}

impl ColumnPrefs {
    /// Index first, every data column visible.
    pub fn defaults_for(store: &RecordStore) -> Self {
        let mut columns = vec![ColumnPref {
            name: INDEX_COLUMN.to_string(),
            visible: true,
        }];
        columns.extend(store.column_names().into_iter().map(|name| ColumnPref {
            name,
            visible: true,
        }));
        ColumnPrefs { columns }
    }

    pub fn from_columns(columns: Vec<ColumnPref>) -> Self {
        let mut prefs = ColumnPrefs { columns };
        prefs.normalize();
        prefs
    }

    /// Reads preferences from `path`. A missing, unreadable or malformed
    /// file falls back to defaults derived from the store, with a warning.
    pub fn load(path: &Path, store: &RecordStore) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!("No column preferences at {:?}: {}", path, err);
                return Self::defaults_for(store);
            }
        };
        match serde_json::from_str::<Vec<ColumnPref>>(&text) {
            Ok(columns) if !columns.is_empty() => {
                debug!("Loaded {} column preferences from {:?}", columns.len(), path);
                Self::from_columns(columns)
            }
            Ok(_) => {
                warn!("Empty column preferences in {:?}, using defaults", path);
                Self::defaults_for(store)
            }
            Err(err) => {
                warn!(
                    "Malformed column preferences in {:?} ({}), using defaults",
                    path, err
                );
                Self::defaults_for(store)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RowedError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.columns)?)?;
        debug!("Saved {} column preferences to {:?}", self.columns.len(), path);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnPref] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Names of the columns that get rendered, in display order. The
    /// ordinal column is always part of it.
    pub fn visible_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.visible || c.name == INDEX_COLUMN)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Visible data columns, i.e. everything editable.
    pub fn visible_data_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.visible && c.name != INDEX_COLUMN)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Toggles visibility, refusing to hide the ordinal column.
    pub fn toggle(&mut self, idx: usize) {
        if let Some(column) = self.columns.get_mut(idx)
            && column.name != INDEX_COLUMN
        {
            column.visible = !column.visible;
        }
    }

    /// Moves the column one slot up, returns the new index.
    pub fn move_up(&mut self, idx: usize) -> usize {
        if idx > 0 && idx < self.columns.len() {
            self.columns.swap(idx, idx - 1);
            idx - 1
        } else {
            idx
        }
    }

    /// Moves the column one slot down, returns the new index.
    pub fn move_down(&mut self, idx: usize) -> usize {
        if idx + 1 < self.columns.len() {
            self.columns.swap(idx, idx + 1);
            idx + 1
        } else {
            idx
        }
    }

    // Force the ordinal column to exist and stay visible.
    fn normalize(&mut self) {
        match self.columns.iter_mut().find(|c| c.name == INDEX_COLUMN) {
            Some(column) => column.visible = true,
            None => self.columns.insert(
                0,
                ColumnPref {
                    name: INDEX_COLUMN.to_string(),
                    visible: true,
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;

    fn pref(name: &str, visible: bool) -> ColumnPref {
        ColumnPref {
            name: name.to_string(),
            visible,
        }
    }

    #[test]
    fn defaults_put_index_first_and_all_visible() {
        let store = test_store(&["A"]);
        let prefs = ColumnPrefs::defaults_for(&store);
        assert_eq!(prefs.visible_names(), vec![INDEX_COLUMN, "Name"]);
        assert_eq!(prefs.visible_data_names(), vec!["Name"]);
    }

    #[test]
    fn index_column_cannot_be_hidden() {
        let mut prefs =
            ColumnPrefs::from_columns(vec![pref(INDEX_COLUMN, true), pref("Name", true)]);
        prefs.toggle(0);
        assert_eq!(prefs.visible_names(), vec![INDEX_COLUMN, "Name"]);
        prefs.toggle(1);
        assert_eq!(prefs.visible_names(), vec![INDEX_COLUMN]);
    }

    #[test]
    fn normalize_forces_index_visible_and_present() {
        let prefs = ColumnPrefs::from_columns(vec![pref(INDEX_COLUMN, false), pref("Name", true)]);
        assert!(prefs.columns()[0].visible);

        let prefs = ColumnPrefs::from_columns(vec![pref("Name", true)]);
        assert_eq!(prefs.columns()[0].name, INDEX_COLUMN);
    }

    #[test]
    fn move_up_and_down_reorder_and_report_new_index() {
        let mut prefs = ColumnPrefs::from_columns(vec![
            pref(INDEX_COLUMN, true),
            pref("Name", true),
            pref("City", true),
        ]);
        assert_eq!(prefs.move_up(2), 1);
        assert_eq!(prefs.visible_names(), vec![INDEX_COLUMN, "City", "Name"]);
        assert_eq!(prefs.move_up(0), 0);
        assert_eq!(prefs.move_down(2), 2);
    }

    #[test]
    fn roundtrip_through_file() {
        let prefs = ColumnPrefs::from_columns(vec![
            pref(INDEX_COLUMN, true),
            pref("Name", false),
            pref("City", true),
        ]);
        let path = std::env::temp_dir().join(format!(
            "rowed-prefs-test-{}.json",
            std::process::id()
        ));
        prefs.save(&path).unwrap();
        let loaded = ColumnPrefs::load(&path, &test_store(&["A"]));
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "rowed-prefs-broken-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json ]").unwrap();
        let store = test_store(&["A"]);
        let loaded = ColumnPrefs::load(&path, &store);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, ColumnPrefs::defaults_for(&store));
    }
}
