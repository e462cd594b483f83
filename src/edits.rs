use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::store::{RecordId, RecordStore};

/// Pending cell edits and the row selection used for bulk edits.
///
/// Edits are keyed by record identity, not by display position, so they
/// survive paging, searching and reordering until they are synchronized
/// into the store. Synchronization is forced before page changes and
/// before every save, which is what guarantees that a save always reflects
/// the latest edit state.
#[derive(Debug, Default)]
pub struct EditBuffer {
    pending: HashMap<(RecordId, String), String>,
    selected: HashSet<RecordId>,
}

impl EditBuffer {
    pub fn stage(&mut self, id: RecordId, column: &str, value: String) {
        trace!("Staging edit {:?}.{} = {:?}", id, column, value);
        self.pending.insert((id, column.to_string()), value);
    }

    /// Stages `value` for `column` on every selected record.
    pub fn stage_bulk(&mut self, column: &str, value: &str) -> usize {
        let ids: Vec<RecordId> = self.selected.iter().copied().collect();
        for id in &ids {
            self.pending
                .insert((*id, column.to_string()), value.to_string());
        }
        debug!("Bulk edit staged {} for {} rows", column, ids.len());
        ids.len()
    }

    pub fn pending_value(&self, id: RecordId, column: &str) -> Option<&str> {
        self.pending
            .get(&(id, column.to_string()))
            .map(|v| v.as_str())
    }

    /// A row carries the "modified" marker while any of its cells has an
    /// unsynchronized edit.
    pub fn is_modified(&self, id: RecordId) -> bool {
        self.pending.keys().any(|(rid, _)| *rid == id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Writes every pending edit into the store and clears the buffer.
    /// Edits whose record no longer exists are skipped silently, edits are
    /// best effort under state drift.
    pub fn sync(&mut self, store: &mut RecordStore) -> usize {
        let mut applied = 0;
        for ((id, column), value) in self.pending.drain() {
            match store.get_mut(id) {
                Some(record) => {
                    record.set(&column, value);
                    applied += 1;
                }
                None => trace!("Dropping edit for vanished record {:?}", id),
            }
        }
        if applied > 0 {
            debug!("Synchronized {} edits into the store", applied);
        }
        applied
    }

    /// Discards all pending edits without touching the store.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn toggle_selected(&mut self, id: RecordId) {
        if !self.selected.insert(id) {
            self.selected.remove(&id);
        }
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;

    #[test]
    fn sync_writes_pending_edits_into_store() {
        let mut store = test_store(&["A", "B"]);
        let id = store.records()[0].id();
        let mut edits = EditBuffer::default();
        edits.stage(id, "Name", "Alice".to_string());
        assert!(edits.is_modified(id));

        assert_eq!(edits.sync(&mut store), 1);
        assert_eq!(store.records()[0].get("Name"), Some("Alice"));
        assert!(!edits.is_modified(id));
        assert!(!edits.has_pending());
    }

    #[test]
    fn later_edit_of_same_cell_wins() {
        let mut store = test_store(&["A"]);
        let id = store.records()[0].id();
        let mut edits = EditBuffer::default();
        edits.stage(id, "Name", "first".to_string());
        edits.stage(id, "Name", "second".to_string());
        edits.sync(&mut store);
        assert_eq!(store.records()[0].get("Name"), Some("second"));
    }

    #[test]
    fn edits_for_vanished_records_are_skipped() {
        let mut store = test_store(&["A"]);
        let id = store.records()[0].id();
        let mut edits = EditBuffer::default();
        edits.stage(id, "Name", "X".to_string());

        let mut other = test_store(&["B"]);
        // The other store knows nothing about `id`s from the first one
        // beyond its own; syncing against a store where the record is gone
        // must not fault.
        other.remove_at(0);
        assert_eq!(edits.sync(&mut other), 0);
    }

    #[test]
    fn discard_drops_edits_and_leaves_store_untouched() {
        let mut store = test_store(&["A"]);
        let id = store.records()[0].id();
        let mut edits = EditBuffer::default();
        edits.stage(id, "Name", "X".to_string());
        assert_eq!(edits.discard(), 1);
        edits.sync(&mut store);
        assert_eq!(store.records()[0].get("Name"), Some("A"));
    }

    #[test]
    fn bulk_edit_applies_to_selected_rows_only() {
        let mut store = test_store(&["A", "B", "C"]);
        let ids: Vec<_> = store.records().iter().map(|r| r.id()).collect();
        let mut edits = EditBuffer::default();
        edits.toggle_selected(ids[0]);
        edits.toggle_selected(ids[2]);
        assert_eq!(edits.stage_bulk("City", "Berlin"), 2);
        edits.sync(&mut store);
        assert_eq!(store.records()[0].get("City"), Some("Berlin"));
        assert_eq!(store.records()[1].get("City"), None);
        assert_eq!(store.records()[2].get("City"), Some("Berlin"));
    }

    #[test]
    fn toggle_selected_flips_membership() {
        let store = test_store(&["A"]);
        let id = store.records()[0].id();
        let mut edits = EditBuffer::default();
        edits.toggle_selected(id);
        assert!(edits.is_selected(id));
        edits.toggle_selected(id);
        assert!(!edits.is_selected(id));
        assert_eq!(edits.selected_count(), 0);
    }
}
