use tracing::trace;

/// Opaque identity of a record, assigned once at load time.
///
/// Row identity is never derived from displayed text (the ordinal column is
/// recomputed on every render and would go stale the moment the order or
/// the column layout changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrites the field named `column`, appending it if the record did
    /// not carry it yet.
    pub fn set(&mut self, column: &str, value: String) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, old)) => *old = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Case insensitive substring match over all field values.
    /// `needle` must already be lowercased by the caller.
    pub fn matches(&self, needle: &str) -> bool {
        self.fields
            .iter()
            .any(|(_, value)| value.to_lowercase().contains(needle))
    }
}

/// The authoritative ordered collection of records. Order is the thing
/// being edited, so it is only mutated by wholesale replacement (load),
/// field writes (edit sync) and remove-and-reinsert (reorder).
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Builds a store from raw field rows, assigning a fresh id to each.
    pub fn from_rows(rows: Vec<Vec<(String, String)>>) -> Self {
        let mut next_id = 0u64;
        let records: Vec<Record> = rows
            .into_iter()
            .map(|fields| {
                let id = RecordId(next_id);
                next_id += 1;
                Record { id, fields }
            })
            .collect();
        trace!("Built record store with {} records", records.len());
        RecordStore { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub(crate) fn remove_at(&mut self, pos: usize) -> Record {
        self.records.remove(pos)
    }

    pub(crate) fn insert_at(&mut self, pos: usize, record: Record) {
        self.records.insert(pos, record);
    }

    /// Field names in first-seen order across all records. Used to derive
    /// default column preferences when no preference file exists.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            for name in record.field_names() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

#[cfg(test)]
pub(crate) fn test_store(names: &[&str]) -> RecordStore {
    RecordStore::from_rows(
        names
            .iter()
            .map(|n| vec![("Name".to_string(), n.to_string())])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let store = test_store(&["A", "B", "C"]);
        let ids: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2]);
    }

    #[test]
    fn get_and_position_resolve_by_id() {
        let store = test_store(&["A", "B"]);
        let id = store.records()[1].id();
        assert_eq!(store.get(id).unwrap().get("Name"), Some("B"));
        assert_eq!(store.position_of(id), Some(1));
    }

    #[test]
    fn set_overwrites_or_appends() {
        let mut store = test_store(&["A"]);
        let id = store.records()[0].id();
        store.get_mut(id).unwrap().set("Name", "Z".to_string());
        store.get_mut(id).unwrap().set("City", "Graz".to_string());
        let record = store.get(id).unwrap();
        assert_eq!(record.get("Name"), Some("Z"));
        assert_eq!(record.get("City"), Some("Graz"));
    }

    #[test]
    fn matches_is_case_insensitive_substring() {
        let store = RecordStore::from_rows(vec![vec![(
            "City".to_string(),
            "New York".to_string(),
        )]]);
        let record = &store.records()[0];
        assert!(record.matches("new"));
        assert!(record.matches("york"));
        assert!(!record.matches("boston"));
    }

    #[test]
    fn column_names_keep_first_seen_order() {
        let store = RecordStore::from_rows(vec![
            vec![
                ("Name".to_string(), "A".to_string()),
                ("City".to_string(), "X".to_string()),
            ],
            vec![
                ("Name".to_string(), "B".to_string()),
                ("Phone".to_string(), "1".to_string()),
            ],
        ]);
        assert_eq!(store.column_names(), vec!["Name", "City", "Phone"]);
    }
}
