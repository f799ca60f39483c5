//! In-memory model of the repository contract every generated
//! `BaseRepository` follows, `save` included.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A stored row: field name to JSON value, always carrying an integer `id`.
pub type Record = Map<String, Value>;

/// Table of records keyed by an auto-assigned id
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    records: BTreeMap<i64, Record>,
    next_id: i64,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        MemoryRepository {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Records in id order, skipping `offset` and returning at most `limit`.
    pub fn list(&self, offset: usize, limit: usize) -> Vec<&Record> {
        self.records.values().skip(offset).take(limit).collect()
    }

    /// Create or update.
    ///
    /// A truthy `id` naming an existing record patches every field present in
    /// `data` onto it. Anything else (no id, `0`, `null`, or an id with no
    /// record) creates a new record under a freshly assigned id; the
    /// supplied id is discarded.
    pub fn save(&mut self, data: Record) -> Record {
        if let Some(id) = truthy_id(data.get("id")).filter(|id| self.records.contains_key(id)) {
            if let Some(existing) = self.records.get_mut(&id) {
                for (field, value) in data {
                    existing.insert(field, value);
                }
                existing.insert("id".to_string(), Value::from(id));
                return existing.clone();
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let mut record: Record = data.into_iter().filter(|(k, _)| k != "id").collect();
        record.insert("id".to_string(), Value::from(id));
        self.records.insert(id, record.clone());
        record
    }

    /// Remove a record; `false` when the id is unknown.
    pub fn delete(&mut self, id: i64) -> bool {
        self.records.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Python truthiness of an id value, narrowed to the integers a table can hold.
fn truthy_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().filter(|id| *id != 0),
        Value::String(s) => s.trim().parse::<i64>().ok().filter(|id| *id != 0),
        _ => None,
    }
}
