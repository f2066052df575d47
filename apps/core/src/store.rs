use std::sync::Arc;

use crate::model::Entry;

/// Current set of known entries. Replacement swaps the whole snapshot, so a query
/// holding an older `Arc` keeps a consistent view.
#[derive(Debug, Clone)]
pub struct EntryStore {
    entries: Arc<[Entry]>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }
}

impl EntryStore {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut store = Self::default();
        store.replace(entries);
        store
    }

    pub fn replace(&mut self, entries: Vec<Entry>) {
        self.entries = Arc::from(dedup_last_wins(entries));
    }

    pub fn snapshot(&self) -> Arc<[Entry]> {
        Arc::clone(&self.entries)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn dedup_last_wins(entries: Vec<Entry>) -> Vec<Entry> {
    let mut unique: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name.is_empty() {
            continue;
        }
        match unique.iter_mut().find(|known| known.name == entry.name) {
            Some(known) => known.connection = entry.connection,
            None => unique.push(entry),
        }
    }
    unique
}
