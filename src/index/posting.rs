use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::types::EntryId;

/// Frequency and last computed BM25 contribution of one term in one entry field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    pub count: u16,
    pub score: f64,
}

/// Everything the index knows about one term of one field.
#[derive(Debug, Clone, Default)]
pub struct TermRecord {
    pub idf: f64,
    pub postings: BTreeMap<EntryId, TermInfo>,
}

impl TermRecord {
    pub fn new() -> Self {
        TermRecord::default()
    }

    /// Number of entries containing the term (presence, not multiplicity).
    pub fn doc_freq(&self) -> usize {
        self.postings.len()
    }

    pub fn add_occurrence(&mut self, entry_id: EntryId) {
        let info = self.postings.entry(entry_id).or_default();
        info.count = info.count.saturating_add(1);
    }

    pub fn get(&self, entry_id: EntryId) -> Option<&TermInfo> {
        self.postings.get(&entry_id)
    }
}
