use std::collections::{BTreeMap, HashMap};
use rayon::prelude::*;
use crate::analysis::analyzer::Analyzer;
use crate::core::types::{EntryId, FieldValue, StoredEntry};
use crate::index::posting::{TermInfo, TermRecord};
use crate::scoring::scorer::{self, Scorer};

/// Stemmed terms of one entry field, in text order with duplicates.
pub type AnalyzedField = (EntryId, Vec<String>);

/// Tokenizes and stems `field` of every entry, in parallel.
///
/// # Panics
///
/// Panics if an entry lacks the field or holds a non-text value there;
/// entries must conform to the schema that declared the field as text.
pub fn analyze_field(entries: &[StoredEntry], field: &str, analyzer: &Analyzer) -> Vec<AnalyzedField> {
    entries
        .par_iter()
        .map(|stored| match stored.entry.find_field(field) {
            FieldValue::Text(text) => (stored.id, analyzer.analyze(&text.raw)),
            other => panic!("entry {} does not conform to schema: field '{}' holds {:?}, not text", stored.id, field, other),
        })
        .collect()
}

/// Term space of one text field.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    pub field: String,
    pub terms: BTreeMap<String, TermRecord>,
    pub field_lengths: BTreeMap<EntryId, usize>,
    pub entry_count: usize,
    pub total_terms: usize,
}

impl FieldIndex {
    pub fn new(field: &str) -> Self {
        FieldIndex {
            field: field.to_string(),
            ..Default::default()
        }
    }

    /// Analyzes, counts and scores a field in one go.
    pub fn rebuild(field: &str, analyzed: &[AnalyzedField], scorer: &dyn Scorer) -> Self {
        let mut index = FieldIndex::new(field);
        index.build(analyzed);
        index.compute_idf(analyzed.len());
        index.compute_scores(scorer);
        index
    }

    /// Clears the field and counts term occurrences per entry.
    pub fn build(&mut self, analyzed: &[AnalyzedField]) {
        self.terms.clear();
        self.field_lengths.clear();
        self.total_terms = 0;
        self.entry_count = analyzed.len();

        for (entry_id, terms) in analyzed {
            self.field_lengths.insert(*entry_id, terms.len());
            self.total_terms += terms.len();

            for term in terms {
                self.terms
                    .entry(term.clone())
                    .or_insert_with(TermRecord::new)
                    .add_occurrence(*entry_id);
            }
        }
    }

    pub fn compute_idf(&mut self, total_entries: usize) {
        for record in self.terms.values_mut() {
            record.idf = scorer::idf(total_entries, record.doc_freq());
        }
    }

    pub fn compute_scores(&mut self, scorer: &dyn Scorer) {
        let avg_field_length = self.avg_field_length();

        for record in self.terms.values_mut() {
            let idf = record.idf;
            for (entry_id, info) in record.postings.iter_mut() {
                let field_length = self.field_lengths.get(entry_id).copied().unwrap_or(0) as f64;
                info.score = scorer.score(info.count as f64, idf, field_length, avg_field_length);
            }
        }
    }

    pub fn avg_field_length(&self) -> f64 {
        if self.entry_count == 0 {
            return 0.0;
        }
        self.total_terms as f64 / self.entry_count as f64
    }

    pub fn term(&self, term: &str) -> Option<&TermRecord> {
        self.terms.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermRecord)> {
        self.terms.iter().map(|(term, record)| (term.as_str(), record))
    }

    /// Per-term stats of one entry, as stored back on its text value.
    pub fn term_stats(&self, entry_id: EntryId, terms: &[String]) -> BTreeMap<String, TermInfo> {
        terms
            .iter()
            .filter_map(|term| {
                let info = self.terms.get(term)?.get(entry_id)?;
                Some((term.clone(), *info))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Independent per-field indexes; scores never cross field boundaries.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    pub fields: HashMap<String, FieldIndex>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex { fields: HashMap::new() }
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, index: FieldIndex) {
        self.fields.insert(index.field.clone(), index);
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldIndex> {
        self.fields.remove(name)
    }

    pub fn is_indexed(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
