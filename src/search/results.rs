use std::collections::BTreeMap;
use serde_json::{json, Value};
use crate::core::types::{Entry, EntryId};
use crate::search::options::SearchOptions;

/// Search results container
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub hits: Vec<ScoredEntry>,
    pub total_hits: usize,  // Matches before pagination
    pub max_score: f64,
    pub took_ms: u64,
}

/// Entry with relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry_id: EntryId,
    pub score: f64,
    pub entry: Entry,
}

impl SearchResults {
    pub fn empty() -> Self {
        SearchResults {
            hits: Vec::new(),
            total_hits: 0,
            max_score: 0.0,
            took_ms: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.hits.iter().map(|hit| &hit.entry)
    }

    pub fn to_json(&self) -> Value {
        let hits: Vec<Value> = self
            .hits
            .iter()
            .map(|hit| json!({"score": hit.score, "entry": hit.entry.to_json()}))
            .collect();

        json!({
            "hits": hits,
            "total_hits": self.total_hits,
            "max_score": self.max_score,
            "took_ms": self.took_ms,
        })
    }
}

/// One page of ranked `(entry, score)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub hits: Vec<(EntryId, f64)>,
    pub total_hits: usize,
}

impl Page {
    pub fn max_score(&self) -> f64 {
        self.hits.iter().map(|(_, score)| *score).fold(0.0, f64::max)
    }
}

/// Accumulates scores per entry across fields and query terms.
///
/// Keyed by entry id, so iteration order is arrival order.
#[derive(Debug, Default)]
pub struct ResultSet {
    scores: BTreeMap<EntryId, f64>,
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet { scores: BTreeMap::new() }
    }

    pub fn add(&mut self, entry_id: EntryId, score: f64) {
        *self.scores.entry(entry_id).or_insert(0.0) += score;
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Drops non-positive scores, sorts and cuts the requested page.
    pub fn finish(self, options: &SearchOptions, list_all: bool) -> Page {
        let mut hits: Vec<(EntryId, f64)> = self
            .scores
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect();

        if options.sort_by_score {
            // stable, so ties keep arrival order
            hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        }

        let total_hits = hits.len();
        if !list_all {
            let range = options.page_range(hits.len());
            hits = hits.drain(range).collect();
        }

        Page { hits, total_hits }
    }
}
