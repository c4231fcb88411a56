use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Entry, EntryId, FieldValue, StoredEntry};
use crate::index::inverted::{analyze_field, FieldIndex, InvertedIndex};
use crate::schema::schema::{FieldKind, Schema};
use crate::scoring::scorer::BM25Scorer;
use crate::search::executor::SearchEngine;
use crate::search::options::{SearchOptions, SearchRequest};
use crate::search::results::{Page, ScoredEntry, SearchResults};
use crate::storage::codec::{self, DocumentImage};
use crate::storage::layout;

struct DocumentState {
    name: String,
    schema: Schema,
    entries: Vec<StoredEntry>,  // Sorted by id, ids never reused
    index: InvertedIndex,
    next_id: u64,
}

impl DocumentState {
    fn new(name: String, schema: Schema) -> Self {
        DocumentState {
            name,
            schema,
            entries: Vec::new(),
            index: InvertedIndex::new(),
            next_id: 0,
        }
    }

    fn from_image(image: DocumentImage) -> Self {
        let mut state = DocumentState::new(image.name, image.schema);
        for entry in image.entries {
            state.push(entry);
        }
        state
    }

    fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(StoredEntry { id, entry });
        id
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |stored| stored.id).ok()
    }

    fn engine<'a>(&'a self, analyzer: &'a Analyzer) -> SearchEngine<'a> {
        SearchEngine::new(&self.schema, &self.entries, &self.index, analyzer)
    }
}

/// A named, schema-typed collection of entries with its text index.
///
/// All state sits behind one reader-writer lock: mutations (`add`, `remove`,
/// `index_text_field`, `load`) are exclusive, while searches, saves and
/// accessors run concurrently with each other. The index is a snapshot of
/// the last `index_text_field` call and is not updated by writes.
pub struct Document {
    config: Config,
    analyzer: Analyzer,
    scorer: BM25Scorer,
    state: RwLock<DocumentState>,
}

impl Document {
    pub fn new(name: &str, schema: Schema) -> Self {
        Self::with_config(name, schema, Config::default())
    }

    pub fn with_config(name: &str, schema: Schema, config: Config) -> Self {
        Self::from_state(DocumentState::new(name.to_string(), schema), config)
    }

    fn from_state(state: DocumentState, config: Config) -> Self {
        Document {
            analyzer: Analyzer::for_kind(config.analyzer),
            scorer: BM25Scorer::new(config.bm25_k1, config.bm25_b),
            config,
            state: RwLock::new(state),
        }
    }

    /// Reads a document saved with `save`, using `config.codec` to decompress.
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        let image = read_image(path, &config)?;
        info!("Opened document '{}' from {:?} ({} entries)", image.name, path, image.entries.len());
        Ok(Self::from_state(DocumentState::from_image(image), config))
    }

    pub fn from_bytes(bytes: &[u8], config: Config) -> Result<Self> {
        let image = decode_image(bytes, &config)?;
        Ok(Self::from_state(DocumentState::from_image(image), config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    pub fn schema(&self) -> Schema {
        self.state.read().schema.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Snapshot of all entries in arrival order.
    pub fn entries(&self) -> Vec<Entry> {
        self.state.read().entries.iter().map(|stored| stored.entry.clone()).collect()
    }

    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.state.read().entries.iter().map(|stored| stored.id).collect()
    }

    pub fn entry(&self, id: EntryId) -> Option<Entry> {
        let state = self.state.read();
        state.position(id).map(|i| state.entries[i].entry.clone())
    }

    pub fn is_indexed(&self, field: &str) -> bool {
        self.state.read().index.is_indexed(field)
    }

    pub fn add(&self, entry: Entry) -> EntryId {
        let id = self.state.write().push(entry);
        debug!("Added entry {}", id);
        id
    }

    pub fn add_all<I>(&self, entries: I) -> Vec<EntryId>
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut state = self.state.write();
        let ids: Vec<EntryId> = entries.into_iter().map(|entry| state.push(entry)).collect();
        debug!("Added {} entries to '{}'", ids.len(), state.name);
        ids
    }

    /// Removes every entry structurally equal to `entry` and returns how many
    /// went away.
    pub fn remove(&self, entry: &Entry) -> usize {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|stored| stored.entry != *entry);
        let removed = before - state.entries.len();
        debug!("Removed {} entries from '{}'", removed, state.name);
        removed
    }

    /// Removes every entry matching `query` on `field_names`, as one exclusive
    /// operation.
    pub fn remove_matching<I, S>(&self, query: &str, field_names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = SearchOptions::from_config(&self.config, field_names).with_sort_by_score(false);

        let mut state = self.state.write();
        let page = state.engine(&self.analyzer).search(query, &options, true)?;
        let doomed: HashSet<EntryId> = page.hits.into_iter().map(|(id, _)| id).collect();

        state.entries.retain(|stored| !doomed.contains(&stored.id));
        info!("Removed {} entries matching {:?} from '{}'", doomed.len(), query, state.name);
        Ok(doomed.len())
    }

    /// Rebuilds the index of one text field from scratch and refreshes the
    /// stored terms of every entry.
    pub fn index_text_field(&self, field: &str) -> Result<()> {
        let start = Instant::now();
        let mut state = self.state.write();

        match state.schema.require(field)? {
            FieldKind::Text => {}
            kind => {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("field '{}' is {}, only text fields can be indexed", field, kind),
                ))
            }
        }

        let analyzed = analyze_field(&state.entries, field, &self.analyzer);
        let field_index = FieldIndex::rebuild(field, &analyzed, &self.scorer);

        for (stored, (id, terms)) in state.entries.iter_mut().zip(analyzed) {
            debug_assert_eq!(stored.id, id);
            if let Some(FieldValue::Text(text)) = stored.entry.field_mut(field) {
                text.term_stats = field_index.term_stats(id, &terms);
                text.terms = terms;
            }
        }

        info!(
            "Indexed field '{}' of '{}': {} entries, {} terms in {:?}",
            field,
            state.name,
            field_index.entry_count,
            field_index.len(),
            start.elapsed()
        );
        state.index.insert(field_index);
        Ok(())
    }

    /// Indexes every text field the schema declares.
    pub fn index_all_text_fields(&self) -> Result<()> {
        let fields: Vec<String> = self.state.read().schema.text_fields().map(String::from).collect();
        for field in fields {
            self.index_text_field(&field)?;
        }
        Ok(())
    }

    /// Next value for an auto-increment number field: the last entry's value
    /// plus one, or 1 when the document is empty.
    pub fn compute_next_number_value(&self, field: &str) -> Result<u64> {
        let state = self.state.read();

        let kind = state.schema.require(field)?;
        if kind != FieldKind::Number {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("field '{}' is {}, not number", field, kind),
            ));
        }

        let Some(last) = state.entries.last() else {
            return Ok(1);
        };

        let value = match last.entry.find_field(field) {
            FieldValue::Number(n) => *n,
            other => panic!("entry {} does not conform to schema: field '{}' holds {:?}", last.id, field, other),
        };

        value.checked_add(1).ok_or_else(|| {
            Error::new(ErrorKind::InvalidArgument, format!("field '{}' has no number after {}", field, value))
        })
    }

    /// Ranked `(entry, score)` pairs; `list_all` ignores the page settings.
    pub fn search_scored(&self, query: &str, options: &SearchOptions, list_all: bool) -> Result<Vec<(EntryId, f64)>> {
        let state = self.state.read();
        let page = state.engine(&self.analyzer).search(query, options, list_all)?;
        Ok(page.hits)
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResults> {
        let start = Instant::now();
        let state = self.state.read();
        let page = state.engine(&self.analyzer).search(query, options, false)?;
        Ok(resolve_page(&state, page, start))
    }

    pub fn search_request(&self, request: SearchRequest) -> Result<SearchResults> {
        let (query, options) = request.into_options(&self.config);
        self.search(&query, &options)
    }

    /// Encodes and compresses name, schema and entries.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let text = {
            let state = self.state.read();
            codec::encode(&state.name, &state.schema, state.entries.iter().map(|stored| &stored.entry))?
        };
        self.config.codec.compress(text.as_bytes())
    }

    /// Writes the document to `path`, replacing any previous file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        layout::write_atomic(path, &bytes)?;
        info!("Saved document '{}' to {:?} ({} bytes, {})", self.name(), path, bytes.len(), self.config.codec.name());
        Ok(())
    }

    /// Replaces name, schema and entries with the content of `path`. The
    /// index is cleared; on error the document is left untouched.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = read_image(path, &self.config)?;
        let loaded = DocumentState::from_image(image);

        let mut state = self.state.write();
        if !state.index.fields.is_empty() {
            warn!("Loading {:?} into '{}' drops its index; re-run index_text_field", path, state.name);
        }
        *state = loaded;
        info!("Loaded document '{}' from {:?} ({} entries)", state.name, path, state.entries.len());
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        let mut indexed: Vec<&str> = state.index.fields.keys().map(String::as_str).collect();
        indexed.sort_unstable();
        f.debug_struct("Document")
            .field("name", &state.name)
            .field("entries", &state.entries.len())
            .field("indexed", &indexed)
            .field("codec", &self.config.codec)
            .finish()
    }
}

fn read_image(path: &Path, config: &Config) -> Result<DocumentImage> {
    let bytes = fs::read(path)?;
    decode_image(&bytes, config)
}

fn decode_image(bytes: &[u8], config: &Config) -> Result<DocumentImage> {
    let raw = config.codec.decompress(bytes)?;
    let text = String::from_utf8(raw)
        .map_err(|e| Error::new(ErrorKind::CorruptStore, format!("document is not valid UTF-8: {}", e)))?;
    codec::decode(&text)
}

fn resolve_page(state: &DocumentState, page: Page, start: Instant) -> SearchResults {
    let max_score = page.max_score();
    let hits = page
        .hits
        .into_iter()
        .filter_map(|(entry_id, score)| {
            let i = state.position(entry_id)?;
            Some(ScoredEntry {
                entry_id,
                score,
                entry: state.entries[i].entry.clone(),
            })
        })
        .collect();

    SearchResults {
        hits,
        total_hits: page.total_hits,
        max_score,
        took_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn weather() -> Document {
        let schema = Schema::new()
            .add_number_field("id")
            .add_text_field("title")
            .add_keyword_field("url");
        let document = Document::new("weather", schema);
        for (i, title) in ["hello good man", "quite windy windy london", "weather windy today"].iter().enumerate() {
            document.add(
                Entry::new()
                    .with_number("id", i as u64 + 1)
                    .with_text("title", title)
                    .with_keyword("url", &format!("https://example.com/{}", i + 1)),
            );
        }
        document
    }

    #[test]
    fn test_ids_are_stable_across_removal() {
        let document = weather();
        let ids = document.entry_ids();
        assert_eq!(ids, vec![EntryId(0), EntryId(1), EntryId(2)]);

        let second = document.entry(EntryId(1)).unwrap();
        assert_eq!(document.remove(&second), 1);
        assert_eq!(document.entry_ids(), vec![EntryId(0), EntryId(2)]);

        let id = document.add(second);
        assert_eq!(id, EntryId(3));
    }

    #[test]
    fn test_remove_all_equal_entries() {
        let document = weather();
        let duplicate = document.entry(EntryId(0)).unwrap();
        document.add(duplicate.clone());
        assert_eq!(document.remove(&duplicate), 2);
        assert_eq!(document.remove(&duplicate), 0);
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_index_writes_terms_back() {
        let document = weather();
        document.index_text_field("title").unwrap();
        assert!(document.is_indexed("title"));

        let entry = document.entry(EntryId(1)).unwrap();
        let title = entry.find_field("title").as_text().unwrap();
        assert_eq!(title.terms, vec!["quit", "windi", "windi", "london"]);
        assert_eq!(title.term_stats["windi"].count, 2);
        assert!(title.term_stats["windi"].score > 0.0);
    }

    #[test]
    fn test_index_rejects_bad_fields() {
        let document = weather();
        assert_eq!(document.index_text_field("author").unwrap_err().kind, ErrorKind::UnknownField);
        assert_eq!(document.index_text_field("id").unwrap_err().kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_search_resolves_entries() {
        let document = weather();
        document.index_text_field("title").unwrap();

        let results = document.search("windy", &SearchOptions::new(["title"])).unwrap();
        assert_eq!(results.total_hits, 2);
        assert_eq!(results.hits[0].entry_id, EntryId(1));
        assert_eq!(results.hits[0].entry.find_field("id"), &FieldValue::Number(2));
        assert_eq!(results.max_score, results.hits[0].score);
    }

    #[test]
    fn test_search_request() {
        let document = weather();
        let request = SearchRequest::from_json(r#"{"q": "3", "field_names": "id"}"#).unwrap();
        let results = document.search_request(request).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.hits[0].score, 1.0);
    }

    #[test]
    fn test_next_number_value() {
        let document = weather();
        assert_eq!(document.compute_next_number_value("id").unwrap(), 4);
        assert_eq!(document.compute_next_number_value("title").unwrap_err().kind, ErrorKind::InvalidArgument);
        assert_eq!(document.compute_next_number_value("nope").unwrap_err().kind, ErrorKind::UnknownField);

        let empty = Document::new("empty", Schema::new().add_number_field("id"));
        assert_eq!(empty.compute_next_number_value("id").unwrap(), 1);
    }

    #[test]
    fn test_remove_matching() {
        let document = weather();
        document.index_text_field("title").unwrap();
        assert_eq!(document.remove_matching("windy", ["title"]).unwrap(), 2);
        assert_eq!(document.len(), 1);
        assert!(document.search_scored("windy", &SearchOptions::new(["title"]), true).unwrap().is_empty());
    }

    #[test]
    fn test_load_failure_keeps_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.kss");
        fs::write(&path, Config::default().codec.compress(b"d/x\nid/n/oops\n;\n").unwrap()).unwrap();

        let document = weather();
        document.index_text_field("title").unwrap();
        assert_eq!(document.load(&path).unwrap_err().kind, ErrorKind::CorruptStore);
        assert_eq!(document.name(), "weather");
        assert_eq!(document.len(), 3);
        assert!(document.is_indexed("title"));
    }

    #[test]
    fn test_debug_summarizes_state() {
        let document = weather();
        document.index_text_field("title").unwrap();
        let debug = format!("{:?}", document);
        assert!(debug.starts_with("Document"));
        assert!(debug.contains("\"weather\""));
        assert!(debug.contains("entries: 3"));
        assert!(debug.contains("[\"title\"]"));
    }

    #[test]
    fn test_load_clears_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weather.kss");

        let document = weather();
        document.index_text_field("title").unwrap();
        document.save(&path).unwrap();
        document.load(&path).unwrap();

        assert!(!document.is_indexed("title"));
        assert_eq!(document.len(), 3);
    }
}
