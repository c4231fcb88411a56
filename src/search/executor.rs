use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{EntryId, FieldValue, StoredEntry};
use crate::index::inverted::{FieldIndex, InvertedIndex};
use crate::schema::schema::{FieldKind, Schema};
use crate::search::fuzzy::FuzzyAutomaton;
use crate::search::options::{MatchType, SearchOptions, TextOptions};
use crate::search::results::{Page, ResultSet};

/// A query value already interpreted for one field kind.
enum FieldQuery<'q> {
    Number(u64),
    Keyword(&'q str),
    Boolean(bool),
    Text,
}

enum TermMatcher {
    Strict(String),
    Fuzzy(FuzzyAutomaton),
}

impl TermMatcher {
    fn new(term: String, options: &TextOptions) -> Self {
        match options.match_type {
            MatchType::Strict => TermMatcher::Strict(term),
            MatchType::Fuzzy => TermMatcher::Fuzzy(FuzzyAutomaton::new(&term, options.fuzzy_max_distance)),
        }
    }

    fn matches(&self, candidate: &str) -> bool {
        match self {
            TermMatcher::Strict(term) => term == candidate,
            TermMatcher::Fuzzy(automaton) => automaton.matches(candidate),
        }
    }
}

pub fn parse_number_query(query: &str) -> Result<u64> {
    query.parse().map_err(|_| {
        Error::new(ErrorKind::InvalidQueryValue, format!("'{}' is not a non-negative integer", query))
    })
}

pub fn parse_boolean_query(query: &str) -> Result<bool> {
    match query {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::new(
            ErrorKind::InvalidQueryValue,
            format!("'{}' is not a boolean, expected true, false, 1 or 0", query),
        )),
    }
}

/// Runs queries over one document's state. Holds borrows only; the caller
/// keeps the document locked for the engine's lifetime.
pub struct SearchEngine<'a> {
    pub schema: &'a Schema,
    pub entries: &'a [StoredEntry],
    pub index: &'a InvertedIndex,
    pub analyzer: &'a Analyzer,
}

impl<'a> SearchEngine<'a> {
    pub fn new(schema: &'a Schema, entries: &'a [StoredEntry], index: &'a InvertedIndex, analyzer: &'a Analyzer) -> Self {
        SearchEngine { schema, entries, index, analyzer }
    }

    /// Scores every entry against `query` on each requested field.
    ///
    /// Fields and query values are all checked before any scoring, so an
    /// error never comes with partial results. With `list_all` the page
    /// settings are ignored and every match is returned.
    pub fn search(&self, query: &str, options: &SearchOptions, list_all: bool) -> Result<Page> {
        options.validate()?;

        let mut plan = Vec::with_capacity(options.field_names.len());
        for name in &options.field_names {
            let field_query = match self.schema.require(name)? {
                FieldKind::Number => FieldQuery::Number(parse_number_query(query)?),
                FieldKind::Keyword => FieldQuery::Keyword(query),
                FieldKind::Boolean => FieldQuery::Boolean(parse_boolean_query(query)?),
                FieldKind::Text => FieldQuery::Text,
            };
            plan.push((name.as_str(), field_query));
        }

        let matchers: Vec<TermMatcher> = if plan.iter().any(|(_, q)| matches!(q, FieldQuery::Text)) {
            self.analyzer
                .analyze(query)
                .into_iter()
                .map(|term| TermMatcher::new(term, &options.text))
                .collect()
        } else {
            Vec::new()
        };

        let mut results = ResultSet::new();
        for (name, field_query) in &plan {
            match field_query {
                FieldQuery::Text => self.search_text(name, &matchers, &options.text, &mut results),
                FieldQuery::Number(n) => self.search_exact(name, &mut results, |value| value.as_number() == Some(*n)),
                FieldQuery::Keyword(k) => self.search_exact(name, &mut results, |value| value.as_keyword() == Some(*k)),
                FieldQuery::Boolean(b) => self.search_exact(name, &mut results, |value| value.as_boolean() == Some(*b)),
            }
        }

        let page = results.finish(options, list_all);
        debug!(
            "Query {:?} on {:?}: {} matches, {} returned",
            query,
            options.field_names,
            page.total_hits,
            page.hits.len()
        );
        Ok(page)
    }

    fn search_exact<F>(&self, field: &str, results: &mut ResultSet, is_match: F)
    where
        F: Fn(&FieldValue) -> bool,
    {
        for stored in self.entries {
            if is_match(stored.entry.find_field(field)) {
                results.add(stored.id, 1.0);
            }
        }
    }

    fn search_text(&self, field: &str, matchers: &[TermMatcher], options: &TextOptions, results: &mut ResultSet) {
        let Some(field_index) = self.index.field(field) else {
            debug!("Text field '{}' is not indexed, nothing to match", field);
            return;
        };

        if matchers.is_empty() {
            return;
        }

        self.score_terms(field_index, matchers, options, results);
    }

    fn score_terms(&self, field_index: &FieldIndex, matchers: &[TermMatcher], options: &TextOptions, results: &mut ResultSet) {
        for (term, record) in field_index.terms() {
            if term.chars().count() < options.word_min_size {
                continue;
            }

            let accepted = matchers.iter().filter(|matcher| matcher.matches(term)).count();
            if accepted == 0 {
                continue;
            }

            for (entry_id, info) in &record.postings {
                // postings may outlive entries removed since the last rebuild
                if self.contains(*entry_id) {
                    results.add(*entry_id, info.score * accepted as f64);
                }
            }
        }
    }

    fn contains(&self, entry_id: EntryId) -> bool {
        self.entries
            .binary_search_by_key(&entry_id, |stored| stored.id)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Entry;
    use crate::index::inverted::{analyze_field, FieldIndex};
    use crate::scoring::scorer::BM25Scorer;

    struct Fixture {
        schema: Schema,
        entries: Vec<StoredEntry>,
        index: InvertedIndex,
        analyzer: Analyzer,
    }

    impl Fixture {
        fn new(texts: &[&str]) -> Self {
            let schema = Schema::new()
                .add_number_field("id")
                .add_text_field("title")
                .add_keyword_field("url")
                .add_boolean_field("published");

            let entries: Vec<StoredEntry> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| StoredEntry {
                    id: EntryId(i as u64),
                    entry: Entry::new()
                        .with_number("id", i as u64 + 1)
                        .with_text("title", text)
                        .with_keyword("url", &format!("https://example.com/{}", i))
                        .with_boolean("published", i % 2 == 0),
                })
                .collect();

            let analyzer = Analyzer::standard_english();
            let analyzed = analyze_field(&entries, "title", &analyzer);
            let mut index = InvertedIndex::new();
            index.insert(FieldIndex::rebuild("title", &analyzed, &BM25Scorer::default()));

            Fixture { schema, entries, index, analyzer }
        }

        fn search(&self, query: &str, options: &SearchOptions) -> Result<Page> {
            SearchEngine::new(&self.schema, &self.entries, &self.index, &self.analyzer).search(query, options, false)
        }
    }

    fn weather() -> Fixture {
        Fixture::new(&["hello good man", "quite windy windy london", "weather windy today"])
    }

    #[test]
    fn test_text_ranking() {
        let page = weather().search("windy", &SearchOptions::new(["title"])).unwrap();
        let ids: Vec<u64> = page.hits.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(page.hits[0].1 >= page.hits[1].1);
    }

    #[test]
    fn test_fuzzy_and_strict() {
        let fixture = weather();
        let fuzzy = fixture.search("windo", &SearchOptions::new(["title"])).unwrap();
        assert_eq!(fuzzy.hits.len(), 2);

        let strict = SearchOptions::new(["title"]).with_match_type(MatchType::Strict);
        assert!(fixture.search("windo", &strict).unwrap().hits.is_empty());
        assert_eq!(fixture.search("windy", &strict).unwrap().hits.len(), 2);
    }

    #[test]
    fn test_word_min_size_skips_short_terms() {
        let fixture = Fixture::new(&["ox cart", "big ox"]);
        let page = fixture.search("ox", &SearchOptions::new(["title"])).unwrap();
        assert!(page.hits.is_empty());

        let options = SearchOptions::new(["title"]).with_word_min_size(2);
        assert_eq!(fixture.search("ox", &options).unwrap().hits.len(), 2);
    }

    #[test]
    fn test_exact_fields() {
        let fixture = weather();

        let page = fixture.search("2", &SearchOptions::new(["id"])).unwrap();
        assert_eq!(page.hits, vec![(EntryId(1), 1.0)]);
        assert!(fixture.search("42", &SearchOptions::new(["id"])).unwrap().hits.is_empty());

        let page = fixture.search("https://example.com/2", &SearchOptions::new(["url"])).unwrap();
        assert_eq!(page.hits, vec![(EntryId(2), 1.0)]);

        let page = fixture.search("1", &SearchOptions::new(["published"])).unwrap();
        assert_eq!(page.hits.len(), 2);
    }

    #[test]
    fn test_invalid_query_values() {
        let fixture = weather();
        let err = fixture.search("two", &SearchOptions::new(["id"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQueryValue);
        let err = fixture.search("yes", &SearchOptions::new(["published"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQueryValue);
        let err = fixture.search("-1", &SearchOptions::new(["id"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidQueryValue);
    }

    #[test]
    fn test_unknown_field_fails_before_scoring() {
        let err = weather().search("windy", &SearchOptions::new(["title", "author"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownField);
    }

    #[test]
    fn test_scores_add_up_across_fields() {
        let fixture = weather();
        let options = SearchOptions::new(["title", "url"]);
        let page = fixture.search("windy", &options).unwrap();
        let title_only = fixture.search("windy", &SearchOptions::new(["title"])).unwrap();
        assert_eq!(page.hits, title_only.hits);
    }

    #[test]
    fn test_unindexed_text_field_is_empty() {
        let mut fixture = weather();
        fixture.index.clear();
        assert!(fixture.search("windy", &SearchOptions::new(["title"])).unwrap().hits.is_empty());
    }

    #[test]
    fn test_stale_postings_are_skipped() {
        let mut fixture = weather();
        fixture.entries.remove(1);
        let page = fixture.search("windy", &SearchOptions::new(["title"])).unwrap();
        assert_eq!(page.hits.len(), 1);
        assert_eq!(page.hits[0].0, EntryId(2));
    }

    #[test]
    fn test_boolean_query_parsing() {
        assert!(parse_boolean_query("true").unwrap());
        assert!(parse_boolean_query("1").unwrap());
        assert!(!parse_boolean_query("false").unwrap());
        assert!(!parse_boolean_query("0").unwrap());
        assert!(parse_boolean_query("TRUE").is_err());
    }
}
