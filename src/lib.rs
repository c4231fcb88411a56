pub mod core;
pub mod storage;
pub mod analysis;
pub mod schema;
pub mod index;
pub mod scoring;
pub mod search;
pub mod compression;

pub use crate::core::collection::Collection;
pub use crate::core::config::Config;
pub use crate::core::document::Document;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{Entry, EntryId, FieldValue};
pub use crate::schema::schema::{FieldKind, Schema};
pub use crate::search::options::{MatchType, SearchOptions, SearchRequest};
pub use crate::search::results::{ScoredEntry, SearchResults};

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                            KISSEARCH ARCHITECTURE                            │
└──────────────────────────────────────────────────────────────────────────────┘

  Collection ── RwLock<Vec<Arc<Document>>>
      │
      ▼
  Document ── RwLock<DocumentState>
      │        name, schema, entries: Vec<StoredEntry>, index, next_id
      │
      ├── add / remove / remove_matching ......... write lock
      ├── index_text_field ........................ write lock
      │     entries ──(rayon)── Analyzer ──► FieldIndex::rebuild
      │                 │                        term -> TermRecord { idf, postings }
      │                 │                        postings: EntryId -> TermInfo { count, bm25 }
      │                 └── Tokenizer ─► Porter2Filter | StopWordFilter + StemmerFilter
      │
      ├── search ................................... read lock
      │     SearchOptions ──► SearchEngine
      │        text:    query terms x indexed terms (FuzzyAutomaton / equality)
      │        number, keyword, boolean: exact match, score 1
      │     ResultSet (sum per entry) ──► sort ──► page ──► SearchResults
      │
      └── save / load
            storage::codec (records) ◄──► Codec (lz4 | zstd | snappy | none)
            ──► write_atomic (temp file + rename)
*/
