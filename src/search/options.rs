use std::ops::Range;
use serde::{Serialize, Deserialize};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};

/// How query terms are compared with indexed terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Exact equality of stemmed terms
    Strict,
    /// Damerau-Levenshtein distance within `fuzzy_max_distance`
    #[default]
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Indexed terms shorter than this (in chars) are never matched
    pub word_min_size: usize,
    pub fuzzy_max_distance: u32,
    pub match_type: MatchType,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            word_min_size: 3,
            fuzzy_max_distance: 2,
            match_type: MatchType::Fuzzy,
        }
    }
}

/// Which fields to search and how to shape the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub field_names: Vec<String>,
    pub sort_by_score: bool,
    pub page: u64,      // 1-based
    pub page_size: u64,
    pub text: TextOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            field_names: Vec::new(),
            sort_by_score: true,
            page: 1,
            page_size: 10,
            text: TextOptions::default(),
        }
    }
}

impl SearchOptions {
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchOptions {
            field_names: field_names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Options seeded from a document's configured search defaults.
    pub fn from_config<I, S>(config: &Config, field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defaults = &config.search;
        SearchOptions {
            page_size: defaults.page_size,
            text: TextOptions {
                word_min_size: defaults.word_min_size,
                fuzzy_max_distance: defaults.fuzzy_max_distance,
                match_type: defaults.match_type,
            },
            ..SearchOptions::new(field_names)
        }
    }

    pub fn with_page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_sort_by_score(mut self, sort_by_score: bool) -> Self {
        self.sort_by_score = sort_by_score;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.text.match_type = match_type;
        self
    }

    pub fn with_fuzzy_max_distance(mut self, distance: u32) -> Self {
        self.text.fuzzy_max_distance = distance;
        self
    }

    pub fn with_word_min_size(mut self, size: usize) -> Self {
        self.text.word_min_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "page numbers start at 1"));
        }
        if self.page_size == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "page_size must be at least 1"));
        }
        Ok(())
    }

    /// Slice of a result list of length `len` covered by the requested page.
    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = self.page.saturating_sub(1).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size);
        let clamp = |n: u64| usize::try_from(n).unwrap_or(usize::MAX).min(len);
        clamp(start)..clamp(end)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldNames {
    List(Vec<String>),
    Joined(String),
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames::List(Vec::new())
    }
}

impl FieldNames {
    fn into_vec(self) -> Vec<String> {
        match self {
            FieldNames::List(names) => names,
            FieldNames::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// JSON search request, as accepted by a front-end.
///
/// `field_names` may be an array or one comma-separated string. Absent
/// paging and sorting keys fall back to the document's defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default)]
    field_names: FieldNames,
    #[serde(default)]
    pub sort_by_score: Option<bool>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl SearchRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_options(self, config: &Config) -> (String, SearchOptions) {
        let mut options = SearchOptions::from_config(config, self.field_names.into_vec());
        if let Some(sort_by_score) = self.sort_by_score {
            options.sort_by_score = sort_by_score;
        }
        if let Some(page) = self.page {
            options.page = page;
        }
        if let Some(page_size) = self.page_size {
            options.page_size = page_size;
        }
        (self.q, options)
    }
}
