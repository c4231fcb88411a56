use rust_stemmers::Algorithm;
use serde::{Serialize, Deserialize};
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::stemmer::{Porter2Filter, StemmerFilter};
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    #[default]
    Porter2,
    Snowball,
}

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Space tokenizer followed by the built-in Porter2 stemmer.
    pub fn standard_english() -> Self {
        Analyzer::new("standard_english".to_string(), Box::new(WhitespaceTokenizer))
            .add_filter(Box::new(Porter2Filter))
    }

    /// Space tokenizer, stop words, then the Snowball English stemmer.
    pub fn snowball_english() -> Self {
        Analyzer::new("snowball_english".to_string(), Box::new(WhitespaceTokenizer))
            .add_filter(Box::new(StopWordFilter::english()))
            .add_filter(Box::new(StemmerFilter::new(Algorithm::English)))
    }

    pub fn for_kind(kind: AnalyzerKind) -> Self {
        match kind {
            AnalyzerKind::Porter2 => Self::standard_english(),
            AnalyzerKind::Snowball => Self::snowball_english(),
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|filter| filter.name()).collect();
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &filters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_english() {
        let analyzer = Analyzer::standard_english();
        assert_eq!(analyzer.analyze("Quite windy,  windy London!"), vec!["quit", "windi", "windi", "london"]);
    }

    #[test]
    fn test_snowball_english_drops_stop_words() {
        let analyzer = Analyzer::for_kind(AnalyzerKind::Snowball);
        let terms = analyzer.analyze("The cats are running");
        assert_eq!(terms, vec!["cat", "run"]);
    }
}
