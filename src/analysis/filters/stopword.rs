use std::collections::HashSet;
use std::sync::LazyLock;
use crate::analysis::filter::TokenFilter;

/// English stop words, apostrophe contractions included.
pub const ENGLISH_STOP_WORDS: [&str; 173] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would",
    "should", "could", "ought", "i'm", "you're", "he's", "she's", "it's", "we're", "they're",
    "i've", "you've", "we've", "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd",
    "i'll", "you'll", "he'll", "she'll", "we'll", "they'll", "isn't", "aren't", "wasn't",
    "weren't", "hasn't", "haven't", "hadn't", "doesn't", "don't", "didn't", "won't",
    "wouldn't", "shan't", "shouldn't", "can't", "cannot", "couldn't", "mustn't", "let's",
    "that's", "who's", "what's", "here's", "there's", "when's", "where's", "why's", "how's",
    "an", "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very",
];

static ENGLISH: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH_STOP_WORDS.into_iter().collect()
});

pub fn is_stop_word(term: &str) -> bool {
    ENGLISH.contains(term)
}

pub struct StopWordFilter {
    pub stop_words: HashSet<String>,
}

impl StopWordFilter {
    pub fn new(stop_words: Vec<String>) -> Self {
        StopWordFilter {
            stop_words: stop_words.into_iter().collect(),
        }
    }

    pub fn english() -> Self {
        let words = ENGLISH_STOP_WORDS.into_iter().map(String::from).collect();
        StopWordFilter::new(words)
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    fn name(&self) -> &str {
        "stop_words"
    }
}
