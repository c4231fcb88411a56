use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::filter::TokenFilter;
use crate::analysis::porter2;

/// Built-in Porter2 stemmer. Also drops stop words and tokens shorter than
/// two characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Porter2Filter;

impl TokenFilter for Porter2Filter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        porter2::stem_all(tokens)
    }

    fn name(&self) -> &str {
        "porter2"
    }
}

/// Snowball stemmer from `rust-stemmers`. Only stems; pair it with a
/// `StopWordFilter` to drop stop words.
pub struct StemmerFilter {
    pub algorithm: Algorithm,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter { algorithm }
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        let stemmer = Stemmer::create(self.algorithm);

        tokens.into_iter()
            .filter(|token| !token.is_empty())
            .map(|token| stemmer.stem(&token).into_owned())
            .collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porter2_filter_drops_stop_words() {
        let tokens = ["the", "windy", "", "london"].map(String::from).to_vec();
        assert_eq!(Porter2Filter.filter(tokens), vec!["windi", "london"]);
    }

    #[test]
    fn test_snowball_filter() {
        let filter = StemmerFilter::new(Algorithm::English);
        let tokens = ["running", "", "cats"].map(String::from).to_vec();
        assert_eq!(filter.filter(tokens), vec!["run", "cat"]);
    }
}
