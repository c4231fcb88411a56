/// Lowercases `s` and drops everything that is neither alphanumeric nor an apostrophe.
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '\'')
        .collect()
}

/// Splits on single spaces and normalizes every piece.
///
/// Consecutive spaces and pieces made only of punctuation yield empty
/// tokens; they are kept here and dropped by stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(' ').map(normalize).collect()
}

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &str;
}

/// Space separated tokenizer used for both documents and queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}
