/// One stage of an analysis chain, applied to the whole token stream.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>) -> Vec<String>;

    fn name(&self) -> &str;
}
