pub mod analyzer;
pub mod filter;
pub mod filters;
pub mod porter2;
pub mod tokenizer;
