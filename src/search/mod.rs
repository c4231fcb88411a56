pub mod executor;
pub mod fuzzy;
pub mod options;
pub mod results;
