use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::analysis::analyzer::AnalyzerKind;
use crate::compression::compress::Codec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::search::options::MatchType;

/// Per-document configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// bm25_k1 = 1.5
/// codec = "zstd"
///
/// [search]
/// page_size = 25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bm25_k1: f64,           // Term frequency saturation
    pub bm25_b: f64,            // Field length normalization strength
    pub codec: Codec,           // Byte compressor wrapped around the record stream
    pub analyzer: AnalyzerKind, // Used for both indexing and queries
    pub search: SearchDefaults,
}

/// Defaults applied by `SearchOptions::from_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub page_size: u64,
    pub word_min_size: usize,
    pub fuzzy_max_distance: u32,
    pub match_type: MatchType,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bm25_k1: 1.2,
            bm25_b: 0.75,
            codec: Codec::Lz4,
            analyzer: AnalyzerKind::Porter2,
            search: SearchDefaults::default(),
        }
    }
}

impl Default for SearchDefaults {
    fn default() -> Self {
        SearchDefaults {
            page_size: 10,
            word_min_size: 3,
            fuzzy_max_distance: 2,
            match_type: MatchType::Fuzzy,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bm25_k1.is_finite() || self.bm25_k1 < 0.0 {
            return Err(Error::new(ErrorKind::Config, format!("bm25_k1 must be >= 0, got {}", self.bm25_k1)));
        }
        if !(0.0..=1.0).contains(&self.bm25_b) {
            return Err(Error::new(ErrorKind::Config, format!("bm25_b must be within [0, 1], got {}", self.bm25_b)));
        }
        if self.search.page_size == 0 {
            return Err(Error::new(ErrorKind::Config, "search.page_size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("bm25_k1 = 1.5\ncodec = \"zstd\"\n\n[search]\npage_size = 25\n").unwrap();
        assert_eq!(config.bm25_k1, 1.5);
        assert_eq!(config.bm25_b, 0.75);
        assert_eq!(config.codec, Codec::Zstd);
        assert_eq!(config.search.page_size, 25);
        assert_eq!(config.search.word_min_size, 3);
        assert_eq!(config.search.match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_out_of_range_b() {
        let err = Config::from_toml_str("bm25_b = 1.5").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn test_rejects_unknown_codec() {
        let err = Config::from_toml_str("codec = \"brotli\"").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }
}
