/// Scorer trait
pub trait Scorer: Send + Sync {
    /// Contribution of one term to one entry field.
    fn score(&self, tf: f64, idf: f64, field_length: f64, avg_field_length: f64) -> f64;

    fn name(&self) -> &str;
}

/// `ln(1 + (N - n + 0.5) / (n + 0.5))`; always positive for `n <= N`.
pub fn idf(total_entries: usize, doc_freq: usize) -> f64 {
    let n = total_entries as f64;
    let df = doc_freq as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// BM25 Scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BM25Scorer {
    pub k1: f64,  // Term frequency saturation (default: 1.2)
    pub b: f64,   // Length normalization strength (default: 0.75)
}

impl BM25Scorer {
    pub fn new(k1: f64, b: f64) -> Self {
        BM25Scorer { k1, b }
    }
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, tf: f64, idf: f64, field_length: f64, avg_field_length: f64) -> f64 {
        if tf <= 0.0 {
            return 0.0;
        }

        let length_ratio = if avg_field_length > 0.0 {
            field_length / avg_field_length
        } else {
            1.0
        };

        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * length_ratio);

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
