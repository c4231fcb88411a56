use std::sync::LazyLock;
use levenshtein_automata::{LevenshteinAutomatonBuilder, DFA, Distance};

/// Largest distance served by a precompiled automaton; anything above uses
/// the dynamic programming fallback.
const MAX_DFA_DISTANCE: u32 = 2;

static BUILDERS: LazyLock<Vec<LevenshteinAutomatonBuilder>> = LazyLock::new(|| {
    (0..=MAX_DFA_DISTANCE as u8)
        .map(|distance| LevenshteinAutomatonBuilder::new(distance, true))
        .collect()
});

/// Edit distance counting insertions, deletions, substitutions and swaps of
/// two adjacent characters, each at cost 1 (optimal string alignment).
pub fn damerau_levenshtein(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    osa_distance(&a, &b, None).unwrap_or(u32::MAX)
}

/// Same metric as `damerau_levenshtein`, but gives up with `None` as soon as
/// the distance is known to exceed `max`.
pub fn bounded_damerau_levenshtein(a: &str, b: &str, max: u32) -> Option<u32> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max as usize {
        return None;
    }
    osa_distance(&a, &b, Some(max))
}

fn osa_distance(a: &[char], b: &[char], max: Option<u32>) -> Option<u32> {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 || len_b == 0 {
        let d = len_a.max(len_b) as u32;
        return match max {
            Some(max) if d > max => None,
            _ => Some(d),
        };
    }

    let mut two_ago: Vec<u32> = vec![0; len_b + 1];
    let mut prev_row: Vec<u32> = (0..=len_b as u32).collect();
    let mut curr_row: Vec<u32> = vec![0; len_b + 1];

    for i in 1..=len_a {
        curr_row[0] = i as u32;
        let mut row_min = curr_row[0];

        for j in 1..=len_b {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)     // deletion
                .min(curr_row[j - 1] + 1)       // insertion
                .min(prev_row[j - 1] + cost);   // substitution

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                curr_row[j] = curr_row[j].min(two_ago[j - 2] + 1);
            }

            row_min = row_min.min(curr_row[j]);
        }

        if let Some(max) = max {
            // a transposition can only lower a cell by looking back two rows,
            // and those are covered by the minimum of this row and the last
            if row_min > max && prev_row.iter().min().is_some_and(|&m| m > max) {
                return None;
            }
        }

        std::mem::swap(&mut two_ago, &mut prev_row);
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len_b];
    match max {
        Some(max) if distance > max => None,
        _ => Some(distance),
    }
}

/// Matches candidate terms within a fixed edit distance of one query term.
pub struct FuzzyAutomaton {
    /// The target term to match
    term: String,

    /// Maximum allowed edit distance
    max_edit_distance: u32,

    /// Precompiled DFA, absent for distances above `MAX_DFA_DISTANCE`
    dfa: Option<DFA>,
}

impl FuzzyAutomaton {
    pub fn new(term: &str, max_edit_distance: u32) -> Self {
        let dfa = BUILDERS
            .get(max_edit_distance as usize)
            .map(|builder| builder.build_dfa(term));

        FuzzyAutomaton {
            term: term.to_string(),
            max_edit_distance,
            dfa,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Check if a candidate matches within edit distance
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.dfa {
            Some(dfa) => {
                let mut state = dfa.initial_state();
                for &byte in candidate.as_bytes() {
                    state = dfa.transition(state, byte);
                }
                matches!(dfa.distance(state), Distance::Exact(d) if u32::from(d) <= self.max_edit_distance)
            }
            None => bounded_damerau_levenshtein(&self.term, candidate, self.max_edit_distance).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_zero() {
        for word in ["", "a", "windi", "algorithm", "héllo"] {
            assert_eq!(damerau_levenshtein(word, word), 0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [("kitten", "sitting"), ("link", "rank"), ("ca", "abc"), ("", "abc"), ("windi", "wind")];
        for (a, b) in pairs {
            assert_eq!(damerau_levenshtein(a, b), damerau_levenshtein(b, a), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_known_distances() {
        assert_eq!(damerau_levenshtein("kitten", "sitting"), 3);
        assert_eq!(damerau_levenshtein("teh", "the"), 1);
        assert_eq!(damerau_levenshtein("link", "rank"), 2);
        assert_eq!(damerau_levenshtein("", "abc"), 3);
        // optimal string alignment does not edit a transposed pair again
        assert_eq!(damerau_levenshtein("ca", "abc"), 3);
    }

    #[test]
    fn test_bounded_agrees_with_full() {
        let pairs = [("kitten", "sitting"), ("teh", "the"), ("link", "rank"), ("windi", "windy"), ("abc", "")];
        for (a, b) in pairs {
            let full = damerau_levenshtein(a, b);
            for max in 0..5 {
                let expected = if full <= max { Some(full) } else { None };
                assert_eq!(bounded_damerau_levenshtein(a, b, max), expected, "{} / {} max {}", a, b, max);
            }
        }
    }

    #[test]
    fn test_automaton_matches_like_distance() {
        let candidates = ["windi", "wind", "windy", "window", "london", "idniw", "wnidi"];
        for max in 0..=3 {
            let automaton = FuzzyAutomaton::new("windi", max);
            for candidate in candidates {
                assert_eq!(
                    automaton.matches(candidate),
                    damerau_levenshtein("windi", candidate) <= max,
                    "windi / {} max {}",
                    candidate,
                    max
                );
            }
        }
    }
}
