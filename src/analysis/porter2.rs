//! Porter2-style English stemmer.
//!
//! Works on a char buffer so that non-ASCII input never splits a code point.
//! Vowels are `a e i o u y`; a `y` that acts as a consonant is upper-cased to
//! `Y` for the duration of the algorithm and lowered again at the end.

use crate::analysis::filters::stopword::is_stop_word;

/// Words longer than this are kept as they are.
pub const MAX_STEM_LENGTH: usize = 40;

const EXCEPTIONS: [(&str, &str); 11] = [
    ("gently", "gentl"),
    ("singly", "singl"),
    ("early", "earli"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("skis", "ski"),
    ("idly", "idl"),
    ("ugly", "ugli"),
    ("only", "onli"),
];

const INVARIANTS: [&str; 7] = ["cosmos", "atlas", "andes", "news", "howe", "bias", "sky"];

const STEP_1A_INVARIANTS: [&str; 8] = [
    "inning", "outing", "canning", "herring", "earring", "proceed", "exceed", "succeed",
];

const R1_PREFIXES: [&str; 3] = ["gener", "commun", "arsen"];

const DOUBLES: [&str; 9] = ["bb", "dd", "ff", "gg", "mm", "nn", "pp", "rr", "tt"];

const STEP_2: [(&str, &str); 22] = [
    ("ization", "ize"),
    ("ousness", "ous"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ational", "ate"),
    ("tional", "tion"),
    ("lessli", "less"),
    ("biliti", "ble"),
    ("alism", "al"),
    ("aliti", "al"),
    ("entli", "ent"),
    ("ation", "ate"),
    ("ousli", "ous"),
    ("iviti", "ive"),
    ("fulli", "ful"),
    ("abli", "able"),
    ("anci", "ance"),
    ("ator", "ate"),
    ("enci", "ence"),
    ("izer", "ize"),
    ("alli", "al"),
    ("bli", "ble"),
];

const STEP_3: [(&str, &str); 8] = [
    ("ational", "ate"),
    ("tional", "tion"),
    ("alize", "al"),
    ("icate", "ic"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ness", ""),
    ("ful", ""),
];

const STEP_4: [&str; 16] = [
    "ement", "ment", "able", "ance", "ence", "ible", "ate", "ant", "ism", "iti", "ous", "ive",
    "ize", "al", "er", "ic",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn is_vowel_without_y(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_valid_li_ending(c: char) -> bool {
    matches!(c, 'c' | 'd' | 'e' | 'g' | 'h' | 'k' | 'm' | 'n' | 'r' | 't')
}

fn is_short(w: &[char]) -> bool {
    let len = w.len();
    let consonant_vowel_consonant = len >= 3
        && !is_vowel(w[len - 3])
        && is_vowel(w[len - 2])
        && !is_vowel(w[len - 1])
        && !matches!(w[len - 1], 'w' | 'x' | 'Y');
    let vowel_consonant = len == 2 && is_vowel(w[0]) && !is_vowel(w[1]);

    consonant_vowel_consonant || vowel_consonant
}

struct Word {
    chars: Vec<char>,
}

impl Word {
    fn new(s: &str) -> Self {
        Word { chars: s.chars().collect() }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn is(&self, s: &str) -> bool {
        self.chars.iter().copied().eq(s.chars())
    }

    fn ends_with(&self, suffix: &str) -> bool {
        let n = suffix.chars().count();
        n <= self.len() && self.chars[self.len() - n..].iter().copied().eq(suffix.chars())
    }

    fn starts_with(&self, prefix: &str) -> bool {
        let n = prefix.chars().count();
        n <= self.len() && self.chars[..n].iter().copied().eq(prefix.chars())
    }

    fn replace_suffix(&mut self, from: &str, to: &str) -> bool {
        if !self.ends_with(from) {
            return false;
        }
        let keep = self.len() - from.chars().count();
        self.chars.truncate(keep);
        self.chars.extend(to.chars());
        true
    }

    /// Replaces `from` only when the suffix starts at or after `start`.
    fn replace_suffix_from(&mut self, start: usize, from: &str, to: &str) -> bool {
        self.ends_with(from)
            && self.len() - from.chars().count() >= start
            && self.replace_suffix(from, to)
    }

    fn contains_vowel(&self, start: usize, end: usize) -> bool {
        let end = end.min(self.len());
        start < end && self.chars[start..end].iter().any(|&c| is_vowel(c))
    }

    /// Replaces `from` when the part before it holds a vowel.
    fn replace_after_vowel(&mut self, from: &str, to: &str) -> bool {
        let n = from.chars().count();
        self.len() > 2
            && self.ends_with(from)
            && self.contains_vowel(0, self.len() - n)
            && self.replace_suffix(from, to)
    }

    fn ends_with_double(&self) -> bool {
        self.len() > 2 && DOUBLES.iter().any(|d| self.ends_with(d))
    }

    fn first_non_vowel(&self, start: usize) -> usize {
        for i in start.max(1)..self.len() {
            if is_vowel(self.chars[i - 1]) && !is_vowel(self.chars[i]) {
                return i + 1;
            }
        }
        self.len()
    }

    fn special_r1(&self) -> Option<usize> {
        R1_PREFIXES
            .iter()
            .find(|prefix| self.starts_with(prefix))
            .map(|prefix| prefix.chars().count())
    }

    fn set_initial_y(&mut self) {
        if self.chars[0] == 'y' {
            self.chars[0] = 'Y';
        }
        let mut i = 1;
        while i < self.len() {
            if self.chars[i] == 'y' && is_vowel_without_y(self.chars[i - 1]) {
                self.chars[i] = 'Y';
                i += 1;
            }
            i += 1;
        }
    }

    fn step_0(&mut self) {
        let _ = self.replace_suffix("'s'", "")
            || self.replace_suffix("'s", "")
            || self.replace_suffix("'", "");
    }

    fn step_1a(&mut self) {
        let length = self.len();
        if self.replace_suffix("sses", "ss") {
            return;
        }

        let to = if length < 3 || length > 4 { "i" } else { "ie" };
        if self.replace_suffix("ied", to) || self.replace_suffix("ies", to) {
            return;
        }

        if self.ends_with("us") || self.ends_with("ss") {
            return;
        }

        // drop a final "s" when a vowel occurs before the letter preceding it
        if length > 2 && self.ends_with("s") && self.contains_vowel(0, length - 2) {
            self.chars.pop();
        }
    }

    fn step_1b(&mut self, r1: usize) {
        if self.replace_suffix_from(r1, "eedly", "ee") || self.replace_suffix_from(r1, "eed", "ee") {
            return;
        }
        if self.ends_with("eedly") || self.ends_with("eed") {
            return;
        }

        let replaced = self.replace_after_vowel("ingly", "")
            || self.replace_after_vowel("edly", "")
            || self.replace_after_vowel("ing", "")
            || self.replace_after_vowel("ed", "");

        if replaced {
            if self.ends_with("at") || self.ends_with("bl") || self.ends_with("iz") {
                self.chars.push('e');
            } else if self.ends_with_double() {
                self.chars.pop();
            } else if is_short(&self.chars) && self.len() == r1 {
                self.chars.push('e');
            }
        }
    }

    fn step_1c(&mut self) {
        let len = self.len();
        if len <= 2 {
            return;
        }
        if matches!(self.chars[len - 1], 'y' | 'Y') && !is_vowel_without_y(self.chars[len - 2]) {
            self.chars[len - 1] = 'i';
        }
    }

    fn step_2(&mut self, r1: usize) {
        for (from, to) in STEP_2 {
            if self.replace_suffix_from(r1, from, to) {
                return;
            }
        }
        if self.replace_suffix_from(r1.saturating_sub(1), "logi", "log") {
            return;
        }
        // a listed suffix outside r1 blocks the "li" rule
        if STEP_2.iter().any(|(from, _)| self.ends_with(from)) {
            return;
        }

        if self.ends_with("li") {
            let found = self.len() - 2;
            if found >= r1 && found >= 1 && is_valid_li_ending(self.chars[found - 1]) {
                self.chars.truncate(found);
            }
        }
    }

    fn step_3(&mut self, r1: usize, r2: usize) {
        for (from, to) in STEP_3 {
            if self.replace_suffix_from(r1, from, to) {
                return;
            }
        }
        self.replace_suffix_from(r2, "ative", "");
    }

    fn step_4(&mut self, r2: usize) {
        for from in STEP_4 {
            if self.replace_suffix_from(r2, from, "") {
                return;
            }
        }

        if !self.ends_with("ement") && !self.ends_with("ment") {
            self.replace_suffix_from(r2, "ent", "");
        }

        if self.ends_with("ion") {
            let found = self.len() - 3;
            if found + 1 >= r2 && found >= 1 && matches!(self.chars[found - 1], 's' | 't') {
                self.chars.truncate(found);
            }
        }
    }

    fn step_5(&mut self, r1: usize, r2: usize) {
        if self.ends_with("e") {
            let found = self.len() - 1;
            if found >= r2 || (found >= r1 && !is_short(&self.chars[..found])) {
                self.chars.pop();
                return;
            }
        }

        if self.ends_with("l") {
            let found = self.len() - 1;
            if found >= r2 && found >= 1 && self.chars[found - 1] == 'l' {
                self.chars.pop();
            }
        }
    }

    fn into_string(self) -> String {
        self.chars
            .into_iter()
            .map(|c| if c == 'Y' { 'y' } else { c })
            .collect()
    }
}

/// Stems one normalized token.
///
/// Returns `None` for tokens that should not be indexed at all: empty and
/// single-character tokens and stop words. The steps are applied until the
/// word stops changing, so a stem always stems to itself.
pub fn stem(term: &str) -> Option<String> {
    let mut current = stem_once(term)?;
    // Each pass that changes the word shortens it or turns y into i or i into e.
    loop {
        let next = stem_once(&current)?;
        if next == current {
            return Some(current);
        }
        current = next;
    }
}

fn stem_once(term: &str) -> Option<String> {
    let length = term.chars().count();

    if length <= 1 {
        return None;
    }
    if length > MAX_STEM_LENGTH {
        return Some(term.to_string());
    }
    if is_stop_word(term) {
        return None;
    }
    if let Some((_, stemmed)) = EXCEPTIONS.iter().find(|(word, _)| *word == term) {
        return Some(stemmed.to_string());
    }
    if INVARIANTS.contains(&term) {
        return Some(term.to_string());
    }

    let mut word = Word::new(term.strip_prefix('\'').unwrap_or(term));
    if word.len() == 0 {
        return None;
    }

    word.set_initial_y();

    let r1 = word.special_r1().unwrap_or_else(|| word.first_non_vowel(1));
    let r2 = word.first_non_vowel(r1);

    word.step_0();
    word.step_1a();

    if STEP_1A_INVARIANTS.iter().any(|w| word.is(w)) {
        return Some(word.into_string());
    }

    word.step_1b(r1);
    word.step_1c();
    word.step_2(r1);
    word.step_3(r1, r2);
    word.step_4(r2);
    word.step_5(r1, r2);

    Some(word.into_string()).filter(|stemmed| !stemmed.is_empty())
}

/// Stems every term, dropping the ones `stem` rejects. Order and duplicates
/// are preserved since repeated stems count toward term frequency.
pub fn stem_all<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms.into_iter().filter_map(|t| stem(t.as_ref())).collect()
}
