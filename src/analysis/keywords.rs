// Local keyword extraction — finds probable nouns without calling a provider.
//
// This is deliberately heuristic: a word counts as a noun candidate if it has
// a typical noun suffix, starts with a capital letter (proper noun guess), or
// is in a small vocabulary of common domain nouns. Candidates are lowercased,
// stop words are dropped, and the survivors are ranked by frequency.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex_lite::Regex;

/// Alphabetic runs only. Anything containing digits or punctuation is split
/// at the boundary or skipped entirely.
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]+\b").expect("word pattern is valid"));

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "er", "or", "ism", "ist", "ance", "ence", "ship",
    "hood", "dom", "ing", "age", "ery", "ory", "cy", "ty", "ure",
];

const COMMON_NOUNS: &[&str] = &[
    "data", "system", "user", "file", "code", "app", "web", "api", "server", "client",
    "database", "service", "product", "company", "team", "project", "email", "phone",
    "address", "name", "text", "image", "video", "audio", "document", "report", "analysis",
    "result", "model", "algorithm", "function", "method", "process", "task", "job", "role",
    "customer", "market", "business", "industry", "technology", "platform", "solution",
    "tool", "feature", "update", "version", "release",
];

const STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when",
    "make", "can", "like", "time", "no", "just", "him", "know", "take", "people", "into",
    "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now",
    "look", "only", "come", "its", "over", "think", "also", "back", "after", "use", "two",
    "how", "our", "work", "first", "well", "way", "even", "new", "want", "because", "any",
    "these", "give", "day", "most", "us", "is", "was", "are", "been", "has", "had", "were",
    "said", "did", "having", "may", "being",
];

/// Frequency-ranked noun extraction over a single text.
///
/// Stateless apart from its word lists, so one instance can be shared
/// across every pipeline task.
pub struct KeywordExtractor {
    stop_words: HashSet<&'static str>,
    common_nouns: HashSet<&'static str>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            common_nouns: COMMON_NOUNS.iter().copied().collect(),
        }
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return up to `top_n` keywords, most frequent first.
    ///
    /// Ties are broken alphabetically so the output is deterministic.
    /// Empty input, stop-word-only input and `top_n == 0` all yield an
    /// empty list.
    pub fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<String> {
        if top_n == 0 {
            return Vec::new();
        }

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for candidate in self.noun_candidates(text) {
            let word = candidate.to_lowercase();
            if word.len() > 2 && !self.stop_words.contains(word.as_str()) {
                *frequencies.entry(word).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(top_n)
            .map(|(word, _)| word)
            .collect()
    }

    fn noun_candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        WORD_PATTERN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| self.is_likely_noun(word))
    }

    /// Heuristic noun check. Takes the token as it appeared in the text:
    /// capitalization is one of the signals, so it must not be lowercased first.
    pub fn is_likely_noun(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if lower.len() < 3 {
            return false;
        }

        if NOUN_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
            return true;
        }

        if word.chars().next().is_some_and(char::is_uppercase) {
            return true;
        }

        self.common_nouns.contains(lower.as_str())
    }
}
