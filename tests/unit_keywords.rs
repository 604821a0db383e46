// Unit tests for local keyword extraction.
//
// Tests KeywordExtractor::extract_keywords ranking and filtering properties
// and the is_likely_noun heuristic, through the public API only.

use knowledge_extractor::analysis::KeywordExtractor;

// ============================================================
// extract_keywords — ranking
// ============================================================

#[test]
fn most_frequent_candidate_ranks_first() {
    let ke = KeywordExtractor::new();
    let text = "Kubernetes deployment failed. The deployment was rolled back and the deployment succeeded later.";
    // deployment x3; kubernetes (capitalized) and later (-er) tie at 1
    assert_eq!(
        ke.extract_keywords(text, 3),
        vec!["deployment", "kubernetes", "later"]
    );
}

#[test]
fn case_variants_merge_into_one_keyword() {
    let ke = KeywordExtractor::new();
    assert_eq!(ke.extract_keywords("Server server SERVER", 5), vec!["server"]);
}

#[test]
fn fewer_candidates_than_requested() {
    let ke = KeywordExtractor::new();
    assert_eq!(ke.extract_keywords("the database", 10), vec!["database"]);
}

#[test]
fn punctuation_separates_words() {
    let ke = KeywordExtractor::new();
    assert_eq!(
        ke.extract_keywords("data, data; data! code.", 5),
        vec!["data", "code"]
    );
}

#[test]
fn extraction_is_deterministic() {
    let ke = KeywordExtractor::new();
    let text = "Alpha platform, Beta platform, Gamma service, Delta service, Epsilon tool";
    let first = ke.extract_keywords(text, 4);
    for _ in 0..10 {
        assert_eq!(ke.extract_keywords(text, 4), first);
    }
}

// ============================================================
// extract_keywords — empty results
// ============================================================

#[test]
fn empty_text_yields_nothing() {
    let ke = KeywordExtractor::new();
    assert!(ke.extract_keywords("", 3).is_empty());
    assert!(ke.extract_keywords("   \n\t ", 3).is_empty());
}

#[test]
fn stop_words_only_yields_nothing() {
    let ke = KeywordExtractor::new();
    assert!(ke.extract_keywords("the and of to in that have", 3).is_empty());
}

#[test]
fn short_words_never_returned() {
    let ke = KeywordExtractor::new();
    // Capitalized but only two letters long
    assert!(ke.extract_keywords("AI ML UX", 3).is_empty());
}

#[test]
fn result_never_exceeds_top_n() {
    let ke = KeywordExtractor::new();
    let text = "server client database service product company team project email phone";
    for n in 0..6 {
        assert!(ke.extract_keywords(text, n).len() <= n);
    }
}

// ============================================================
// is_likely_noun
// ============================================================

#[test]
fn suffix_rule_applies_case_insensitively() {
    let ke = KeywordExtractor::new();
    assert!(ke.is_likely_noun("INFORMATION"));
    assert!(ke.is_likely_noun("payment"));
}

#[test]
fn vocabulary_words_are_nouns() {
    let ke = KeywordExtractor::new();
    for word in ["algorithm", "platform", "customer", "video"] {
        assert!(ke.is_likely_noun(word), "{word}");
    }
}

#[test]
fn plain_verbs_and_adjectives_are_not_nouns() {
    let ke = KeywordExtractor::new();
    for word in ["quickly", "blue", "jump", "safe"] {
        assert!(!ke.is_likely_noun(word), "{word}");
    }
}
