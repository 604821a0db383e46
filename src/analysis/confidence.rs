// Confidence scoring — a heuristic quality estimate for one analysis.
//
// Not a calibrated probability. It rewards longer source texts, summaries of
// a sensible length, a full topic set, and a summary that actually compresses
// the source.

const BASE_CONFIDENCE: f64 = 0.5;

/// Compute a confidence score in [0.0, 1.0] for an analysis.
///
/// Returns 0.0 when either the text or the summary is empty.
pub fn calculate_confidence(text: &str, summary: &str, topics: &[String]) -> f64 {
    if text.is_empty() || summary.is_empty() {
        return 0.0;
    }

    let text_words = text.split_whitespace().count();
    let summary_words = summary.split_whitespace().count();

    let mut confidence = BASE_CONFIDENCE;

    if text_words > 50 {
        confidence += 0.2;
    } else if text_words > 20 {
        confidence += 0.1;
    }

    if summary_words > 5 && summary_words < 50 {
        confidence += 0.1;
    }

    if topics.len() >= 3 {
        confidence += 0.1;
    }

    // Whitespace-only text has no ratio to speak of
    if text_words > 0 {
        let compression = summary_words as f64 / text_words as f64;
        if compression > 0.05 && compression < 0.3 {
            confidence += 0.1;
        }
    }

    confidence.min(1.0)
}
