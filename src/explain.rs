//! Keyword-overlap explanations for ranked results.
//!
//! Ranking is by vector score alone; the explanation is a presentation-side
//! justification showing which query words actually occur in the matched
//! document. Both texts are tokenized into sets of lowercase alphanumeric
//! runs (punctuation is a separator), intersected, and summarized with the
//! fraction of query tokens covered.

use std::collections::BTreeSet;

use serde::Serialize;

/// Why a document matched: overlap keywords and coverage of the query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Explanation {
    /// Templated one-sentence justification.
    pub why_this: String,
    /// Query tokens that also appear in the document (sorted, deduplicated).
    pub overlapped_keywords: Vec<String>,
    /// `|overlap| / |query tokens|`, rounded to 2 decimals; 0.0 for an
    /// empty query.
    pub overlap_ratio: f32,
}

/// Build an explanation for a `(query, document)` pair and its vector score.
pub fn explain(query_text: &str, doc_text: &str, score: f32) -> Explanation {
    let query_tokens = tokenize(query_text);
    let doc_tokens = tokenize(doc_text);

    let overlapped: Vec<String> = query_tokens.intersection(&doc_tokens).cloned().collect();

    let overlap_ratio = if query_tokens.is_empty() {
        0.0
    } else {
        overlapped.len() as f32 / query_tokens.len() as f32
    };

    Explanation {
        why_this: format!(
            "High semantic match ({score:.2}) with {} keyword overlaps.",
            overlapped.len()
        ),
        overlapped_keywords: overlapped,
        overlap_ratio: round_to(overlap_ratio, 2),
    }
}

/// Split text into a set of lowercase alphanumeric-run tokens.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Round to `places` decimal digits.
pub fn round_to(value: f32, places: u32) -> f32 {
    let factor = 10f32.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_overlap() {
        let explanation = explain("space shuttle", "the space shuttle launch", 0.91);
        assert_eq!(explanation.overlap_ratio, 1.0);
        assert_eq!(
            explanation.overlapped_keywords,
            vec!["shuttle".to_string(), "space".to_string()]
        );
    }

    #[test]
    fn test_no_overlap() {
        let explanation = explain("quantum physics", "jpeg compression algorithm", 0.1);
        assert_eq!(explanation.overlap_ratio, 0.0);
        assert!(explanation.overlapped_keywords.is_empty());
    }

    #[test]
    fn test_partial_overlap() {
        let explanation = explain("space shuttle orbit fuel", "space fuel depot", 0.5);
        // 2 of 4 query tokens appear in the document.
        assert_eq!(explanation.overlap_ratio, 0.5);
        assert_eq!(explanation.overlapped_keywords.len(), 2);
    }

    #[test]
    fn test_empty_query_never_divides_by_zero() {
        let explanation = explain("", "some document text", 0.0);
        assert_eq!(explanation.overlap_ratio, 0.0);

        let punct_only = explain("?!...", "some document text", 0.0);
        assert_eq!(punct_only.overlap_ratio, 0.0);
    }

    #[test]
    fn test_ratio_in_bounds() {
        let cases = [
            ("a b c", "a"),
            ("a a a", "a b"),
            ("x", ""),
            ("", ""),
            ("one two", "one two three"),
        ];
        for (query, doc) in cases {
            let ratio = explain(query, doc, 0.0).overlap_ratio;
            assert!((0.0..=1.0).contains(&ratio), "{query:?}/{doc:?} -> {ratio}");
        }
    }

    #[test]
    fn test_duplicate_query_tokens_counted_once() {
        let explanation = explain("space space space", "space", 0.9);
        assert_eq!(explanation.overlap_ratio, 1.0);
        assert_eq!(explanation.overlapped_keywords, vec!["space".to_string()]);
    }

    #[test]
    fn test_punctuation_is_separator() {
        let explanation = explain("space-shuttle, launch!", "shuttle launch space", 0.9);
        assert_eq!(explanation.overlap_ratio, 1.0);
    }

    #[test]
    fn test_case_insensitive() {
        let explanation = explain("SPACE Shuttle", "space shuttle", 0.9);
        assert_eq!(explanation.overlap_ratio, 1.0);
    }

    #[test]
    fn test_summary_names_score_and_count() {
        let explanation = explain("space shuttle", "space shuttle", 0.8765);
        assert!(explanation.why_this.contains("0.88"));
        assert!(explanation.why_this.contains("2 keyword overlaps"));
    }

    #[test]
    fn test_ratio_rounded_to_two_decimals() {
        // 1 of 3 tokens -> 0.333... -> 0.33
        let explanation = explain("one two three", "one", 0.5);
        assert_eq!(explanation.overlap_ratio, 0.33);
    }
}
