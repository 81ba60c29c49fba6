//! Keyword-based safety screening for incoming queries.
//!
//! Queries mentioning medical conditions get a restricted, gentle-only
//! system instruction downstream. This is a containment check against a
//! fixed vocabulary, not a classifier model.

/// Sentinel query text sent by the voice frontend instead of a transcription.
/// Audio content cannot be keyword-scanned, so screening is skipped for it.
pub const VOICE_QUERY_SENTINEL: &str = "🎤 Voice Query";

/// Fixed vocabulary of terms that restrict recommendations to gentle
/// breathing only. Scan order is flag order.
pub const UNSAFE_KEYWORDS: &[&str] = &[
    "pregnant",
    "trimester",
    "surgery",
    "hernia",
    "glaucoma",
    "blood pressure",
    "fracture",
    "pain",
    "injury",
];

/// Result of screening one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyReport {
    /// True iff at least one keyword matched.
    pub is_unsafe: bool,
    /// Matched keywords in scan order. Each keyword is checked once, so
    /// duplicates are impossible.
    pub flags: Vec<String>,
}

/// Screen a query against the unsafe-keyword vocabulary.
///
/// Matching is case-insensitive substring containment. Empty text and the
/// voice sentinel are skipped entirely and yield an empty report.
pub fn screen(text: &str) -> SafetyReport {
    if text.is_empty() || text == VOICE_QUERY_SENTINEL {
        return SafetyReport::default();
    }

    let lower = text.to_lowercase();
    let flags: Vec<String> = UNSAFE_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect();

    SafetyReport {
        is_unsafe: !flags.is_empty(),
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_keyword_case_insensitive() {
        let report = screen("What pose helps with back PAIN?");
        assert!(report.is_unsafe);
        assert_eq!(report.flags, vec!["pain"]);
    }

    #[test]
    fn test_no_match_is_safe() {
        let report = screen("Suggest a morning flow");
        assert!(!report.is_unsafe);
        assert!(report.flags.is_empty());
    }

    #[test]
    fn test_multiple_matches_in_scan_order() {
        let report = screen("I'm pregnant and recovering from surgery with knee pain");
        assert_eq!(report.flags, vec!["pregnant", "surgery", "pain"]);
    }

    #[test]
    fn test_multi_word_keyword() {
        let report = screen("is yoga ok with high blood pressure?");
        assert!(report.is_unsafe);
        assert_eq!(report.flags, vec!["blood pressure"]);
    }

    #[test]
    fn test_repeated_keyword_flagged_once() {
        let report = screen("pain pain pain");
        assert_eq!(report.flags, vec!["pain"]);
    }

    #[test]
    fn test_empty_text_skipped() {
        assert_eq!(screen(""), SafetyReport::default());
    }

    #[test]
    fn test_voice_sentinel_skipped() {
        assert_eq!(screen(VOICE_QUERY_SENTINEL), SafetyReport::default());
    }

    #[test]
    fn test_flags_subset_of_vocabulary() {
        let report = screen("glaucoma and a hernia and a fracture");
        for flag in &report.flags {
            assert!(UNSAFE_KEYWORDS.contains(&flag.as_str()));
        }
    }

    #[test]
    fn test_unsafe_iff_flags_nonempty() {
        for text in ["hello", "hernia", "", VOICE_QUERY_SENTINEL] {
            let report = screen(text);
            assert_eq!(report.is_unsafe, !report.flags.is_empty());
        }
    }
}
