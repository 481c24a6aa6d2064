//! Window-based negation detection around a mention's surface form.

use crate::extract::mention::Mention;
use std::collections::BTreeMap;

const DEFAULT_WINDOW: usize = 60;

const NEGATION_PATTERNS: &[&str] = &["no", "not", "without", "negative for", "no evidence of"];

#[derive(Debug, Clone, Copy)]
pub struct NegationDetector {
    window: usize,
}

impl Default for NegationDetector {
    fn default() -> Self {
        NegationDetector {
            window: DEFAULT_WINDOW,
        }
    }
}

impl NegationDetector {
    pub fn new(window: usize) -> Self {
        NegationDetector { window }
    }

    /// Checks whether any negation cue appears in the context window around
    /// `mention` within its source field.
    pub fn is_negated(&self, raw_fields: &BTreeMap<String, String>, mention: &Mention) -> bool {
        let Some(field_text) = raw_fields.get(&mention.source_field) else {
            return false;
        };
        let len = field_text.len();
        let start = mention.start.saturating_sub(self.window).min(len);
        let end = (mention.end + self.window).min(len);
        let Some(window_text) = field_text.get(start..end) else {
            return false;
        };
        let lower = window_text.to_lowercase();

        NEGATION_PATTERNS.iter().any(|pattern| word_boundary_contains(&lower, pattern))
    }
}

fn word_boundary_contains(haystack: &str, needle: &str) -> bool {
    let mut search_from = 0;
    while let Some(rel) = haystack[search_from..].find(needle) {
        let idx = search_from + rel;
        let before_ok = haystack[..idx]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_idx = idx + needle.len();
        let after_ok = haystack[after_idx..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        search_from = idx + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(field: &str, start: usize, end: usize) -> Mention {
        Mention {
            label: "disease".to_string(),
            surface_form: "lung cancer".to_string(),
            source_field: field.to_string(),
            start,
            end,
            extractor_conf: 1.0,
        }
    }

    #[test]
    fn detects_negation_within_window() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "No lung cancer was detected.".to_string(),
        );
        let m = mention("summary", 3, 14);
        assert!(NegationDetector::new(20).is_negated(&fields, &m));
    }

    #[test]
    fn does_not_flag_unrelated_text() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "We profiled lung cancer samples.".to_string(),
        );
        let m = mention("summary", 11, 22);
        assert!(!NegationDetector::new(20).is_negated(&fields, &m));
    }

    #[test]
    fn does_not_match_substring_of_a_longer_word() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "Knotweed lung cancer samples were studied.".to_string(),
        );
        let m = mention("summary", 9, 20);
        assert!(!NegationDetector::new(5).is_negated(&fields, &m));
    }
}
