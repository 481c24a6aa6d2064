use crate::extract::error::ExtractError;
use crate::extract::mention::{Mention, sort_mentions};
use crate::extract::{Extractor, RawFields};
use ordermap::OrderMap;
use regex::RegexBuilder;

const PATTERN_EXTRACTOR_CONFIDENCE: f32 = 1.0;

/// Mention producer backed by a fixed `{label -> regex}` table, matched
/// case-insensitively against every raw field.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    patterns: OrderMap<String, regex::Regex>,
}

impl PatternExtractor {
    pub fn new(patterns: impl IntoIterator<Item = (String, String)>) -> Result<Self, ExtractError> {
        let mut compiled = OrderMap::new();
        for (label, pattern) in patterns {
            let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
            compiled.insert(label, regex);
        }
        Ok(PatternExtractor { patterns: compiled })
    }
}

impl Extractor for PatternExtractor {
    fn extract(&self, raw_fields: &RawFields) -> Result<Vec<Mention>, ExtractError> {
        let mut mentions = Vec::new();
        for (field, text) in raw_fields {
            for (label, regex) in &self.patterns {
                for m in regex.find_iter(text) {
                    if m.as_str().is_empty() {
                        continue;
                    }
                    mentions.push(Mention {
                        label: label.clone(),
                        surface_form: m.as_str().to_string(),
                        source_field: field.clone(),
                        start: m.start(),
                        end: m.end(),
                        extractor_conf: PATTERN_EXTRACTOR_CONFIDENCE,
                    });
                }
            }
        }
        sort_mentions(&mut mentions);
        Ok(mentions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn emits_mention_with_correct_offsets() {
        let extractor = PatternExtractor::new([(
            "disease".to_string(),
            r"\blung cancer\b".to_string(),
        )])
        .unwrap();

        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "We profiled lung cancer samples and matched controls.".to_string(),
        );

        let mentions = extractor.extract(&fields).unwrap();
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.surface_form, "lung cancer");
        assert_eq!(&fields["summary"][m.start..m.end], m.surface_form);
    }

    #[test]
    fn matches_are_sorted_deterministically() {
        let extractor = PatternExtractor::new([
            ("disease".to_string(), r"\bcancer\b".to_string()),
            ("tissue".to_string(), r"\blung\b".to_string()),
        ])
        .unwrap();

        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), "lung cancer study".to_string());

        let mentions = extractor.extract(&fields).unwrap();
        assert_eq!(mentions[0].surface_form, "lung");
        assert_eq!(mentions[1].surface_form, "cancer");
    }
}
