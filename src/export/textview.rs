//! Deterministic concatenation of selected raw fields, used for local
//! context and as a stable hash recorded on every sample record.

use crate::export::stable_json::stable_dumps;
use crate::hashing::sha256_hex_str;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct TextViewConfig {
    pub field_priority: Vec<String>,
    pub max_field_chars: usize,
}

impl Default for TextViewConfig {
    fn default() -> Self {
        TextViewConfig {
            field_priority: Vec::new(),
            max_field_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SelectedField {
    field_key: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextView {
    pub selected: Vec<(String, String)>,
    pub hash: String,
}

/// Selects fields present in `raw_fields` following `field_priority` order,
/// truncates each to `max_field_chars`, and hashes the canonical JSON of the
/// selection — so the same raw fields always produce the same hash
/// regardless of the source map's key order.
pub fn build_textview(
    raw_fields: &std::collections::BTreeMap<String, String>,
    config: &TextViewConfig,
) -> TextView {
    let mut selected = Vec::new();
    for field_key in &config.field_priority {
        if let Some(text) = raw_fields.get(field_key) {
            let truncated: String = text.chars().take(config.max_field_chars).collect();
            selected.push((field_key.clone(), truncated));
        }
    }

    let fields_for_hash: Vec<SelectedField> = selected
        .iter()
        .map(|(field_key, text)| SelectedField {
            field_key: field_key.clone(),
            text: text.clone(),
        })
        .collect();
    let hash = sha256_hex_str(&stable_dumps(&fields_for_hash).expect("selected fields always serialize"));

    TextView { selected, hash }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn hash_is_independent_of_raw_field_insertion_order() {
        let config = TextViewConfig {
            field_priority: vec!["title".to_string(), "summary".to_string()],
            max_field_chars: 100,
        };

        let mut a = BTreeMap::new();
        a.insert("title".to_string(), "t".to_string());
        a.insert("summary".to_string(), "s".to_string());

        let mut b = BTreeMap::new();
        b.insert("summary".to_string(), "s".to_string());
        b.insert("title".to_string(), "t".to_string());

        assert_eq!(build_textview(&a, &config).hash, build_textview(&b, &config).hash);
    }

    #[test]
    fn truncates_long_fields() {
        let config = TextViewConfig {
            field_priority: vec!["summary".to_string()],
            max_field_chars: 3,
        };
        let mut fields = BTreeMap::new();
        fields.insert("summary".to_string(), "abcdef".to_string());
        let view = build_textview(&fields, &config);
        assert_eq!(view.selected[0].1, "abc");
    }

    #[test]
    fn missing_fields_are_skipped() {
        let config = TextViewConfig {
            field_priority: vec!["missing".to_string()],
            max_field_chars: 100,
        };
        let view = build_textview(&BTreeMap::new(), &config);
        assert!(view.selected.is_empty());
    }
}
