use serde::{Deserialize, Serialize};

/// A labeled span inside one raw field, produced by an [`Extractor`](crate::extract::Extractor).
///
/// Invariant: `raw_fields[source_field][start..end] == surface_form`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub label: String,
    pub surface_form: String,
    pub source_field: String,
    pub start: usize,
    pub end: usize,
    pub extractor_conf: f32,
}

impl Mention {
    /// Sort key matching the extractor contract: by field, then span, then
    /// label, then surface form — so two extractor runs over the same input
    /// always produce mentions in the same order.
    pub fn sort_key(&self) -> (&str, usize, usize, &str, &str) {
        (
            self.source_field.as_str(),
            self.start,
            self.end,
            self.label.as_str(),
            self.surface_form.as_str(),
        )
    }
}

pub fn sort_mentions(mentions: &mut [Mention]) {
    mentions.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}
