use serde::{Deserialize, Serialize};

/// A byte span inside a single named field. Offsets are always scoped to
/// the field they were found in, never to a cross-field concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOffsets {
    pub field_key: String,
    pub start: usize,
    pub end: usize,
}

impl FieldOffsets {
    pub fn new(field_key: impl Into<String>, start: usize, end: usize) -> Self {
        FieldOffsets {
            field_key: field_key.into(),
            start,
            end,
        }
    }
}
