pub mod error;
pub mod mention;
pub mod model;
pub mod offsets;
pub mod pattern;

use crate::extract::error::ExtractError;
use crate::extract::mention::Mention;
use std::collections::BTreeMap;

pub type RawFields = BTreeMap<String, String>;

/// Produces mentions from a sample's raw fields. Implemented by
/// [`pattern::PatternExtractor`] and [`model::ModelExtractor`].
pub trait Extractor {
    fn extract(&self, raw_fields: &RawFields) -> Result<Vec<Mention>, ExtractError>;
}

pub use offsets::FieldOffsets;
