use crate::extract::offsets::FieldOffsets;
use crate::policy::LinkStatus;
use crate::retrieval::candidate::Candidate;
use serde::{Deserialize, Serialize};

/// A mention's decided mapping (or explicit non-mapping) to an ontology
/// concept, with the provenance needed to trace it back to source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub label: String,
    pub surface_form: String,
    pub source_field: String,
    pub offsets: FieldOffsets,
    pub status: LinkStatus,
    pub linked_id: Option<String>,
    pub score: Option<f32>,
    pub margin: Option<f32>,
    pub top_candidates: Vec<Candidate>,
    pub provenances: Vec<FieldOffsets>,
}
