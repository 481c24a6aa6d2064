use serde::{Deserialize, Serialize};

/// A proposed link target for a mention, attributed to the retrieval stage
/// or the reranker that produced/refreshed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub candidate_label: String,
    pub score: f32,
    pub source: Option<String>,
    pub definition: Option<String>,
}

/// Orders by descending score, then ascending candidate id — the tie-break
/// used throughout retrieval, reranking, and export.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}
