use crate::retrieval::candidate::{Candidate, sort_candidates};
use crate::rerank::error::RerankError;

/// Output of a rerank pass: the winning candidate (if any), its score, the
/// margin to the runner-up, and the reordered top list.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub best: Option<Candidate>,
    pub best_score: f32,
    pub margin: f32,
    pub top: Vec<Candidate>,
}

impl RerankOutcome {
    fn empty() -> Self {
        RerankOutcome {
            best: None,
            best_score: 0.0,
            margin: 0.0,
            top: Vec::new(),
        }
    }
}

pub trait Reranker {
    fn rerank(
        &self,
        mention_text: &str,
        context: &str,
        candidates: Vec<Candidate>,
    ) -> Result<RerankOutcome, RerankError>;
}

fn margin_of(top: &[Candidate]) -> f32 {
    if top.len() >= 2 {
        top[0].score - top[1].score
    } else {
        1.0
    }
}

fn left_hand_text(mention_text: &str, context: &str) -> String {
    format!("{}\n\nCONTEXT:\n{}", mention_text, context).trim().to_string()
}

fn right_hand_text(candidate: &Candidate) -> String {
    match &candidate.definition {
        Some(def) if !def.is_empty() => format!("{}\n\nDEF:\n{}", candidate.candidate_label, def),
        _ => candidate.candidate_label.clone(),
    }
}

/// Abstraction over a cross-encoder scoring backend: given (left, right)
/// text pairs, returns one score per pair in the same order.
pub trait CrossEncoderModel {
    fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>, RerankError>;
}

pub struct CrossEncoderReranker<M: CrossEncoderModel> {
    model: M,
}

impl<M: CrossEncoderModel> CrossEncoderReranker<M> {
    pub fn new(model: M) -> Self {
        CrossEncoderReranker { model }
    }
}

impl<M: CrossEncoderModel> Reranker for CrossEncoderReranker<M> {
    fn rerank(
        &self,
        mention_text: &str,
        context: &str,
        candidates: Vec<Candidate>,
    ) -> Result<RerankOutcome, RerankError> {
        if candidates.is_empty() {
            return Ok(RerankOutcome::empty());
        }

        let left = left_hand_text(mention_text, context);
        let pairs: Vec<(String, String)> = candidates
            .iter()
            .map(|c| (left.clone(), right_hand_text(c)))
            .collect();
        let scores = self.model.score_pairs(&pairs)?;

        let mut rescored: Vec<Candidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(mut c, score)| {
                c.score = score;
                c.source = Some("rerank".to_string());
                c
            })
            .collect();
        sort_candidates(&mut rescored);

        let margin = margin_of(&rescored);
        let best_score = rescored[0].score;
        let best = rescored.first().cloned();

        Ok(RerankOutcome {
            best,
            best_score,
            margin,
            top: rescored,
        })
    }
}

/// Deterministic fallback reranker: reuses the incoming retrieval scores
/// (treating a missing score as 0.5) rather than calling a model, and only
/// fills in a `"rerank"` source for candidates that did not already carry
/// one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyReranker;

impl Reranker for DummyReranker {
    fn rerank(
        &self,
        _mention_text: &str,
        _context: &str,
        candidates: Vec<Candidate>,
    ) -> Result<RerankOutcome, RerankError> {
        if candidates.is_empty() {
            return Ok(RerankOutcome::empty());
        }

        let mut rescored: Vec<Candidate> = candidates
            .into_iter()
            .map(|mut c| {
                if c.source.is_none() {
                    c.source = Some("rerank".to_string());
                }
                c
            })
            .collect();
        sort_candidates(&mut rescored);

        let margin = margin_of(&rescored);
        let best_score = rescored[0].score;
        let best = rescored.first().cloned();

        Ok(RerankOutcome {
            best,
            best_score,
            margin,
            top: rescored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f32) -> Candidate {
        Candidate {
            candidate_id: id.to_string(),
            candidate_label: id.to_string(),
            score,
            source: None,
            definition: None,
        }
    }

    #[test]
    fn dummy_reranker_reuses_scores_and_computes_margin() {
        let outcome = DummyReranker
            .rerank("lung cancer", "context", vec![candidate("A", 0.8), candidate("B", 0.6)])
            .unwrap();
        assert_eq!(outcome.best.unwrap().candidate_id, "A");
        assert!((outcome.margin - 0.2).abs() < 1e-6);
    }

    #[test]
    fn margin_is_one_with_single_candidate() {
        let outcome = DummyReranker.rerank("x", "ctx", vec![candidate("A", 0.8)]).unwrap();
        assert_eq!(outcome.margin, 1.0);
    }

    #[test]
    fn empty_candidates_yield_empty_outcome() {
        let outcome = DummyReranker.rerank("x", "ctx", vec![]).unwrap();
        assert!(outcome.best.is_none());
        assert_eq!(outcome.best_score, 0.0);
    }

    struct StubCrossEncoder;
    impl CrossEncoderModel for StubCrossEncoder {
        fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>, RerankError> {
            Ok(pairs.iter().map(|(l, r)| (l.len() + r.len()) as f32).collect())
        }
    }

    #[test]
    fn cross_encoder_reranker_always_tags_rerank_source() {
        let reranker = CrossEncoderReranker::new(StubCrossEncoder);
        let outcome = reranker
            .rerank("lung cancer", "ctx", vec![candidate("A", 0.1)])
            .unwrap();
        assert_eq!(outcome.top[0].source.as_deref(), Some("rerank"));
    }
}
