use crate::ontology::store::OntologyStore;
use crate::ontology::vector_index::{Embedder, VectorIndex};
use crate::retrieval::candidate::{Candidate, sort_candidates};
use crate::retrieval::error::RetrievalError;
use ordermap::OrderMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverConfig {
    pub top_k: usize,
    pub lexical_exact_score: f32,
    pub lexical_norm_score: f32,
    pub vector_min_score: f32,
    pub include_definitions: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        RetrieverConfig {
            top_k: 10,
            lexical_exact_score: 1.0,
            lexical_norm_score: 0.90,
            vector_min_score: 0.0,
            include_definitions: false,
        }
    }
}

/// Merges lexical-exact, lexical-normalized, and (optionally) vector
/// candidates into a single ranked top-K list.
///
/// Merge order matters: normalized hits are only added for concept ids not
/// already present at all (no score bump for exact vs. normalized
/// collisions); vector hits update the score to the max of the two when the
/// concept id is already present from either lexical stage.
pub struct CandidateRetriever<'a> {
    config: RetrieverConfig,
    vector_index: Option<(&'a VectorIndex, &'a dyn Embedder)>,
}

impl<'a> CandidateRetriever<'a> {
    pub fn new(config: RetrieverConfig) -> Self {
        CandidateRetriever {
            config,
            vector_index: None,
        }
    }

    pub fn with_vector_index(mut self, index: &'a VectorIndex, embedder: &'a dyn Embedder) -> Self {
        self.vector_index = Some((index, embedder));
        self
    }

    pub fn retrieve(
        &self,
        store: &OntologyStore,
        mention_text: &str,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let hits = store.lexical_lookup(mention_text);
        let mut merged: OrderMap<String, Candidate> = OrderMap::new();

        for concept_id in &hits.exact {
            merged.insert(
                concept_id.clone(),
                self.make_candidate(store, concept_id, self.config.lexical_exact_score, "lexical_exact"),
            );
        }

        for concept_id in &hits.normalized {
            if merged.contains_key(concept_id) {
                continue;
            }
            merged.insert(
                concept_id.clone(),
                self.make_candidate(store, concept_id, self.config.lexical_norm_score, "lexical_norm"),
            );
        }

        if let Some((index, embedder)) = self.vector_index {
            let query_k = self.config.top_k.max(10);
            let mut query_vector = embedder
                .embed(&[mention_text])
                .map_err(RetrievalError::Ontology)?
                .remove(0);
            l2_normalize(&mut query_vector);

            let vector_hits = index.search(&query_vector, query_k).map_err(RetrievalError::Ontology)?;
            for hit in vector_hits {
                if hit.score < self.config.vector_min_score {
                    continue;
                }
                match merged.get_mut(&hit.candidate_id) {
                    Some(existing) => {
                        if hit.score > existing.score {
                            existing.score = hit.score;
                        }
                    }
                    None => {
                        merged.insert(
                            hit.candidate_id.clone(),
                            self.make_candidate(store, &hit.candidate_id, hit.score, "vector"),
                        );
                    }
                }
            }
        }

        let mut candidates: Vec<Candidate> = merged.into_values().collect();
        sort_candidates(&mut candidates);
        candidates.truncate(self.config.top_k);
        Ok(candidates)
    }

    fn make_candidate(&self, store: &OntologyStore, concept_id: &str, score: f32, source: &str) -> Candidate {
        let concept = store.concept(concept_id);
        Candidate {
            candidate_id: concept_id.to_string(),
            candidate_label: concept.map(|c| c.label.clone()).unwrap_or_default(),
            score,
            source: Some(source.to_string()),
            definition: if self.config.include_definitions {
                concept.and_then(|c| c.definition.clone())
            } else {
                None
            },
        }
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::concept::Concept;

    fn store() -> OntologyStore {
        OntologyStore::build(
            "doid",
            b"toy",
            vec![
                Concept::new("DOID:1324", "Lung cancer").with_synonyms(vec!["lung carcinoma".into()]),
                Concept::new("DOID:1612", "Breast cancer"),
            ],
        )
    }

    #[test]
    fn exact_beats_normalized_when_both_present() {
        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let candidates = retriever.retrieve(&store, "Lung cancer").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source.as_deref(), Some("lexical_exact"));
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn normalized_only_hit_gets_lower_score() {
        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let candidates = retriever.retrieve(&store, "lung cancer").unwrap();
        assert_eq!(candidates[0].source.as_deref(), Some("lexical_norm"));
        assert_eq!(candidates[0].score, 0.90);
    }

    #[test]
    fn truncates_to_top_k() {
        let store = store();
        let mut config = RetrieverConfig::default();
        config.top_k = 1;
        let retriever = CandidateRetriever::new(config);
        let candidates = retriever.retrieve(&store, "cancer").unwrap();
        assert!(candidates.len() <= 1);
    }
}
