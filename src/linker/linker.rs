use crate::extract::RawFields;
use crate::extract::mention::Mention;
use crate::extract::offsets::FieldOffsets;
use crate::linker::dedup::dedup_entities;
use crate::linker::entity::LinkedEntity;
use crate::linker::error::LinkerError;
use crate::negation::NegationDetector;
use crate::ontology::store::OntologyStore;
use crate::policy::{LinkStatus, StatusPolicy};
use crate::retrieval::candidate::sort_candidates;
use crate::retrieval::retriever::CandidateRetriever;
use crate::rerank::reranker::Reranker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkerConfig {
    pub context_window_chars: usize,
    pub include_negation: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        LinkerConfig {
            context_window_chars: 200,
            include_negation: true,
        }
    }
}

pub struct Linker<'a> {
    pub config: LinkerConfig,
    pub policy: StatusPolicy,
    pub negation: NegationDetector,
    pub retriever: &'a CandidateRetriever<'a>,
    pub reranker: &'a dyn Reranker,
}

impl<'a> Linker<'a> {
    /// Links every mention against `store`, then deduplicates the resulting
    /// entities for this (sample, label, ontology) group.
    pub fn link(
        &self,
        raw_fields: &RawFields,
        mentions: &[Mention],
        store: &OntologyStore,
    ) -> Result<Vec<LinkedEntity>, LinkerError> {
        let mut entities = Vec::with_capacity(mentions.len());
        for mention in mentions {
            entities.push(self.link_one(raw_fields, mention, store)?);
        }
        Ok(dedup_entities(entities))
    }

    fn link_one(
        &self,
        raw_fields: &RawFields,
        mention: &Mention,
        store: &OntologyStore,
    ) -> Result<LinkedEntity, LinkerError> {
        let offsets = FieldOffsets::new(mention.source_field.clone(), mention.start, mention.end);
        self.check_offset_invariant(raw_fields, mention)?;

        if self.config.include_negation && self.negation.is_negated(raw_fields, mention) {
            return Ok(LinkedEntity {
                label: mention.label.clone(),
                surface_form: mention.surface_form.clone(),
                source_field: mention.source_field.clone(),
                offsets: offsets.clone(),
                status: LinkStatus::Rejected,
                linked_id: None,
                score: None,
                margin: None,
                top_candidates: Vec::new(),
                provenances: vec![offsets],
            });
        }

        let candidates = self.retriever.retrieve(store, &mention.surface_form)?;
        if candidates.is_empty() {
            return Ok(LinkedEntity {
                label: mention.label.clone(),
                surface_form: mention.surface_form.clone(),
                source_field: mention.source_field.clone(),
                offsets: offsets.clone(),
                status: LinkStatus::Unresolved,
                linked_id: None,
                score: None,
                margin: None,
                top_candidates: Vec::new(),
                provenances: vec![offsets],
            });
        }

        let context = local_context(raw_fields, mention, self.config.context_window_chars);
        let outcome = self
            .reranker
            .rerank(&mention.surface_form, &context, candidates)?;

        let status = self.policy.decide(outcome.best_score, outcome.margin);
        let retain = self.policy.retain_count(status);
        let mut top_candidates = outcome.top;
        top_candidates.truncate(retain);
        sort_candidates(&mut top_candidates);

        let linked_id = if status == LinkStatus::Resolved {
            outcome.best.map(|c| c.candidate_id)
        } else {
            None
        };

        Ok(LinkedEntity {
            label: mention.label.clone(),
            surface_form: mention.surface_form.clone(),
            source_field: mention.source_field.clone(),
            offsets: offsets.clone(),
            status,
            linked_id,
            score: Some(outcome.best_score),
            margin: Some(outcome.margin),
            top_candidates,
            provenances: vec![offsets],
        })
    }

    fn check_offset_invariant(&self, raw_fields: &RawFields, mention: &Mention) -> Result<(), LinkerError> {
        let matches = raw_fields
            .get(&mention.source_field)
            .and_then(|text| text.get(mention.start..mention.end))
            .map(|slice| slice == mention.surface_form)
            .unwrap_or(false);

        if matches {
            Ok(())
        } else {
            Err(LinkerError::OffsetInvariantViolated {
                surface_form: mention.surface_form.clone(),
                field: mention.source_field.clone(),
                start: mention.start,
                end: mention.end,
            })
        }
    }
}

fn local_context(raw_fields: &RawFields, mention: &Mention, window: usize) -> String {
    let Some(field_text) = raw_fields.get(&mention.source_field) else {
        return String::new();
    };
    let len = field_text.len();
    let start = mention.start.saturating_sub(window).min(len);
    let end = (mention.end + window).min(len);
    field_text.get(start..end).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::concept::Concept;
    use crate::rerank::reranker::DummyReranker;
    use crate::retrieval::retriever::RetrieverConfig;
    use std::collections::BTreeMap;

    fn store() -> OntologyStore {
        OntologyStore::build("doid", b"toy", vec![Concept::new("DOID:1324", "Lung cancer")])
    }

    fn mention(field: &str, start: usize, end: usize, surface_form: &str) -> Mention {
        Mention {
            label: "disease".to_string(),
            surface_form: surface_form.to_string(),
            source_field: field.to_string(),
            start,
            end,
            extractor_conf: 1.0,
        }
    }

    #[test]
    fn resolves_an_exact_lexical_match() {
        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let reranker = DummyReranker;
        let linker = Linker {
            config: LinkerConfig::default(),
            policy: StatusPolicy::default(),
            negation: NegationDetector::default(),
            retriever: &retriever,
            reranker: &reranker,
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "We profiled Lung cancer samples.".to_string(),
        );
        let m = mention("summary", 12, 23, "Lung cancer");

        let entities = linker.link(&fields, &[m], &store).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].status, LinkStatus::Resolved);
        assert_eq!(entities[0].linked_id.as_deref(), Some("DOID:1324"));
    }

    #[test]
    fn rejects_on_negation() {
        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let reranker = DummyReranker;
        let linker = Linker {
            config: LinkerConfig::default(),
            policy: StatusPolicy::default(),
            negation: NegationDetector::new(20),
            retriever: &retriever,
            reranker: &reranker,
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "No Lung cancer was detected.".to_string(),
        );
        let m = mention("summary", 3, 14, "Lung cancer");

        let entities = linker.link(&fields, &[m], &store).unwrap();
        assert_eq!(entities[0].status, LinkStatus::Rejected);
    }

    #[test]
    fn unresolved_when_no_candidates() {
        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let reranker = DummyReranker;
        let linker = Linker {
            config: LinkerConfig::default(),
            policy: StatusPolicy::default(),
            negation: NegationDetector::default(),
            retriever: &retriever,
            reranker: &reranker,
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "unknown disease is studied".to_string(),
        );
        let m = mention("summary", 0, 15, "unknown disease");

        let entities = linker.link(&fields, &[m], &store).unwrap();
        assert_eq!(entities[0].status, LinkStatus::Unresolved);
    }

    #[test]
    fn ambiguous_when_reranker_returns_a_narrow_margin() {
        use crate::rerank::reranker::RerankOutcome;
        use crate::test_suite::mocks::MockReranker;

        let store = store();
        let retriever = CandidateRetriever::new(RetrieverConfig::default());
        let mut reranker = MockReranker::new();
        reranker.expect_rerank().returning(|_, _, candidates| {
            Ok(RerankOutcome {
                best: candidates.first().cloned(),
                best_score: 0.80,
                margin: 0.02,
                top: candidates,
            })
        });
        let linker = Linker {
            config: LinkerConfig::default(),
            policy: StatusPolicy::default(),
            negation: NegationDetector::default(),
            retriever: &retriever,
            reranker: &reranker,
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "summary".to_string(),
            "We profiled Lung cancer samples.".to_string(),
        );
        let m = mention("summary", 12, 23, "Lung cancer");

        let entities = linker.link(&fields, &[m], &store).unwrap();
        assert_eq!(entities[0].status, LinkStatus::Ambiguous);
        assert!(entities[0].linked_id.is_none());
    }
}
