use crate::extract::error::ExtractError;
use crate::extract::mention::Mention;
use crate::extract::model::{NerModel, RawPrediction};
use crate::extract::{Extractor, RawFields};
use crate::ontology::error::OntologyError;
use crate::ontology::vector_index::Embedder;
use crate::rerank::error::RerankError;
use crate::rerank::reranker::{CrossEncoderModel, Reranker, RerankOutcome};
use crate::retrieval::candidate::Candidate;
use mockall::mock;

mock! {
    pub(crate) NerModel {}

    impl NerModel for NerModel {
        fn predict(&self, field_key: &str, text: &str) -> Vec<RawPrediction>;
    }
}

mock! {
    pub(crate) Extractor {}

    impl Extractor for Extractor {
        fn extract(&self, raw_fields: &RawFields) -> Result<Vec<Mention>, ExtractError>;
    }
}

mock! {
    pub(crate) Reranker {}

    impl Reranker for Reranker {
        fn rerank(
            &self,
            mention_text: &str,
            context: &str,
            candidates: Vec<Candidate>,
        ) -> Result<RerankOutcome, RerankError>;
    }
}

mock! {
    pub(crate) Embedder {}

    impl Embedder for Embedder {
        fn model_id(&self) -> &str;
        fn dim(&self) -> usize;
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, OntologyError>;
    }
}

mock! {
    pub(crate) CrossEncoderModel {}

    impl CrossEncoderModel for CrossEncoderModel {
        fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>, RerankError>;
    }
}
