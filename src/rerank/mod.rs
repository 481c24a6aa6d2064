pub mod error;
pub mod reranker;

pub use reranker::{CrossEncoderModel, CrossEncoderReranker, DummyReranker, Reranker, RerankOutcome};
