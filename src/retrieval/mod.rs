pub mod candidate;
pub mod error;
pub mod retriever;

pub use candidate::Candidate;
pub use retriever::{CandidateRetriever, RetrieverConfig};
