use crate::retrieval::error::RetrievalError;
use crate::rerank::error::RerankError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Rerank(#[from] RerankError),
    #[error("mention '{surface_form}' offsets ({start}, {end}) do not match field '{field}'")]
    OffsetInvariantViolated {
        surface_form: String,
        field: String,
        start: usize,
        end: usize,
    },
}
