use crate::ontology::error::OntologyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Ontology(#[from] OntologyError),
}
