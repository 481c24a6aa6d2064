use thiserror::Error;

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not load ontology '{name}': {source}")]
    LoadFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("no ontology store registered for name '{0}'")]
    UnknownOntology(String),
    #[error("vector backend unavailable for ontology '{ontology}' model '{model_id}'")]
    VectorBackendUnavailable { ontology: String, model_id: String },
    #[error("vector index for ontology '{ontology}' model '{model_id}' is corrupt: {reason}")]
    VectorIndexCorrupt {
        ontology: String,
        model_id: String,
        reason: String,
    },
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
