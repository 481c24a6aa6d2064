use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("cross-encoder model '{0}' failed to load")]
    ModelLoadFailed(String),
}
