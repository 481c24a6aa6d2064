use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("field '{field}' not found on sample '{sample_id}'")]
    UnknownField { sample_id: String, field: String },
    #[error("model extractor '{0}' failed to load")]
    ModelLoadFailed(String),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}
