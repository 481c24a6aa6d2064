use crate::export::error::ExportError;
use crate::linker::error::LinkerError;
use crate::ontology::error::OntologyError;
use crate::raw::RawError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("run root '{0}' already exists; a run id is never reused")]
    RunRootAlreadyExists(std::path::PathBuf),
    #[error("raw cache missing for study '{0}'")]
    RawCacheMissing(String),
    #[error("expected output file missing: '{0}'")]
    OutputMissing(std::path::PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Raw(#[from] RawError),
    #[error(transparent)]
    Ontology(#[from] OntologyError),
    #[error(transparent)]
    Linker(#[from] LinkerError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
