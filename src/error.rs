use crate::export::error::ExportError;
use crate::linker::error::LinkerError;
use crate::ontology::error::OntologyError;
use crate::pipeline::error::PipelineError;
use config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("Could not find config file at '{0}'")]
    NoConfigFileFound(PathBuf),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    Ontology(#[from] OntologyError),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Linker(#[from] LinkerError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
