pub mod driver;
pub mod error;
pub mod layout;
pub mod manifest;

pub use driver::{Pipeline, PipelineStats, default_label_to_ontology};
pub use layout::RunLayout;
pub use manifest::RunManifest;
