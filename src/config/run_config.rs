use crate::config::config_loader::ConfigLoader;
use crate::error::ConstructionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkerMode {
    LexicalOnly,
    LexicalPlusBi,
    LexicalPlusBiPlusCross,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerSection {
    pub mode: LinkerMode,
    #[serde(default = "default_top_k_retrieve")]
    pub top_k_retrieve: usize,
    #[serde(default = "default_top_k_rerank")]
    pub top_k_rerank: usize,
    #[serde(default = "default_context_window")]
    pub context_window_chars: usize,
    #[serde(default = "default_true")]
    pub include_negation: bool,
}

fn default_top_k_retrieve() -> usize {
    10
}
fn default_top_k_rerank() -> usize {
    10
}
fn default_context_window() -> usize {
    200
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicySection {
    #[serde(default = "default_tau")]
    pub tau: f32,
    #[serde(default = "default_delta")]
    pub delta: f32,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_tau() -> f32 {
    0.70
}
fn default_delta() -> f32 {
    0.10
}
fn default_top_n() -> usize {
    5
}

impl Default for PolicySection {
    fn default() -> Self {
        PolicySection {
            tau: default_tau(),
            delta: default_delta(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextViewSection {
    #[serde(default)]
    pub field_priority: Vec<String>,
    #[serde(default = "default_max_field_chars")]
    pub max_field_chars: usize,
}

fn default_max_field_chars() -> usize {
    4000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologySection {
    #[serde(default = "default_true")]
    pub use_synonyms: bool,
    #[serde(default)]
    pub use_definitions: bool,
    /// Ontology short name (e.g. "doid") to the obographs JSON file it is parsed from.
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for OntologySection {
    fn default() -> Self {
        OntologySection {
            use_synonyms: true,
            use_definitions: false,
            sources: BTreeMap::new(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractSection {
    #[serde(default)]
    pub labels: Vec<String>,
    /// Label to regular expression, consumed by the pattern-based extractor.
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsSection {
    #[serde(default)]
    pub embedder: Option<String>,
    #[serde(default)]
    pub reranker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySection {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub organism: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub max_gse: Option<usize>,
}

/// The full set of recognized configuration options (§6 of the design).
/// Deserialized through [`crate::config::config_loader::ConfigLoader`],
/// which multiplexes over yaml/yml/json/toml/ron and shell-expands `$VAR`
/// references before parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub run: RunSection,
    pub linker: LinkerSection,
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub textview: TextViewSection,
    #[serde(default)]
    pub ontology: OntologySection,
    #[serde(default)]
    pub extract: ExtractSection,
    #[serde(default)]
    pub models: ModelsSection,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub label_to_ontology: BTreeMap<String, String>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConstructionError> {
        if !path.exists() {
            return Err(ConstructionError::NoConfigFileFound(path.to_path_buf()));
        }
        Ok(ConfigLoader::load(path.to_path_buf())?)
    }
}

impl Default for TextViewSection {
    fn default() -> Self {
        TextViewSection {
            field_priority: Vec::new(),
            max_field_chars: default_max_field_chars(),
        }
    }
}

impl Default for ExtractSection {
    fn default() -> Self {
        ExtractSection {
            labels: Vec::new(),
            patterns: BTreeMap::new(),
        }
    }
}

impl Default for ModelsSection {
    fn default() -> Self {
        ModelsSection {
            embedder: None,
            reranker: None,
        }
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        QuerySection {
            terms: Vec::new(),
            organism: None,
            date_start: None,
            date_end: None,
            max_gse: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reports_missing_file_before_touching_the_config_crate() {
        let err = RunConfig::load(Path::new("/no/such/geo-linker-config.yaml"));
        assert!(matches!(err, Err(ConstructionError::NoConfigFileFound(_))));
    }
}
