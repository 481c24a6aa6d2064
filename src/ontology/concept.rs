use serde::{Deserialize, Serialize};

/// A single ontology term available as a link target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub concept_id: String,
    pub label: String,
    pub synonyms: Vec<String>,
    pub definition: Option<String>,
}

impl Concept {
    pub fn new(concept_id: impl Into<String>, label: impl Into<String>) -> Self {
        Concept {
            concept_id: concept_id.into(),
            label: label.into(),
            synonyms: Vec::new(),
            definition: None,
        }
    }

    pub fn with_synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// All lexical surface strings this concept should be indexed under:
    /// the label followed by its synonyms, in that order.
    pub fn lexical_terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.label.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}
