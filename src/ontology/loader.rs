//! Loads ontology source files into [`OntologyStore`]s via `ontolius`'s
//! obographs parser, the same parser the teacher's `CachedOntologyFactory`
//! uses for its own ontology objects.

use crate::ontology::concept::Concept;
use crate::ontology::error::OntologyError;
use crate::ontology::store::OntologyStore;
use ontolius::io::OntologyLoaderBuilder;
use ontolius::ontology::csr::FullCsrOntology;
use ontolius::ontology::OntologyTerms;
use ontolius::term::{MinimalTerm, Synonymous};
use std::io::Read;

/// Parses an obographs JSON byte stream into an [`OntologyStore`].
///
/// Individual malformed nodes are skipped rather than failing the whole
/// build; only a parser-level failure (the document itself is not valid
/// obographs JSON) is fatal. `use_synonyms` controls whether each concept's
/// synonyms are carried into the store's lexical index at all — when false,
/// only the primary label is indexed.
pub fn load_ontology_store(
    name: &str,
    mut source: impl Read,
    use_synonyms: bool,
) -> Result<OntologyStore, OntologyError> {
    let mut bytes = Vec::new();
    source
        .read_to_end(&mut bytes)
        .map_err(OntologyError::Io)?;

    let loader = OntologyLoaderBuilder::new().obographs_parser().build();
    let ontology: FullCsrOntology = loader
        .load_from_read(&bytes[..])
        .map_err(|err| OntologyError::LoadFailed {
            name: name.to_string(),
            source: anyhow::anyhow!(err.to_string()),
        })?;

    let concepts = ontology
        .iter_terms()
        .filter_map(|term| {
            let label = term.name();
            if label.is_empty() {
                return None;
            }
            let synonyms = if use_synonyms {
                term.synonyms().iter().map(|syn| syn.name.clone()).collect()
            } else {
                Vec::new()
            };
            Some(
                Concept::new(term.identifier().to_string(), label.to_string())
                    .with_synonyms(synonyms),
            )
        })
        .collect();

    Ok(OntologyStore::build(name, &bytes, concepts))
}
