use crate::hashing::sha256_hex_str;
use crate::ontology::error::OntologyError;
use crate::ontology::store::OntologyStore;
use std::collections::BTreeMap;

/// The set of ontology stores available to the linker for a single run,
/// keyed by ontology name (e.g. "doid", "uberon").
#[derive(Debug, Default)]
pub struct OntologyBundle {
    stores: BTreeMap<String, OntologyStore>,
}

impl OntologyBundle {
    pub fn new() -> Self {
        OntologyBundle::default()
    }

    pub fn insert(&mut self, store: OntologyStore) {
        self.stores.insert(store.name.clone(), store);
    }

    pub fn get(&self, ontology: &str) -> Result<&OntologyStore, OntologyError> {
        self.stores
            .get(ontology)
            .ok_or_else(|| OntologyError::UnknownOntology(ontology.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    /// SHA-256 over the sorted mapping of ontology name to version hash,
    /// recorded in the run manifest as a single provenance value for the
    /// whole bundle.
    pub fn bundle_version_id(&self) -> String {
        let joined: String = self
            .stores
            .iter()
            .map(|(name, store)| format!("{name}={}", store.version_hash))
            .collect::<Vec<_>>()
            .join(";");
        sha256_hex_str(&joined)
    }
}
