use crate::hashing::sha256_hex;
use crate::ontology::concept::Concept;
use crate::text::normalize;
use ordermap::OrderMap;

/// Parsed concepts from a single ontology file, plus exact and normalized
/// lexical indexes built from each concept's label and synonyms.
///
/// `lexical_exact`/`lexical_norm` map a surface string to the ordered,
/// deduplicated list of concept ids that produced it — insertion order is
/// preserved so that ties are broken deterministically downstream.
#[derive(Debug, Clone)]
pub struct OntologyStore {
    pub name: String,
    pub version_hash: String,
    concepts: OrderMap<String, Concept>,
    lexical_exact: OrderMap<String, Vec<String>>,
    lexical_norm: OrderMap<String, Vec<String>>,
}

/// Result of a lexical lookup: the concept ids that matched the surface
/// string verbatim, and separately the ones that matched after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalHits {
    pub exact: Vec<String>,
    pub normalized: Vec<String>,
}

impl OntologyStore {
    pub fn build(name: impl Into<String>, source_bytes: &[u8], concepts: Vec<Concept>) -> Self {
        let version_hash = sha256_hex(source_bytes);
        let mut store = OntologyStore {
            name: name.into(),
            version_hash,
            concepts: OrderMap::new(),
            lexical_exact: OrderMap::new(),
            lexical_norm: OrderMap::new(),
        };
        for concept in concepts {
            store.add_concept(concept);
        }
        store
    }

    pub fn version_id(&self) -> String {
        format!("{}:{}", self.name, &self.version_hash[..12.min(self.version_hash.len())])
    }

    fn add_concept(&mut self, concept: Concept) {
        if concept.label.is_empty() {
            return;
        }
        for term in concept.lexical_terms() {
            insert_dedup(&mut self.lexical_exact, term.to_string(), &concept.concept_id);
            insert_dedup(
                &mut self.lexical_norm,
                normalize(term),
                &concept.concept_id,
            );
        }
        self.concepts.insert(concept.concept_id.clone(), concept);
    }

    pub fn concept(&self, concept_id: &str) -> Option<&Concept> {
        self.concepts.get(concept_id)
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concept ids in sorted order, the order used to build the persistent
    /// vector index so that row `i` of `embeddings.npy` always corresponds
    /// to the same concept id for a given ontology version.
    pub fn sorted_concept_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.concepts.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn lexical_lookup(&self, surface_form: &str) -> LexicalHits {
        let exact = self
            .lexical_exact
            .get(surface_form)
            .cloned()
            .unwrap_or_default();
        let normalized = self
            .lexical_norm
            .get(&normalize(surface_form))
            .cloned()
            .unwrap_or_default();
        LexicalHits { exact, normalized }
    }
}

fn insert_dedup(map: &mut OrderMap<String, Vec<String>>, key: String, concept_id: &str) {
    let entry = map.entry(key).or_default();
    if !entry.iter().any(|id| id == concept_id) {
        entry.push(concept_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_store() -> OntologyStore {
        let concepts = vec![
            Concept::new("DOID:1324", "Lung cancer").with_synonyms(vec!["lung carcinoma".into()]),
            Concept::new("DOID:1612", "Breast cancer"),
        ];
        OntologyStore::build("doid", b"toy ontology bytes", concepts)
    }

    #[test]
    fn exact_and_normalized_hits_differ_by_case() {
        let store = toy_store();
        let hits = store.lexical_lookup("Lung cancer");
        assert_eq!(hits.exact, vec!["DOID:1324".to_string()]);

        let hits_lower = store.lexical_lookup("lung cancer");
        assert!(hits_lower.exact.is_empty());
        assert_eq!(hits_lower.normalized, vec!["DOID:1324".to_string()]);
    }

    #[test]
    fn synonym_is_indexed_too() {
        let store = toy_store();
        let hits = store.lexical_lookup("lung carcinoma");
        assert_eq!(hits.exact, vec!["DOID:1324".to_string()]);
    }

    #[test]
    fn version_hash_is_content_derived() {
        let a = OntologyStore::build("doid", b"abc", vec![]);
        let b = OntologyStore::build("doid", b"abc", vec![]);
        let c = OntologyStore::build("doid", b"xyz", vec![]);
        assert_eq!(a.version_hash, b.version_hash);
        assert_ne!(a.version_hash, c.version_hash);
    }

    #[test]
    fn sorted_concept_ids_are_sorted() {
        let store = toy_store();
        assert_eq!(
            store.sorted_concept_ids(),
            vec!["DOID:1324".to_string(), "DOID:1612".to_string()]
        );
    }
}
