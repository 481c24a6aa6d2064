use crate::ontology::bundle::OntologyBundle;
use crate::ontology::concept::Concept;
use crate::ontology::store::OntologyStore;
use crate::raw::RawSample;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// A small, hand-built DOID-shaped store: enough concepts to exercise exact,
/// normalized, and vector retrieval without reading a real obographs file.
pub(crate) fn toy_doid_store() -> OntologyStore {
    OntologyStore::build(
        "doid",
        b"toy-doid-v1",
        vec![
            Concept::new("DOID:1324", "Lung cancer")
                .with_synonyms(vec!["lung carcinoma".to_string()])
                .with_definition("A respiratory system cancer.".to_string()),
            Concept::new("DOID:1612", "Breast cancer"),
            Concept::new("DOID:9970", "Obesity"),
        ],
    )
}

pub(crate) fn sample_raw_json(sample_id: &str, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut raw_fields = BTreeMap::new();
    for (key, value) in fields {
        raw_fields.insert(key.to_string(), value.to_string());
    }
    serde_json::to_vec(&serde_json::json!({
        "sample_id": sample_id,
        "raw_fields": raw_fields,
    }))
    .expect("fixture JSON always serializes")
}

/// A reusable bundle shared across tests that don't mutate it; building the
/// stores once avoids re-hashing the toy concept lists per test case.
pub(crate) static TOY_BUNDLE: Lazy<OntologyBundle> = Lazy::new(|| {
    let mut bundle = OntologyBundle::new();
    bundle.insert(toy_doid_store());
    bundle
});

pub(crate) fn toy_raw_sample() -> RawSample {
    RawSample::from_json(&sample_raw_json(
        "GSM1",
        &[
            ("title", "lung cancer study"),
            ("summary", "Tumor samples profiled against matched controls."),
        ],
    ))
    .expect("fixture JSON is well-formed")
}
