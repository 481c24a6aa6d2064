use crate::export::stable_json::stable_dumps;
use crate::hashing::sha256_hex_str;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub created_at_utc: String,
    pub query_terms: Vec<String>,
    pub query_filters: BTreeMap<String, String>,
    pub retrieval_timestamp_utc: String,
    pub code_version: String,
    pub model_ids: BTreeMap<String, String>,
    pub ontology_versions: BTreeMap<String, String>,
    pub device: String,
    pub config_hash: String,
    pub config_path: String,
    pub corpus_gse_ids_path: String,
    pub corpus_gse_count: usize,
}

/// SHA-256 of the canonical JSON of the configuration (sorted keys, compact
/// separators, ASCII-escaped) — identical config content always hashes the
/// same regardless of key order in the source file.
pub fn config_hash<T: Serialize>(config: &T) -> Result<String, crate::export::error::ExportError> {
    Ok(sha256_hex_str(&stable_dumps(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_hash_ignores_key_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(config_hash(&a).unwrap(), config_hash(&b).unwrap());
    }
}
