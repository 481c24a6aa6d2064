//! Persistent per-(ontology, embedding-model) nearest-neighbor cache.
//!
//! Four artifacts live under `cache/vector_indexes/<ontology>/<version_hash>/<model_id>/`:
//! `meta.json`, `concept_ids.json`, `embeddings.npy`, and `faiss.index` (the
//! native on-disk index, here a `redb` table of concept id to normalized
//! embedding bytes scored by brute-force inner product at query time — exact
//! cosine ranking is what the reproducibility requirements call for, not
//! approximate search).

use crate::ontology::error::OntologyError;
use crate::ontology::npy;
use crate::ontology::store::OntologyStore;
use crate::retrieval::candidate::Candidate;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const VECTORS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("vectors");

pub trait Embedder {
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, OntologyError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct IndexMeta {
    ontology_name: String,
    version_hash: String,
    model_id: String,
    dim: usize,
    count: usize,
}

#[derive(Debug)]
pub struct VectorIndex {
    concept_ids: Vec<String>,
    db_path: PathBuf,
}

impl VectorIndex {
    /// Ranks every indexed concept by cosine similarity to `query_vector`
    /// (assumed already unit-normalized), returning the top `top_k` in
    /// `(-score, concept_id)` order.
    pub fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Candidate>, OntologyError> {
        let db = Database::open(&self.db_path).map_err(|err| index_corrupt(&err.to_string()))?;
        let read_txn = db.begin_read().map_err(|err| index_corrupt(&err.to_string()))?;
        let table = read_txn
            .open_table(VECTORS_TABLE)
            .map_err(|err| index_corrupt(&err.to_string()))?;

        let mut scored: Vec<(f32, String)> = Vec::with_capacity(self.concept_ids.len());
        for concept_id in &self.concept_ids {
            let Some(bytes) = table
                .get(concept_id.as_str())
                .map_err(|err| index_corrupt(&err.to_string()))?
            else {
                continue;
            };
            let vector = bytes_to_vec(bytes.value());
            let score = dot(&vector, query_vector);
            scored.push((score, concept_id.clone()));
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, concept_id)| Candidate {
                candidate_id: concept_id.clone(),
                candidate_label: concept_id,
                score,
                source: Some("vector".to_string()),
                definition: None,
            })
            .collect())
    }
}

/// Reuses the cache at `cache_dir` if it already matches `store`'s version
/// hash and `embedder`'s model id; otherwise (re)builds it. Returns the
/// index along with whether an existing cache was reused.
pub fn get_or_build_vector_index(
    cache_dir: &Path,
    store: &OntologyStore,
    embedder: &dyn Embedder,
) -> Result<(VectorIndex, bool), OntologyError> {
    let index_dir = cache_dir
        .join("vector_indexes")
        .join(&store.name)
        .join(&store.version_hash)
        .join(sanitize_model_id(embedder.model_id()));

    if let Some(index) = try_reuse(&index_dir, store, embedder)? {
        return Ok((index, true));
    }

    build_vector_index(&index_dir, store, embedder)?;
    let index = try_reuse(&index_dir, store, embedder)?
        .expect("just built the cache at this path");
    Ok((index, false))
}

fn try_reuse(
    index_dir: &Path,
    store: &OntologyStore,
    embedder: &dyn Embedder,
) -> Result<Option<VectorIndex>, OntologyError> {
    let meta_path = index_dir.join("meta.json");
    let ids_path = index_dir.join("concept_ids.json");
    let db_path = index_dir.join("faiss.index");
    let npy_path = index_dir.join("embeddings.npy");

    if !(meta_path.exists() && ids_path.exists() && db_path.exists() && npy_path.exists()) {
        return Ok(None);
    }

    let meta: IndexMeta = serde_json::from_slice(&fs::read(&meta_path)?)?;
    if meta.version_hash != store.version_hash || meta.model_id != embedder.model_id() {
        return Ok(None);
    }

    let concept_ids: Vec<String> = serde_json::from_slice(&fs::read(&ids_path)?)?;
    Ok(Some(VectorIndex {
        concept_ids,
        db_path,
    }))
}

fn build_vector_index(
    index_dir: &Path,
    store: &OntologyStore,
    embedder: &dyn Embedder,
) -> Result<(), OntologyError> {
    let concept_ids = store.sorted_concept_ids();
    let labels: Vec<&str> = concept_ids
        .iter()
        .map(|id| store.concept(id).expect("id came from this store").label.as_str())
        .collect();

    let mut embeddings = embedder.embed(&labels)?;
    for row in embeddings.iter_mut() {
        normalize_l2(row);
    }

    let tmp_dir = index_dir.with_extension("tmp-build");
    if tmp_dir.exists() {
        fs::remove_dir_all(&tmp_dir)?;
    }
    fs::create_dir_all(&tmp_dir)?;

    let meta = IndexMeta {
        ontology_name: store.name.clone(),
        version_hash: store.version_hash.clone(),
        model_id: embedder.model_id().to_string(),
        dim: embedder.dim(),
        count: concept_ids.len(),
    };
    fs::write(tmp_dir.join("meta.json"), serde_json::to_vec_pretty(&meta)?)?;
    fs::write(
        tmp_dir.join("concept_ids.json"),
        serde_json::to_vec_pretty(&concept_ids)?,
    )?;

    let npy_file = fs::File::create(tmp_dir.join("embeddings.npy"))?;
    npy::write_f32_matrix(BufWriter::new(npy_file), &embeddings, embedder.dim())?;

    {
        let db = Database::create(tmp_dir.join("faiss.index"))
            .map_err(|err| index_corrupt(&err.to_string()))?;
        let write_txn = db.begin_write().map_err(|err| index_corrupt(&err.to_string()))?;
        {
            let mut table = write_txn
                .open_table(VECTORS_TABLE)
                .map_err(|err| index_corrupt(&err.to_string()))?;
            for (concept_id, vector) in concept_ids.iter().zip(embeddings.iter()) {
                table
                    .insert(concept_id.as_str(), vec_to_bytes(vector).as_slice())
                    .map_err(|err| index_corrupt(&err.to_string()))?;
            }
        }
        write_txn.commit().map_err(|err| index_corrupt(&err.to_string()))?;
    }

    if index_dir.exists() {
        fs::remove_dir_all(index_dir)?;
    }
    if let Some(parent) = index_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&tmp_dir, index_dir)?;
    Ok(())
}

fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn vec_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn bytes_to_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn sanitize_model_id(model_id: &str) -> String {
    crate::text::normalize(model_id).replace(' ', "_")
}

fn index_corrupt(reason: &str) -> OntologyError {
    OntologyError::VectorIndexCorrupt {
        ontology: "<index>".to_string(),
        model_id: "<index>".to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::concept::Concept;
    use tempfile::TempDir;

    struct StubEmbedder {
        dim: usize,
    }

    impl Embedder for StubEmbedder {
        fn model_id(&self) -> &str {
            "stub-embedder-v1"
        }

        fn dim(&self) -> usize {
            self.dim
        }

        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, OntologyError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let seed = t.bytes().map(|b| b as f32).sum::<f32>();
                    (0..self.dim).map(|i| seed + i as f32).collect()
                })
                .collect())
        }
    }

    fn store() -> OntologyStore {
        OntologyStore::build(
            "doid",
            b"toy",
            vec![
                Concept::new("DOID:1324", "Lung cancer"),
                Concept::new("DOID:1612", "Breast cancer"),
            ],
        )
    }

    #[test]
    fn builds_then_reuses_on_second_call() {
        let tmp = TempDir::new().unwrap();
        let embedder = StubEmbedder { dim: 4 };
        let store = store();

        let (_first, reused_first) =
            get_or_build_vector_index(tmp.path(), &store, &embedder).unwrap();
        assert!(!reused_first);

        let (_second, reused_second) =
            get_or_build_vector_index(tmp.path(), &store, &embedder).unwrap();
        assert!(reused_second);
    }

    #[test]
    fn search_returns_ranked_candidates() {
        let tmp = TempDir::new().unwrap();
        let embedder = StubEmbedder { dim: 4 };
        let store = store();
        let (index, _) = get_or_build_vector_index(tmp.path(), &store, &embedder).unwrap();

        let mut query = embedder.embed(&["Lung cancer"]).unwrap().remove(0);
        normalize_l2(&mut query);

        let results = index.search(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].candidate_id, "DOID:1324");
    }
}
