use crate::linker::entity::LinkedEntity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GsmCleanedRecord {
    pub schema_version: String,
    pub study_id: String,
    pub sample_id: String,
    pub textview_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textview_fields: Option<Vec<(String, String)>>,
    pub entities: BTreeMap<String, Vec<LinkedEntity>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelYield {
    pub total: usize,
    pub resolved: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMentionCount {
    pub label: String,
    pub source_field: String,
    pub surface_form: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GseSummary {
    pub study_id: String,
    pub n_samples: usize,
    pub yields_by_label: BTreeMap<String, LabelYield>,
    pub top_ambiguous: Vec<TopMentionCount>,
    pub top_unresolved: Vec<TopMentionCount>,
}

/// Run-level wrapper written to `reports/gse_summary.json`, keyed by study id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GseSummaryReport {
    pub run_id: String,
    pub processed_gse_count: usize,
    pub processed_gsm_count: usize,
    pub by_gse: BTreeMap<String, GseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceVersions {
    pub model_ids: BTreeMap<String, String>,
    pub ontology_versions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub run_id: String,
    pub query_terms: Vec<String>,
    pub query_filters: BTreeMap<String, String>,
    pub manifest_path: String,
    pub corpus_gse_ids_path: String,
    pub n_selected: usize,
    pub n_processed: usize,
    pub selected_study_ids: Vec<String>,
    pub processed_study_ids: Vec<String>,
    pub aggregate_yields_by_label: BTreeMap<String, LabelYield>,
    pub global_top_ambiguous: Vec<TopMentionCount>,
    pub global_top_unresolved: Vec<TopMentionCount>,
    pub resources: ResourceVersions,
}
