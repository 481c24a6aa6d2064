use crate::export::exporter::{
    compute_corpus_report, compute_gse_summary, group_entities_by_label, write_canonical_json,
    write_gsm_jsonl, write_pretty_json,
};
use crate::export::records::{GseSummary, GseSummaryReport, GsmCleanedRecord, ResourceVersions};
use crate::export::textview::{TextViewConfig, build_textview};
use crate::extract::Extractor;
use crate::extract::mention::Mention;
use crate::linker::linker::{Linker, LinkerConfig};
use crate::negation::NegationDetector;
use crate::ontology::bundle::OntologyBundle;
use crate::pipeline::error::PipelineError;
use crate::pipeline::layout::RunLayout;
use crate::pipeline::manifest::RunManifest;
use crate::policy::StatusPolicy;
use crate::raw::RawSample;
use crate::retrieval::retriever::CandidateRetriever;
use crate::rerank::reranker::Reranker;
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The label keys this crate ships a default ontology mapping for.
pub fn default_label_to_ontology() -> BTreeMap<String, String> {
    [
        ("disease", "doid"),
        ("tissue", "uberon"),
        ("organism", "ncbitaxon"),
        ("cell_type", "cl"),
        ("cell_line", "cellosaurus"),
        ("drug", "chebi"),
        ("assay", "efo"),
        ("platform", "efo"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineStats {
    pub n_studies: usize,
    pub n_samples: usize,
    pub n_entities: usize,
}

pub struct Pipeline<'a> {
    pub layout: RunLayout,
    pub bundle: OntologyBundle,
    pub label_to_ontology: BTreeMap<String, String>,
    pub extractor: &'a dyn Extractor,
    pub retriever: &'a CandidateRetriever<'a>,
    pub reranker: &'a dyn Reranker,
    pub policy: StatusPolicy,
    pub negation: NegationDetector,
    pub linker_config: LinkerConfig,
    pub textview_config: TextViewConfig,
    pub top_n_report: usize,
}

impl<'a> Pipeline<'a> {
    /// Runs every study, in ascending study-id order, writing per-sample
    /// records, the per-study summary, and the corpus report at the end.
    ///
    /// `run_id`, `query_terms`, and `query_filters` identify the run and are
    /// carried verbatim into the wrapped `gse_summary.json` and
    /// `corpus_report.json` artifacts.
    pub fn run(
        &self,
        study_ids: &[String],
        run_id: &str,
        query_terms: &[String],
        query_filters: &BTreeMap<String, String>,
    ) -> Result<PipelineStats, PipelineError> {
        let mut sorted_studies = study_ids.to_vec();
        sorted_studies.sort();

        let mut all_records: Vec<GsmCleanedRecord> = Vec::new();
        let mut summaries: Vec<GseSummary> = Vec::new();
        let mut by_gse: BTreeMap<String, GseSummary> = BTreeMap::new();
        let mut stats = PipelineStats::default();

        for study_id in &sorted_studies {
            info!("Starting study {study_id}");
            let samples = load_samples_for_study(&self.layout.raw_dir, study_id)?;
            let mut study_records = Vec::with_capacity(samples.len());

            for sample in &samples {
                let record = self.process_sample(study_id, sample)?;
                stats.n_entities += record.entities.values().map(Vec::len).sum::<usize>();
                study_records.push(record);
            }

            let summary = compute_gse_summary(study_id, &study_records, self.top_n_report);
            by_gse.insert(study_id.clone(), summary.clone());
            summaries.push(summary);
            stats.n_samples += study_records.len();
            stats.n_studies += 1;
            all_records.extend(study_records);
            info!("Concluded study {study_id}");
        }

        write_gsm_jsonl(&self.layout.gsm_jsonl_path, &all_records)?;

        let gse_summary_report = GseSummaryReport {
            run_id: run_id.to_string(),
            processed_gse_count: stats.n_studies,
            processed_gsm_count: stats.n_samples,
            by_gse,
        };
        write_canonical_json(&self.layout.gse_summary_path, &gse_summary_report)?;

        let resources = ResourceVersions {
            model_ids: BTreeMap::new(),
            ontology_versions: self
                .bundle
                .names()
                .map(|name| (name.to_string(), name.to_string()))
                .collect(),
        };
        let report = compute_corpus_report(
            run_id,
            query_terms.to_vec(),
            query_filters.clone(),
            self.layout.manifest_path.display().to_string(),
            self.layout.corpus_gse_ids_path.display().to_string(),
            sorted_studies.clone(),
            sorted_studies,
            &summaries,
            resources,
            self.top_n_report,
        );
        write_canonical_json(&self.layout.corpus_report_path, &report)?;

        info!(
            "Pipeline run complete: {} studies, {} samples, {} entities",
            stats.n_studies, stats.n_samples, stats.n_entities
        );
        Ok(stats)
    }

    fn process_sample(&self, study_id: &str, sample: &RawSample) -> Result<GsmCleanedRecord, PipelineError> {
        let mentions = self.extractor.extract(&sample.raw_fields).map_err(|err| {
            PipelineError::Raw(crate::raw::RawError::RawFieldMalformed {
                sample_id: sample.sample_id.clone(),
                field: err.to_string(),
            })
        })?;

        let by_label = group_mentions_by_label(mentions);
        let mut entities_by_label = BTreeMap::new();

        for (label, label_mentions) in by_label {
            let Some(ontology_name) = self.label_to_ontology.get(&label) else {
                continue;
            };
            let store = self.bundle.get(ontology_name)?;
            let linker = Linker {
                config: self.linker_config,
                policy: self.policy,
                negation: self.negation,
                retriever: self.retriever,
                reranker: self.reranker,
            };
            let entities = linker.link(&sample.raw_fields, &label_mentions, store)?;
            let grouped = group_entities_by_label(entities);
            for (grouped_label, grouped_entities) in grouped {
                entities_by_label
                    .entry(grouped_label)
                    .or_insert_with(Vec::new)
                    .extend(grouped_entities);
            }
        }

        let textview = build_textview(&sample.raw_fields, &self.textview_config);

        Ok(GsmCleanedRecord {
            schema_version: crate::utils::record_schema_version().to_string(),
            study_id: study_id.to_string(),
            sample_id: sample.sample_id.clone(),
            textview_hash: textview.hash,
            textview_fields: None,
            entities: entities_by_label,
        })
    }
}

fn group_mentions_by_label(mentions: Vec<Mention>) -> BTreeMap<String, Vec<Mention>> {
    let mut grouped: BTreeMap<String, Vec<Mention>> = BTreeMap::new();
    for mention in mentions {
        grouped.entry(mention.label.clone()).or_default().push(mention);
    }
    grouped
}

/// Loads one study's samples from the raw cache, supporting both the
/// per-sample file layout (`raw/<study>/gsm/<sample>.json`) and the combined
/// array layout (`raw/<study>/gsms.json`).
pub fn load_samples_for_study(raw_dir: &Path, study_id: &str) -> Result<Vec<RawSample>, PipelineError> {
    let gsm_dir = raw_dir.join(study_id).join("gsm");
    let combined_path = raw_dir.join(study_id).join("gsms.json");

    let mut samples = if gsm_dir.is_dir() {
        let mut samples = Vec::new();
        for entry in fs::read_dir(&gsm_dir)? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(entry.path())?;
            samples.push(RawSample::from_json(&bytes)?);
        }
        samples
    } else if combined_path.is_file() {
        let bytes = fs::read(&combined_path)?;
        let raw: Vec<serde_json::Value> = serde_json::from_slice(&bytes).map_err(|_| {
            PipelineError::RawCacheMissing(study_id.to_string())
        })?;
        raw.into_iter()
            .map(|v| RawSample::from_json(&serde_json::to_vec(&v).expect("re-serializing parsed JSON cannot fail")))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        return Err(PipelineError::RawCacheMissing(study_id.to_string()));
    };

    samples.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));
    Ok(samples)
}

pub fn write_run_manifest(layout: &RunLayout, manifest: &RunManifest) -> Result<(), PipelineError> {
    write_pretty_json(&layout.manifest_path, manifest).map_err(PipelineError::from)
}
