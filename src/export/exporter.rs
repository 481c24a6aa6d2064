use crate::export::error::ExportError;
use crate::export::records::{
    CorpusReport, GseSummary, GsmCleanedRecord, LabelYield, ResourceVersions, TopMentionCount,
};
use crate::export::stable_json::{pretty_dumps, stable_dumps};
use crate::linker::entity::LinkedEntity;
use crate::policy::LinkStatus;
use crate::retrieval::candidate::sort_candidates;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

fn entity_sort_key(entity: &LinkedEntity) -> (i8, String, String, usize, usize, String) {
    (
        -(entity.status.rank() as i8),
        entity.linked_id.clone().unwrap_or_default(),
        entity.source_field.clone(),
        entity.offsets.start,
        entity.offsets.end,
        entity.surface_form.clone(),
    )
}

/// Groups entities by label (sorted label order) and sorts each label's
/// entities and their `top_candidates` per the canonical export order.
pub fn group_entities_by_label(
    entities: Vec<LinkedEntity>,
) -> BTreeMap<String, Vec<LinkedEntity>> {
    let mut grouped: BTreeMap<String, Vec<LinkedEntity>> = BTreeMap::new();
    for mut entity in entities {
        sort_candidates(&mut entity.top_candidates);
        grouped.entry(entity.label.clone()).or_default().push(entity);
    }
    for entities in grouped.values_mut() {
        entities.sort_by(|a, b| entity_sort_key(a).cmp(&entity_sort_key(b)));
    }
    grouped
}

/// Appends one canonical-JSON line per record to `path`.
pub fn write_gsm_jsonl(path: &Path, records: &[GsmCleanedRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    for record in records {
        writeln!(file, "{}", stable_dumps(record)?)?;
    }
    Ok(())
}

pub fn write_canonical_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, stable_dumps(value)?)?;
    Ok(())
}

pub fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, pretty_dumps(value)?)?;
    Ok(())
}

fn tally(yields: &mut BTreeMap<String, LabelYield>, label: &str, status: LinkStatus) {
    let entry = yields.entry(label.to_string()).or_default();
    entry.total += 1;
    match status {
        LinkStatus::Resolved => entry.resolved += 1,
        LinkStatus::Ambiguous => entry.ambiguous += 1,
        LinkStatus::Unresolved => entry.unresolved += 1,
        LinkStatus::Rejected => entry.rejected += 1,
    }
}

fn top_mentions(
    counts: &BTreeMap<(String, String, String), usize>,
    top_n: usize,
) -> Vec<TopMentionCount> {
    let mut entries: Vec<TopMentionCount> = counts
        .iter()
        .map(|((label, source_field, surface_form), count)| TopMentionCount {
            label: label.clone(),
            source_field: source_field.clone(),
            surface_form: surface_form.clone(),
            count: *count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.source_field.cmp(&b.source_field))
            .then_with(|| a.surface_form.cmp(&b.surface_form))
    });
    entries.truncate(top_n);
    entries
}

/// Computes per-label yield counts and top-N ambiguous/unresolved mentions
/// for one study's sample records.
pub fn compute_gse_summary(study_id: &str, records: &[GsmCleanedRecord], top_n: usize) -> GseSummary {
    let mut yields: BTreeMap<String, LabelYield> = BTreeMap::new();
    let mut ambiguous_counts: BTreeMap<(String, String, String), usize> = BTreeMap::new();
    let mut unresolved_counts: BTreeMap<(String, String, String), usize> = BTreeMap::new();

    for record in records {
        for (label, entities) in &record.entities {
            for entity in entities {
                tally(&mut yields, label, entity.status);
                let key = (
                    label.clone(),
                    entity.source_field.clone(),
                    entity.surface_form.clone(),
                );
                match entity.status {
                    LinkStatus::Ambiguous => *ambiguous_counts.entry(key).or_insert(0) += 1,
                    LinkStatus::Unresolved => *unresolved_counts.entry(key).or_insert(0) += 1,
                    _ => {}
                }
            }
        }
    }

    GseSummary {
        study_id: study_id.to_string(),
        n_samples: records.len(),
        yields_by_label: yields,
        top_ambiguous: top_mentions(&ambiguous_counts, top_n),
        top_unresolved: top_mentions(&unresolved_counts, top_n),
    }
}

/// Aggregates per-study summaries into a corpus-level report. Global top
/// lists are derived by summing per-study top-N counts — an approximation
/// when the underlying entity population is large; see design notes.
pub fn compute_corpus_report(
    run_id: &str,
    query_terms: Vec<String>,
    query_filters: BTreeMap<String, String>,
    manifest_path: String,
    corpus_gse_ids_path: String,
    selected_study_ids: Vec<String>,
    processed_study_ids: Vec<String>,
    summaries: &[GseSummary],
    resources: ResourceVersions,
    top_n: usize,
) -> CorpusReport {
    let mut aggregate: BTreeMap<String, LabelYield> = BTreeMap::new();
    let mut ambiguous_counts: BTreeMap<(String, String, String), usize> = BTreeMap::new();
    let mut unresolved_counts: BTreeMap<(String, String, String), usize> = BTreeMap::new();

    for summary in summaries {
        for (label, label_yield) in &summary.yields_by_label {
            let entry = aggregate.entry(label.clone()).or_default();
            entry.total += label_yield.total;
            entry.resolved += label_yield.resolved;
            entry.ambiguous += label_yield.ambiguous;
            entry.unresolved += label_yield.unresolved;
            entry.rejected += label_yield.rejected;
        }
        for top in &summary.top_ambiguous {
            let key = (top.label.clone(), top.source_field.clone(), top.surface_form.clone());
            *ambiguous_counts.entry(key).or_insert(0) += top.count;
        }
        for top in &summary.top_unresolved {
            let key = (top.label.clone(), top.source_field.clone(), top.surface_form.clone());
            *unresolved_counts.entry(key).or_insert(0) += top.count;
        }
    }

    CorpusReport {
        run_id: run_id.to_string(),
        query_terms,
        query_filters,
        manifest_path,
        corpus_gse_ids_path,
        n_selected: selected_study_ids.len(),
        n_processed: processed_study_ids.len(),
        selected_study_ids,
        processed_study_ids,
        aggregate_yields_by_label: aggregate,
        global_top_ambiguous: top_mentions(&ambiguous_counts, top_n),
        global_top_unresolved: top_mentions(&unresolved_counts, top_n),
        resources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::offsets::FieldOffsets;

    fn entity(label: &str, status: LinkStatus, linked_id: Option<&str>, surface_form: &str) -> LinkedEntity {
        let offsets = FieldOffsets::new("summary", 0, surface_form.len());
        LinkedEntity {
            label: label.to_string(),
            surface_form: surface_form.to_string(),
            source_field: "summary".to_string(),
            offsets: offsets.clone(),
            status,
            linked_id: linked_id.map(str::to_string),
            score: None,
            margin: None,
            top_candidates: vec![],
            provenances: vec![offsets],
        }
    }

    #[test]
    fn groups_and_sorts_resolved_before_ambiguous() {
        let entities = vec![
            entity("disease", LinkStatus::Ambiguous, None, "cancer"),
            entity("disease", LinkStatus::Resolved, Some("DOID:1"), "lung cancer"),
        ];
        let grouped = group_entities_by_label(entities);
        let disease = &grouped["disease"];
        assert_eq!(disease[0].status, LinkStatus::Resolved);
        assert_eq!(disease[1].status, LinkStatus::Ambiguous);
    }

    #[test]
    fn summary_tallies_per_label_status_counts() {
        let record = GsmCleanedRecord {
            schema_version: "1.0".to_string(),
            study_id: "GSE1".to_string(),
            sample_id: "GSM1".to_string(),
            textview_hash: "abc".to_string(),
            textview_fields: None,
            entities: {
                let mut m = BTreeMap::new();
                m.insert(
                    "disease".to_string(),
                    vec![entity("disease", LinkStatus::Resolved, Some("DOID:1"), "lung cancer")],
                );
                m
            },
        };
        let summary = compute_gse_summary("GSE1", &[record], 5);
        assert_eq!(summary.yields_by_label["disease"].resolved, 1);
        assert_eq!(summary.yields_by_label["disease"].total, 1);
    }
}
