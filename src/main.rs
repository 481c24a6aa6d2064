use chrono::Utc;
use clap::Parser;
use geo_linker::RunError;
use geo_linker::config::RunConfig;
use geo_linker::config::run_config::LinkerMode;
use geo_linker::export::exporter::write_canonical_json;
use geo_linker::export::textview::TextViewConfig;
use geo_linker::extract::pattern::PatternExtractor;
use geo_linker::linker::LinkerConfig;
use geo_linker::negation::NegationDetector;
use geo_linker::ontology::OntologyBundle;
use geo_linker::ontology::loader::load_ontology_store;
use geo_linker::pipeline::{Pipeline, RunLayout, default_label_to_ontology};
use geo_linker::pipeline::manifest::{RunManifest, config_hash};
use geo_linker::policy::StatusPolicy;
use geo_linker::rerank::DummyReranker;
use geo_linker::retrieval::{CandidateRetriever, RetrieverConfig};
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Runs the entity-linking pipeline over a set of already-downloaded
/// studies. Study discovery and bulk metadata retrieval are expected to
/// have happened upstream; this binary only links and exports.
#[derive(Debug, Parser)]
#[command(name = "geo-linker", version, about)]
struct Args {
    /// Path to the run configuration (.yaml/.yml/.json/.toml/.ron)
    #[arg(long)]
    config: PathBuf,

    /// Study ids to process, e.g. GSE12345
    #[arg(long = "study", required = true)]
    studies: Vec<String>,

    /// Directory of pre-fetched raw sample JSON, copied into the run's raw
    /// cache before linking starts. Layout: <study>/gsm/<sample>.json or
    /// <study>/gsms.json.
    #[arg(long)]
    raw_input_dir: Option<PathBuf>,

    /// Overrides the generated run id (defaults to a UTC timestamp).
    #[arg(long)]
    run_id: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("geo-linker: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), RunError> {
    let config = RunConfig::load(&args.config)?;

    let run_id = args
        .run_id
        .unwrap_or_else(|| format!("run-{}", Utc::now().format("%Y%m%dT%H%M%SZ")));
    let layout = RunLayout::new(&config.run.out_dir, &run_id);
    layout.create_dirs()?;

    if let Some(raw_input_dir) = &args.raw_input_dir {
        copy_dir_recursive(raw_input_dir, &layout.raw_dir).map_err(geo_linker::error::ConstructionError::IOError)?;
    }

    let mut bundle = OntologyBundle::new();
    for (name, path) in &config.ontology.sources {
        let file = fs::File::open(path).map_err(geo_linker::error::ConstructionError::IOError)?;
        let store = load_ontology_store(name, file, config.ontology.use_synonyms)
            .map_err(geo_linker::error::ConstructionError::Ontology)?;
        info!("Loaded ontology '{name}' ({} concepts)", store.len());
        bundle.insert(store);
    }

    if !matches!(config.linker.mode, LinkerMode::LexicalOnly) {
        return Err(geo_linker::error::ConstructionError::Ontology(
            geo_linker::ontology::error::OntologyError::VectorBackendUnavailable {
                ontology: "*".to_string(),
                model_id: config
                    .models
                    .embedder
                    .clone()
                    .unwrap_or_else(|| "unconfigured".to_string()),
            },
        )
        .into());
    }

    let extractor = PatternExtractor::new(config.extract.patterns.clone()).map_err(|err| {
        geo_linker::error::ConstructionError::Ontology(
            geo_linker::ontology::error::OntologyError::LoadFailed {
                name: "extract.patterns".to_string(),
                source: anyhow::Error::from(err),
            },
        )
    })?;

    let retriever_config = RetrieverConfig {
        top_k: config.linker.top_k_retrieve,
        include_definitions: config.ontology.use_definitions,
        ..RetrieverConfig::default()
    };
    let retriever = CandidateRetriever::new(retriever_config);
    let reranker = DummyReranker;

    let policy = StatusPolicy {
        tau: config.policy.tau,
        delta: config.policy.delta,
        top_n: config.policy.top_n,
    };
    let negation = NegationDetector::default();
    let linker_config = LinkerConfig {
        context_window_chars: config.linker.context_window_chars,
        include_negation: config.linker.include_negation,
    };
    let textview_config = TextViewConfig {
        field_priority: config.textview.field_priority.clone(),
        max_field_chars: config.textview.max_field_chars,
    };
    let label_to_ontology = if config.label_to_ontology.is_empty() {
        default_label_to_ontology()
    } else {
        config.label_to_ontology.clone()
    };

    let config_hash_value = config_hash(&config)?;
    write_canonical_json(&layout.config_effective_path, &config)?;

    let pipeline = Pipeline {
        layout: layout.clone(),
        bundle,
        label_to_ontology,
        extractor: &extractor,
        retriever: &retriever,
        reranker: &reranker,
        policy,
        negation,
        linker_config,
        textview_config,
        top_n_report: policy.top_n,
    };

    let query_filters = BTreeMap::new();
    let stats = pipeline.run(&args.studies, &run_id, &config.query.terms, &query_filters)?;

    let manifest = RunManifest {
        run_id: run_id.clone(),
        created_at_utc: Utc::now().to_rfc3339(),
        query_terms: config.query.terms.clone(),
        query_filters,
        retrieval_timestamp_utc: Utc::now().to_rfc3339(),
        code_version: env!("CARGO_PKG_VERSION").to_string(),
        model_ids: config
            .models
            .embedder
            .iter()
            .chain(config.models.reranker.iter())
            .enumerate()
            .map(|(i, v)| (format!("model_{i}"), v.clone()))
            .collect(),
        ontology_versions: pipeline
            .bundle
            .names()
            .map(|name| {
                let version_id = pipeline
                    .bundle
                    .get(name)
                    .expect("name came from bundle.names()")
                    .version_id();
                (name.to_string(), version_id)
            })
            .collect(),
        device: "cpu".to_string(),
        config_hash: config_hash_value,
        config_path: args.config.display().to_string(),
        corpus_gse_ids_path: layout.corpus_gse_ids_path.display().to_string(),
        corpus_gse_count: args.studies.len(),
    };
    geo_linker::pipeline::driver::write_run_manifest(&layout, &manifest)?;

    info!(
        "Run '{}' complete: {} studies, {} samples, {} entities",
        run_id, stats.n_studies, stats.n_samples, stats.n_entities
    );
    Ok(())
}

fn copy_dir_recursive(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}
