use crate::pipeline::error::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed directory/file layout for a single run. Computing paths never
/// touches the filesystem; only [`RunLayout::create_dirs`] does, and it
/// fails fast if the run root already exists — a run id is never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLayout {
    pub run_root: PathBuf,
    pub manifest_path: PathBuf,
    pub config_effective_path: PathBuf,
    pub corpus_dir: PathBuf,
    pub corpus_gse_ids_path: PathBuf,
    pub cache_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub gsm_jsonl_path: PathBuf,
    pub reports_dir: PathBuf,
    pub gse_summary_path: PathBuf,
    pub corpus_report_path: PathBuf,
}

impl RunLayout {
    pub fn new(out_dir: &Path, run_id: &str) -> Self {
        let run_root = out_dir.join(run_id);
        let corpus_dir = run_root.join("corpus");
        let outputs_dir = run_root.join("outputs");
        let reports_dir = run_root.join("reports");

        RunLayout {
            manifest_path: run_root.join("manifest.json"),
            config_effective_path: run_root.join("config_effective.json"),
            corpus_gse_ids_path: corpus_dir.join("corpus_gse_ids.json"),
            cache_dir: run_root.join("cache"),
            raw_dir: run_root.join("raw"),
            gsm_jsonl_path: outputs_dir.join("gsm.jsonl"),
            gse_summary_path: reports_dir.join("gse_summary.json"),
            corpus_report_path: reports_dir.join("corpus_report.json"),
            corpus_dir,
            outputs_dir,
            reports_dir,
            run_root,
        }
    }

    pub fn raw_gsm_path(&self, study_id: &str, sample_id: &str) -> PathBuf {
        self.raw_dir
            .join(study_id)
            .join("gsm")
            .join(format!("{sample_id}.json"))
    }

    /// Creates the run root and every subdirectory. Fails if the run root
    /// already exists.
    pub fn create_dirs(&self) -> Result<(), PipelineError> {
        if self.run_root.exists() {
            return Err(PipelineError::RunRootAlreadyExists(self.run_root.clone()));
        }
        fs::create_dir_all(&self.run_root)?;
        fs::create_dir_all(&self.corpus_dir)?;
        fs::create_dir_all(&self.cache_dir)?;
        fs::create_dir_all(&self.raw_dir)?;
        fs::create_dir_all(&self.outputs_dir)?;
        fs::create_dir_all(&self.reports_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fails_fast_when_run_root_already_exists() {
        let tmp = TempDir::new().unwrap();
        let layout = RunLayout::new(tmp.path(), "run-1");
        layout.create_dirs().unwrap();
        assert!(layout.create_dirs().is_err());
    }

    #[test]
    fn paths_follow_the_documented_layout() {
        let layout = RunLayout::new(Path::new("/out"), "run-1");
        assert_eq!(layout.manifest_path, Path::new("/out/run-1/manifest.json"));
        assert_eq!(
            layout.raw_gsm_path("GSE1", "GSM1"),
            Path::new("/out/run-1/raw/GSE1/gsm/GSM1.json")
        );
    }
}
