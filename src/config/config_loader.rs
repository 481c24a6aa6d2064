use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<'a, T: Serialize + Deserialize<'a>>(file_path: PathBuf) -> Result<T, ConfigError> {
        if let Some(ext) = file_path.extension() {
            let file_format = match ext.to_str() {
                Some("yaml") => Ok(FileFormat::Yaml),
                Some("yml") => Ok(FileFormat::Yaml),
                Some("json") => Ok(FileFormat::Json),
                Some("toml") => Ok(FileFormat::Toml),
                Some("ron") => Ok(FileFormat::Ron),
                _ => Err(ConfigError::NotFound(format!(
                    "File format not supported. File needs to end with .yaml, .json, .toml or .ron. {file_path:?}"
                ))),
            }?;

            let config_str =
                fs::read_to_string(&file_path).expect("Could not read config file to string.");

            // this interprets anything after a $ (within certain rules) as an environment variable
            // and it will look in the environment to find it.
            // Therefore all $ symbols must be escaped with a backslash: \$
            let config_str_with_env_vars = shellexpand::env(&config_str)
                .expect("Shell expansion of config file failed. Environment variables not found?");

            let config = Config::builder()
                .add_source(File::from_str(&config_str_with_env_vars, file_format))
                .build()?;

            let settings_struct: T = config.try_deserialize()?;
            Ok(settings_struct)
        } else {
            Err(ConfigError::NotFound(format!(
                "Could not find file extension on path {file_path:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::run_config::RunConfig;
    use rstest::{fixture, rstest};
    use std::fs::File as StdFile;
    use std::io::Write;
    use std::str::FromStr;
    use tempfile::TempDir;

    const YAML_DATA: &[u8] = br#"
run:
  out_dir: "runs"
linker:
  mode: lexical_plus_bi
  top_k_retrieve: 10
  top_k_rerank: 5
  context_window_chars: 200
  include_negation: true
policy:
  tau: 0.7
  delta: 0.1
  top_n: 5
textview:
  field_priority: ["title", "summary"]
  max_field_chars: 4000
extract:
  labels: ["disease", "tissue"]
"#;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    #[rstest]
    fn test_load_config_from_yaml(temp_dir: TempDir) {
        let file_path = temp_dir.path().join("config.yaml");
        let mut file = StdFile::create(&file_path).unwrap();
        file.write_all(YAML_DATA).unwrap();

        let config: RunConfig = ConfigLoader::load(file_path).unwrap();
        assert_eq!(config.policy.tau, 0.7);
        assert_eq!(config.extract.labels, vec!["disease", "tissue"]);
    }

    #[rstest]
    fn test_load_config_unsupported_file_format() {
        let file_path = PathBuf::from_str("test/path/config.exe").unwrap();
        let err: Result<RunConfig, _> = ConfigLoader::load(file_path);
        assert!(err.is_err());
    }

    #[rstest]
    fn test_shell_expansion_of_out_dir(temp_dir: TempDir) {
        use dotenvy::dotenv;

        dotenv().ok();
        // SAFETY: single-threaded test, no other test reads this key.
        unsafe {
            std::env::set_var("GEO_LINKER_TEST_OUT_DIR", "/tmp/geo-linker-runs");
        }

        let yaml_with_env_var: &[u8] = br#"
run:
  out_dir: "\$GEO_LINKER_TEST_OUT_DIR"
linker:
  mode: lexical_only
extract:
  labels: ["disease"]
"#;
        let file_path = temp_dir.path().join("config.yaml");
        let mut file = StdFile::create(&file_path).unwrap();
        file.write_all(yaml_with_env_var).unwrap();

        let config: RunConfig = ConfigLoader::load(file_path).unwrap();
        assert_eq!(config.run.out_dir, PathBuf::from("/tmp/geo-linker-runs"));
    }
}
