//! Layered configuration for the verdict toolchain.
//!
//! Sources, lowest precedence first:
//! 1. `defaults/verdict.default.toml`, embedded at compile time
//! 2. an optional `verdict.toml` in the working directory
//! 3. an explicit file (`--config`)
//! 4. per-key overrides taken from command-line flags
//!
//! [`Loader::build`] deserializes the merged tree into [`VerdictConfig`] and
//! rejects values no command can run with.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/verdict.default.toml");

/// Name of the per-directory configuration file picked up automatically.
pub const LOCAL_CONFIG_FILE: &str = "verdict.toml";

/// Top-level configuration consumed by verdict applications.
#[derive(Debug, Clone, Deserialize)]
pub struct VerdictConfig {
    pub record: RecordConfig,
    pub batch: BatchConfig,
    pub catalog: CatalogConfig,
    pub prefilter: PrefilterConfig,
    pub log: LogConfig,
}

/// Field names used when reading and writing judgment records.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordConfig {
    pub text_field: String,
    pub output_field: String,
    pub output_suffix: String,
}

/// Knobs for the directory batch runner.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub workers: usize,
    pub delete_source: bool,
    pub require_complete_sections: bool,
}

/// Location and search mode of the marker catalog used by existence checks.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub filler_spans_lines: bool,
}

/// Case-type conditions for selecting raw records before parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefilterConfig {
    pub path_includes: Vec<String>,
    pub path_excludes: Vec<String>,
    pub lead_keyword: String,
    pub lead_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

impl VerdictConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.batch.workers == 0 {
            return Err(ConfigError::Message(
                "batch.workers must be at least 1".into(),
            ));
        }
        if self.record.text_field == self.record.output_field {
            return Err(ConfigError::Message(format!(
                "record.output_field must differ from record.text_field (`{}`)",
                self.record.text_field
            )));
        }
        if self.prefilter.lead_window == 0 && !self.prefilter.lead_keyword.is_empty() {
            return Err(ConfigError::Message(
                "prefilter.lead_window must be positive when lead_keyword is set".into(),
            ));
        }
        Ok(self)
    }
}

/// Builder that merges configuration sources in precedence order.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Embedded defaults only.
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Defaults plus `verdict.toml` from `dir` when that file exists.
    pub fn discover(dir: impl AsRef<Path>) -> Self {
        let local = dir.as_ref().join(LOCAL_CONFIG_FILE);
        Self::new().layer(&local, false)
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path)
            .format(FileFormat::Toml)
            .required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override `key` when a flag supplied a value; `None` leaves it alone.
    pub fn override_with<I>(mut self, key: &str, value: Option<I>) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        if let Some(value) = value {
            self.builder = self.builder.set_override(key, value)?;
        }
        Ok(self)
    }

    /// Merge every layer and check the result.
    pub fn build(self) -> Result<VerdictConfig, ConfigError> {
        self.builder
            .build()?
            .try_deserialize::<VerdictConfig>()?
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("verdict-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn embedded_defaults() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config.record.text_field, "JFULL");
        assert_eq!(config.record.output_field, "parsed_judgment");
        assert_eq!(config.batch.workers, 8);
        assert!(!config.batch.delete_source);
        assert!(config.batch.require_complete_sections);
        assert!(!config.catalog.filler_spans_lines);
        assert_eq!(config.prefilter.path_includes, vec!["民事"]);
        assert_eq!(config.prefilter.lead_window, 30);
    }

    #[test]
    fn absent_values_do_not_override() {
        let config = Loader::new()
            .override_with("batch.workers", Some(16_i64))
            .expect("override to apply")
            .override_with("batch.delete_source", None::<bool>)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.batch.workers, 16);
        assert!(!config.batch.delete_source);
    }

    #[test]
    fn local_file_then_explicit_file() {
        let dir = scratch_dir("layers");
        fs::write(
            dir.join(LOCAL_CONFIG_FILE),
            "[record]\ntext_field = \"FULLTEXT\"\n[batch]\nworkers = 2\n",
        )
        .unwrap();
        let explicit = dir.join("explicit.toml");
        fs::write(&explicit, "[batch]\nworkers = 4\n").unwrap();

        let config = Loader::discover(&dir)
            .with_file(&explicit)
            .build()
            .expect("config to build");
        assert_eq!(config.record.text_field, "FULLTEXT");
        assert_eq!(config.batch.workers, 4);
        assert_eq!(config.record.output_suffix, "_parsed");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn discover_without_local_file() {
        let dir = scratch_dir("empty");
        let config = Loader::discover(&dir).build().expect("config to build");
        assert_eq!(config.log.filter, "info");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Loader::new().with_file("/nonexistent/verdict.toml").build().is_err());
    }

    #[test]
    fn zero_workers_are_rejected() {
        let err = Loader::new()
            .override_with("batch.workers", Some(0_i64))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("batch.workers"));
    }

    #[test]
    fn output_field_must_not_clobber_text_field() {
        let err = Loader::new()
            .override_with("record.output_field", Some("JFULL"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("record.output_field"));
    }
}
