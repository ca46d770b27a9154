//! Directory batch runner
//!
//! Parses every `*.json` file of an input directory into an output directory
//! with a fixed-size worker pool. The sorted file list is cut into one
//! contiguous shard per worker and each worker walks its shard in order. A
//! failing file is logged and counted; it never stops the batch.
//!
//! Sources are only deleted (when asked to) after their output has been
//! written and found non-empty on disk. A rejected file leaves no output
//! behind, including one written by a previous run.

use super::record::{read_json, transform_record, write_json, RecordError, RecordOptions};
use super::shard::shard;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_parsed";

/// Errors that prevent a batch from starting
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input directory does not exist: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("failed to list {}: {source}", path.display())]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single file was not accepted
#[derive(Debug, Error)]
pub enum FileFailure {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("no record carries the `{0}` field")]
    NoJudgment(String),
    #[error("{incomplete} of {total} parse result(s) have empty sections")]
    Incomplete { incomplete: usize, total: usize },
    #[error("output {} is empty after writing", .0.display())]
    EmptyOutput(PathBuf),
}

/// Everything a batch run needs; no paths or pool sizes are implied.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub delete_source: bool,
    pub require_complete_sections: bool,
    pub output_suffix: String,
    pub record: RecordOptions,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            workers: DEFAULT_WORKERS,
            delete_source: false,
            require_complete_sections: true,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            record: RecordOptions::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_delete_source(mut self, delete_source: bool) -> Self {
        self.delete_source = delete_source;
        self
    }

    pub fn with_require_complete_sections(mut self, require: bool) -> Self {
        self.require_complete_sections = require;
        self
    }

    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    pub fn with_record(mut self, record: RecordOptions) -> Self {
        self.record = record;
        self
    }
}

/// Aggregate outcome of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchStats {
    fn merge(self, other: BatchStats) -> BatchStats {
        BatchStats {
            total: self.total + other.total,
            succeeded: self.succeeded + other.succeeded,
            failed: self.failed + other.failed,
        }
    }
}

/// `*.json` files directly inside `dir`, sorted by path.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::MissingInput(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| BatchError::List {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// `{stem}{suffix}.json` inside `output_dir`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}{}.json", stem, suffix))
}

/// Runs [`BatchOptions`] over a directory
pub struct BatchRunner {
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn run(&self) -> Result<BatchStats, BatchError> {
        let files = list_json_files(&self.options.input_dir)?;
        fs::create_dir_all(&self.options.output_dir).map_err(|source| {
            BatchError::CreateOutput {
                path: self.options.output_dir.clone(),
                source,
            }
        })?;

        let workers = self.options.workers.max(1);
        info!(
            files = files.len(),
            workers,
            input = %self.options.input_dir.display(),
            output = %self.options.output_dir.display(),
            "starting batch"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        let shards = shard(files.len(), workers);
        let stats = pool
            .install(|| {
                shards
                    .into_par_iter()
                    .map(|range| self.run_shard(&files[range]))
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .fold(BatchStats::default(), BatchStats::merge);

        info!(
            total = stats.total,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "batch finished"
        );
        Ok(stats)
    }

    fn run_shard(&self, files: &[PathBuf]) -> BatchStats {
        let mut stats = BatchStats::default();
        for path in files {
            stats.total += 1;
            match self.process_file(path) {
                Ok(output) => {
                    stats.succeeded += 1;
                    debug!(input = %path.display(), output = %output.display(), "parsed");
                }
                Err(error) => {
                    stats.failed += 1;
                    warn!(input = %path.display(), %error, "file rejected");
                }
            }
        }
        stats
    }

    /// Parse one file and write its output; returns the output path.
    ///
    /// On any failure the output path is cleared, so an output left by an
    /// earlier run never stands next to a rejected source.
    pub fn process_file(&self, path: &Path) -> Result<PathBuf, FileFailure> {
        let output = output_path_for(path, &self.options.output_dir, &self.options.output_suffix);
        if let Err(failure) = self.write_output(path, &output) {
            if output != path {
                discard_output(&output);
            }
            return Err(failure);
        }

        if self.options.delete_source {
            if let Err(error) = fs::remove_file(path) {
                warn!(input = %path.display(), %error, "output written but source not removed");
            }
        }
        Ok(output)
    }

    fn write_output(&self, path: &Path, output: &Path) -> Result<(), FileFailure> {
        let mut value = read_json(path)?;
        let results = transform_record(&mut value, &self.options.record)?;
        if results.is_empty() {
            return Err(FileFailure::NoJudgment(
                self.options.record.text_field.clone(),
            ));
        }
        if self.options.require_complete_sections {
            let incomplete = results.iter().filter(|r| !r.is_complete()).count();
            if incomplete > 0 {
                return Err(FileFailure::Incomplete {
                    incomplete,
                    total: results.len(),
                });
            }
        }

        write_json(output, &value)?;
        let written = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(FileFailure::EmptyOutput(output.to_path_buf()));
        }
        Ok(())
    }
}

fn discard_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!(output = %output.display(), "removed output of rejected file"),
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => {
            warn!(output = %output.display(), %error, "rejected file's output not removed")
        }
    }
}
