//! Random test-set sampling
//!
//! Copies `n` randomly chosen record files from one directory into another.
//! A seed makes the choice reproducible: files are listed in sorted order
//! before sampling, so the same seed over the same directory always picks
//! the same files.

use super::batch::{list_json_files, BatchError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One copied file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampledFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Outcome of a sampling run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    /// Record files available in the input directory
    pub available: usize,
    /// Files asked for
    pub requested: usize,
    /// Files drawn, `min(requested, available)`
    pub selected: usize,
    pub copied: Vec<SampledFile>,
    /// Source path and error text of every failed copy
    pub failed: Vec<(PathBuf, String)>,
}

impl SampleReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// First free name among `name.ext`, `name_1.ext`, `name_2.ext`, ...
pub fn free_destination(output_dir: &Path, file_name: &str) -> PathBuf {
    let candidate = output_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|counter| output_dir.join(format!("{stem}_{counter}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(candidate)
}

/// Copy up to `n` random record files from `input_dir` into `output_dir`.
///
/// Existing files in `output_dir` are never overwritten; colliding copies get
/// a numeric suffix.
pub fn sample_files(
    input_dir: &Path,
    output_dir: &Path,
    n: usize,
    seed: Option<u64>,
) -> Result<SampleReport, BatchError> {
    let files = list_json_files(input_dir)?;
    let mut report = SampleReport {
        available: files.len(),
        requested: n,
        ..SampleReport::default()
    };
    if files.is_empty() {
        warn!(input = %input_dir.display(), "no record files to sample");
        return Ok(report);
    }
    if n > files.len() {
        warn!(requested = n, available = files.len(), "sampling every file");
    }
    let amount = n.min(files.len());

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let picked = rand::seq::index::sample(&mut rng, files.len(), amount);
    report.selected = picked.len();

    fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutput {
        path: output_dir.to_path_buf(),
        source,
    })?;
    for index in picked.iter() {
        let source = &files[index];
        let Some(name) = source.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let destination = free_destination(output_dir, &name);
        match fs::copy(source, &destination) {
            Ok(_) => {
                debug!(source = %source.display(), destination = %destination.display(), "copied");
                report.copied.push(SampledFile {
                    source: source.clone(),
                    destination,
                });
            }
            Err(error) => {
                warn!(source = %source.display(), %error, "copy failed");
                report.failed.push((source.clone(), error.to_string()));
            }
        }
    }

    info!(
        available = report.available,
        selected = report.selected,
        copied = report.copied.len(),
        failed = report.failed.len(),
        "sampling finished"
    );
    Ok(report)
}
