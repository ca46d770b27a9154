//! Directory-level marker surveys and filtering
//!
//! Both walk the `*.json` files of a directory and judge each record's full
//! text with a [`FlagChecker`]. A survey tallies which marker combinations
//! occur; a filter moves the files that satisfy every catalog category.

use super::batch::{list_json_files, BatchError};
use super::catalog::FlagChecker;
use super::record::{read_json, text_of};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Aggregated marker usage across a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurveyReport {
    /// Files that were read and checked
    pub scanned: usize,
    /// File name → matched markers, for files satisfying every category
    pub matched: BTreeMap<String, Vec<String>>,
    /// Number of matched markers → number of files
    pub by_count: BTreeMap<usize, usize>,
    /// Sorted marker combination → number of files, most common first
    pub combinations: Vec<(Vec<String>, usize)>,
}

/// Count files by number of markers and by marker combination.
///
/// Combinations are sorted by descending count, ties broken by the
/// combination itself so reports are stable.
pub fn tally(
    matched: &BTreeMap<String, Vec<String>>,
) -> (BTreeMap<usize, usize>, Vec<(Vec<String>, usize)>) {
    let mut by_count = BTreeMap::new();
    let mut combos: HashMap<Vec<String>, usize> = HashMap::new();
    for flags in matched.values() {
        *by_count.entry(flags.len()).or_insert(0) += 1;
        let mut combination = flags.clone();
        combination.sort();
        *combos.entry(combination).or_insert(0) += 1;
    }

    let mut combinations: Vec<(Vec<String>, usize)> = combos.into_iter().collect();
    combinations.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    (by_count, combinations)
}

/// Survey every record file in `dir`. Unreadable files are logged and skipped.
pub fn survey_dir(
    dir: &Path,
    checker: &FlagChecker,
    text_field: &str,
) -> Result<SurveyReport, BatchError> {
    let files = list_json_files(dir)?;
    info!(files = files.len(), dir = %dir.display(), "surveying markers");

    let mut report = SurveyReport::default();
    for path in &files {
        let record = match read_json(path) {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "skipping file");
                continue;
            }
        };
        report.scanned += 1;

        let text = text_of(&record, text_field);
        let flags = checker.matched_flags(text);
        debug!(file = %path.display(), chars = text.chars().count(), ?flags, "checked");
        if !flags.is_empty() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            report.matched.insert(name, flags);
        }
    }

    let (by_count, combinations) = tally(&report.matched);
    report.by_count = by_count;
    report.combinations = combinations;
    Ok(report)
}

/// Outcome of a filter run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total: usize,
    pub moved: usize,
}

impl FilterStats {
    /// Files left behind in the input directory.
    pub fn remaining(&self) -> usize {
        self.total - self.moved
    }
}

/// Move every file whose text satisfies all catalog categories into `output_dir`.
pub fn filter_dir(
    input_dir: &Path,
    output_dir: &Path,
    checker: &FlagChecker,
    text_field: &str,
) -> Result<FilterStats, BatchError> {
    let files = list_json_files(input_dir)?;
    fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutput {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut stats = FilterStats {
        total: files.len(),
        moved: 0,
    };
    for (index, path) in files.iter().enumerate() {
        let position = index + 1;
        let record = match read_json(path) {
            Ok(record) => record,
            Err(error) => {
                warn!(position, total = stats.total, %error, "skipping file");
                continue;
            }
        };
        if !checker.has_all_flags(text_of(&record, text_field)) {
            debug!(position, file = %path.display(), "kept");
            continue;
        }

        let Some(name) = path.file_name() else {
            continue;
        };
        let destination = output_dir.join(name);
        match move_file(path, &destination) {
            Ok(()) => {
                stats.moved += 1;
                debug!(position, file = %destination.display(), "moved");
            }
            Err(error) => warn!(position, file = %path.display(), %error, "move failed"),
        }
    }

    info!(
        total = stats.total,
        moved = stats.moved,
        remaining = stats.remaining(),
        "filter finished"
    );
    Ok(stats)
}

/// Rename `from` to `to`, copying and deleting when a rename is impossible
/// (for example across filesystems).
pub(crate) fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(error) => {
            debug!(file = %from.display(), %error, "rename failed, copying instead");
            copy_then_remove(from, to)
        }
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(error) = fs::remove_file(from) {
        // Keep exactly one copy on failure.
        if let Err(cleanup) = fs::remove_file(to) {
            warn!(file = %to.display(), error = %cleanup, "copy left next to unmoved source");
        }
        return Err(error);
    }
    Ok(())
}
