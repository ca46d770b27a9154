//! Case-type prefilter for raw judgment records
//!
//! Open-data dumps mix every court and case type. The prefilter keeps the
//! records worth segmenting: civil first-instance judgments by default. A
//! record qualifies when
//!
//! - its path, relative to the input directory, contains every
//!   `path_includes` entry and none of the `path_excludes` entries, and
//! - `lead_keyword` occurs within the first `lead_window` non-whitespace
//!   characters of its full text.
//!
//! Qualifying records are rewritten, pretty-printed, into a flat output
//! directory. Input directories are walked recursively since dumps nest
//! records by court.

use super::batch::BatchError;
use super::record::{read_json, text_of, write_json, RecordError};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use verdict_config::PrefilterConfig;

/// Conditions a record must meet to be kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefilterRules {
    pub path_includes: Vec<String>,
    pub path_excludes: Vec<String>,
    pub lead_keyword: String,
    pub lead_window: usize,
}

impl Default for PrefilterRules {
    fn default() -> Self {
        Self {
            path_includes: vec!["民事".to_string()],
            path_excludes: vec!["上".to_string()],
            lead_keyword: "判決".to_string(),
            lead_window: 30,
        }
    }
}

impl From<&PrefilterConfig> for PrefilterRules {
    fn from(config: &PrefilterConfig) -> Self {
        Self {
            path_includes: config.path_includes.clone(),
            path_excludes: config.path_excludes.clone(),
            lead_keyword: config.lead_keyword.clone(),
            lead_window: config.lead_window,
        }
    }
}

impl PrefilterRules {
    pub fn accepts_path(&self, relative: &str) -> bool {
        self.path_includes.iter().all(|s| relative.contains(s.as_str()))
            && !self.path_excludes.iter().any(|s| relative.contains(s.as_str()))
    }

    /// The keyword must fit entirely inside the leading window.
    pub fn accepts_text(&self, text: &str) -> bool {
        if self.lead_keyword.is_empty() {
            return true;
        }
        let lead: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(self.lead_window)
            .collect();
        lead.contains(self.lead_keyword.as_str())
    }
}

/// Outcome of a prefilter run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefilterStats {
    /// Record files found under the input directory
    pub scanned: usize,
    /// Files written to the output directory
    pub kept: usize,
    /// Files that could not be read or written
    pub failed: usize,
}

/// `*.json` files anywhere below `dir`, sorted by path.
pub fn walk_json_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::MissingInput(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|source| BatchError::List {
            path: current.clone(),
            source,
        })?;
        for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

enum Verdict {
    Kept,
    Skipped,
}

fn prefilter_file(
    path: &Path,
    relative: &str,
    output_dir: &Path,
    rules: &PrefilterRules,
    text_field: &str,
) -> Result<Verdict, RecordError> {
    if !rules.accepts_path(relative) {
        return Ok(Verdict::Skipped);
    }
    let record = read_json(path)?;
    if !rules.accepts_text(text_of(&record, text_field)) {
        return Ok(Verdict::Skipped);
    }
    let Some(name) = path.file_name() else {
        return Ok(Verdict::Skipped);
    };
    write_json(&output_dir.join(name), &record)?;
    Ok(Verdict::Kept)
}

/// Copy every qualifying record below `input_dir` into `output_dir`.
///
/// Records with the same file name in different subdirectories overwrite
/// each other; the last one in path order wins.
pub fn prefilter_dir(
    input_dir: &Path,
    output_dir: &Path,
    rules: &PrefilterRules,
    text_field: &str,
) -> Result<PrefilterStats, BatchError> {
    let files = walk_json_files(input_dir)?;
    fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutput {
        path: output_dir.to_path_buf(),
        source,
    })?;
    info!(files = files.len(), input = %input_dir.display(), "prefiltering records");

    let verdicts: Vec<Result<Verdict, RecordError>> = files
        .par_iter()
        .map(|path| {
            let relative = path
                .strip_prefix(input_dir)
                .unwrap_or(path)
                .to_string_lossy();
            prefilter_file(path, &relative, output_dir, rules, text_field)
        })
        .collect();

    let mut stats = PrefilterStats {
        scanned: files.len(),
        ..PrefilterStats::default()
    };
    for (path, verdict) in files.iter().zip(verdicts) {
        match verdict {
            Ok(Verdict::Kept) => {
                stats.kept += 1;
                debug!(file = %path.display(), "kept");
            }
            Ok(Verdict::Skipped) => {}
            Err(error) => {
                stats.failed += 1;
                warn!(file = %path.display(), %error, "prefilter failed");
            }
        }
    }

    info!(scanned = stats.scanned, kept = stats.kept, failed = stats.failed, "prefilter finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn path_conditions() {
        let rules = PrefilterRules::default();
        assert!(rules.accepts_path("臺灣臺北地方法院民事/TPDV,112,訴,1.json"));
        assert!(!rules.accepts_path("臺灣高等法院民事/TPHV,112,上,1.json"));
        assert!(!rules.accepts_path("臺灣臺北地方法院刑事/TPDM,112,訴,1.json"));
    }

    #[test]
    fn keyword_must_lead_the_text() {
        let rules = PrefilterRules::default();
        assert!(rules.accepts_text("臺灣臺北地方法院民事判決\n主文"));
        assert!(rules.accepts_text("臺　灣　臺　北　地　方　法　院　民　事　判　決"));
        assert!(!rules.accepts_text("臺灣臺北地方法院民事裁定\n主文"));

        let late = format!("{}判決", "字".repeat(29));
        assert!(!rules.accepts_text(&late));
        let edge = format!("{}判決", "字".repeat(28));
        assert!(rules.accepts_text(&edge));
    }

    #[test]
    fn empty_keyword_accepts_everything() {
        let rules = PrefilterRules {
            lead_keyword: String::new(),
            ..PrefilterRules::default()
        };
        assert!(rules.accepts_text(""));
    }

    #[test]
    fn copies_qualifying_records_from_nested_directories() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let civil = input.path().join("臺北地院民事");
        let appeal = input.path().join("高院民事上訴");
        fs::create_dir_all(&civil).unwrap();
        fs::create_dir_all(&appeal).unwrap();
        let judgment = json!({ "JID": "1", "JFULL": "臺北地方法院民事判決\n主文" });
        fs::write(civil.join("a.json"), judgment.to_string()).unwrap();
        fs::write(
            civil.join("b.json"),
            json!({ "JFULL": "臺北地方法院民事裁定" }).to_string(),
        )
        .unwrap();
        fs::write(appeal.join("c.json"), judgment.to_string()).unwrap();
        fs::write(civil.join("broken.json"), "{").unwrap();

        let stats = prefilter_dir(
            input.path(),
            output.path(),
            &PrefilterRules::default(),
            "JFULL",
        )
        .unwrap();
        assert_eq!(
            stats,
            PrefilterStats {
                scanned: 4,
                kept: 1,
                failed: 1
            }
        );
        let copied: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output.path().join("a.json")).unwrap())
                .unwrap();
        assert_eq!(copied, judgment);
        assert!(!output.path().join("c.json").exists());
    }
}
