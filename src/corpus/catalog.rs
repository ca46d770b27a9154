//! Marker catalog and document-wide existence checks
//!
//! The catalog maps category names to lists of marker strings:
//!
//!     {"necessary_flags": {"main": ["主文"], "date": ["中華民國年月日"]}}
//!
//! A document satisfies a category when any of its markers is found. Finding
//! uses [`DocumentSearch`], an unanchored multi-line search over the whole
//! text. It is separate from the segmenter's anchored
//! [`LineRule`](crate::judgment::LineRule), and the two may disagree about
//! whether a document contains a marker.
//!
//! By default the date filler and inter-character whitespace stay on one line.
//! `filler_spans_lines` restores the legacy behavior where both may run across
//! line breaks.

use crate::judgment::markers::{spaced, DATE_PHRASE, DATE_UNITS, ERA_NAME, SEPARATORS};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("category `{0}` must be a list of marker strings")]
    Shape(String),
    #[error("marker `{flag}` does not compile: {source}")]
    Pattern { flag: String, source: regex::Error },
}

/// One named group of interchangeable markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCategory {
    pub name: String,
    pub flags: Vec<String>,
}

/// Categories in the order they appear in the catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCatalog {
    categories: Vec<FlagCategory>,
}

#[derive(Deserialize)]
struct CatalogFile {
    necessary_flags: Map<String, Value>,
}

impl FlagCatalog {
    pub fn new(categories: Vec<FlagCategory>) -> Self {
        Self { categories }
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        let categories = file
            .necessary_flags
            .into_iter()
            .map(|(name, flags)| -> Result<FlagCategory, CatalogError> {
                let flags = serde_json::from_value::<Vec<String>>(flags)
                    .map_err(|_| CatalogError::Shape(name.clone()))?;
                Ok(FlagCategory { name, flags })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { categories })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn categories(&self) -> &[FlagCategory] {
        &self.categories
    }

    /// Compile every marker into a [`FlagChecker`].
    pub fn compile(&self, filler_spans_lines: bool) -> Result<FlagChecker, CatalogError> {
        let categories = self
            .categories
            .iter()
            .map(|category| -> Result<_, CatalogError> {
                let searches = category
                    .flags
                    .iter()
                    .map(|flag| {
                        DocumentSearch::build(flag, filler_spans_lines)
                            .map(|search| (flag.clone(), search))
                            .map_err(|source| CatalogError::Pattern {
                                flag: flag.clone(),
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((category.name.clone(), searches))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FlagChecker { categories })
    }
}

/// Unanchored multi-line search for one marker anywhere in a document
#[derive(Debug, Clone)]
pub struct DocumentSearch {
    regex: Regex,
}

impl DocumentSearch {
    pub fn build(flag: &str, filler_spans_lines: bool) -> Result<Self, regex::Error> {
        // Legacy mode: `\s` crosses newlines and `.` matches them too.
        let (flags, gap) = if filler_spans_lines {
            ("(?ms)", r"\s*")
        } else {
            ("(?m)", r"[^\S\n]*")
        };
        let pattern = if flag == DATE_PHRASE {
            format!(
                "{flags}^{gap}{}.*?{}.*?{}.*?{}{gap}$",
                spaced(ERA_NAME, gap),
                regex::escape(DATE_UNITS[0]),
                regex::escape(DATE_UNITS[1]),
                regex::escape(DATE_UNITS[2]),
            )
        } else {
            format!(
                "{flags}^{gap}{}{gap}[{}]?{gap}$",
                spaced(flag, gap),
                SEPARATORS
            )
        };
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn is_found_in(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Outcome of checking one document against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagReport {
    /// Categories with at least one match, and the markers that matched
    pub found: Vec<(String, Vec<String>)>,
    /// Categories without any match
    pub missing: Vec<String>,
}

impl FlagReport {
    pub fn has_all_flags(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A catalog with every marker compiled
#[derive(Debug, Clone)]
pub struct FlagChecker {
    categories: Vec<(String, Vec<(String, DocumentSearch)>)>,
}

impl FlagChecker {
    pub fn check(&self, text: &str) -> FlagReport {
        let mut report = FlagReport::default();
        for (name, searches) in &self.categories {
            let matched = matched_in(searches, text);
            if matched.is_empty() {
                report.missing.push(name.clone());
            } else {
                report.found.push((name.clone(), matched));
            }
        }
        report
    }

    /// Every category has a match; stops at the first category without one.
    pub fn has_all_flags(&self, text: &str) -> bool {
        self.categories.iter().all(|(_, searches)| {
            searches
                .iter()
                .any(|(_, search)| search.is_found_in(text))
        })
    }

    /// All matched markers across categories, or nothing if any category misses.
    pub fn matched_flags(&self, text: &str) -> Vec<String> {
        let mut all = Vec::new();
        for (_, searches) in &self.categories {
            let matched = matched_in(searches, text);
            if matched.is_empty() {
                return Vec::new();
            }
            all.extend(matched);
        }
        all
    }
}

fn matched_in(searches: &[(String, DocumentSearch)], text: &str) -> Vec<String> {
    searches
        .iter()
        .filter(|(_, search)| search.is_found_in(text))
        .map(|(flag, _)| flag.clone())
        .collect()
}
