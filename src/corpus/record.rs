//! Judgment records as JSON values
//!
//! A record is a JSON object carrying the full judgment text in one field
//! (`JFULL` by default) next to arbitrary metadata. Parsing a record swaps the
//! text field for a `parsed_judgment` field and leaves every other field, and
//! the field order, untouched. Files may hold a single record or an array of
//! them.

use crate::judgment::{parse, reconstruct, ParseError, ParseResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TEXT_FIELD: &str = "JFULL";
pub const DEFAULT_OUTPUT_FIELD: &str = "parsed_judgment";

/// Errors while reading, transforming or writing record files
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode parse result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Which fields hold the input text and receive the parse result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    pub text_field: String,
    pub output_field: String,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            output_field: DEFAULT_OUTPUT_FIELD.to_string(),
        }
    }
}

/// Parse a text field that may be absent or hold a non-string value.
pub fn parse_field(value: Option<&Value>) -> ParseResult {
    match value.and_then(Value::as_str) {
        Some(text) => parse(text),
        None => ParseResult::failure(ParseError::InvalidInput, ""),
    }
}

/// Full text of a record, or `""` when the field is missing or not a string.
pub fn text_of<'a>(record: &'a Value, text_field: &str) -> &'a str {
    record
        .get(text_field)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Replace the text field of every record in `value` with its parse result.
///
/// Objects without the text field, and non-object array elements, pass
/// through unchanged. Returns one result per record that carried the field.
pub fn transform_record(
    value: &mut Value,
    options: &RecordOptions,
) -> Result<Vec<ParseResult>, RecordError> {
    let mut results = Vec::new();
    match value {
        Value::Array(items) => {
            for item in items.iter_mut() {
                if let Some(result) = transform_object(item, options)? {
                    results.push(result);
                }
            }
        }
        other => {
            if let Some(result) = transform_object(other, options)? {
                results.push(result);
            }
        }
    }
    Ok(results)
}

fn transform_object(
    value: &mut Value,
    options: &RecordOptions,
) -> Result<Option<ParseResult>, RecordError> {
    let Some(object) = value.as_object_mut() else {
        return Ok(None);
    };
    let Some(text) = take_field(object, &options.text_field) else {
        return Ok(None);
    };

    let result = parse_field(Some(&text));
    object.insert(options.output_field.clone(), serde_json::to_value(&result)?);
    Ok(Some(result))
}

/// Remove `key` while keeping the remaining fields in their original order.
fn take_field(object: &mut Map<String, Value>, key: &str) -> Option<Value> {
    if !object.contains_key(key) {
        return None;
    }
    let mut taken = None;
    for (name, field) in std::mem::take(object) {
        if name == key {
            taken = Some(field);
        } else {
            object.insert(name, field);
        }
    }
    taken
}

/// Rebuild a judgment from a stored parse result.
///
/// Accepts either a bare serialized result or a record carrying one under
/// `output_field`. Anything that does not deserialize yields `""`.
pub fn reconstruct_value(value: &Value, output_field: &str) -> String {
    let candidate = value.get(output_field).unwrap_or(value);
    match serde_json::from_value::<ParseResult>(candidate.clone()) {
        Ok(result) => reconstruct(&result),
        Err(_) => String::new(),
    }
}

pub fn read_json(path: &Path) -> Result<Value, RecordError> {
    let content = fs::read_to_string(path).map_err(|source| RecordError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RecordError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` pretty-printed with two-space indentation, UTF-8 unescaped.
pub fn write_json(path: &Path, value: &Value) -> Result<(), RecordError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|source| RecordError::Write {
        path: path.to_path_buf(),
        source,
    })
}
