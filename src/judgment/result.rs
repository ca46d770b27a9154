//! Structured parse results and their serialized form

use super::templates::Template;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a document could not be segmented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseError {
    /// Full text missing, not text, or empty
    #[serde(alias = "Invalid input text")]
    InvalidInput,
    /// No template validated against the document
    #[serde(alias = "No matching pattern found")]
    NoPatternMatch,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidInput => write!(f, "invalid input text"),
            ParseError::NoPatternMatch => write!(f, "no matching pattern found"),
        }
    }
}

/// A serialized record that cannot be turned back into a [`ParseResult`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed parse record: {0}")]
pub struct MalformedRecord(pub String);

/// Body sections between the holding and the date line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Four-part layout
    Split { fact: String, reason: String },
    /// Three-part layout, and every failed parse
    Combined { fact_and_reason: String },
}

impl Body {
    fn sections(&self) -> Vec<&str> {
        match self {
            Body::Split { fact, reason } => vec![fact.as_str(), reason.as_str()],
            Body::Combined { fact_and_reason } => vec![fact_and_reason.as_str()],
        }
    }
}

/// Sections of one judgment, produced once by the segmenter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireResult", try_from = "WireResult")]
pub struct ParseResult {
    pre_information: String,
    main: String,
    body: Body,
    post_information: String,
    template: Option<Template>,
    error: Option<ParseError>,
}

impl ParseResult {
    pub fn new(
        pre_information: String,
        main: String,
        body: Body,
        post_information: String,
        template: Template,
    ) -> Self {
        Self {
            pre_information,
            main,
            body,
            post_information,
            template: Some(template),
            error: None,
        }
    }

    /// A failed parse keeps `original` verbatim as post-information.
    pub fn failure(error: ParseError, original: &str) -> Self {
        Self {
            pre_information: String::new(),
            main: String::new(),
            body: Body::Combined {
                fact_and_reason: String::new(),
            },
            post_information: original.to_string(),
            template: None,
            error: Some(error),
        }
    }

    pub fn pre_information(&self) -> &str {
        &self.pre_information
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn fact(&self) -> Option<&str> {
        match &self.body {
            Body::Split { fact, .. } => Some(fact.as_str()),
            Body::Combined { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.body {
            Body::Split { reason, .. } => Some(reason.as_str()),
            Body::Combined { .. } => None,
        }
    }

    pub fn fact_and_reason(&self) -> Option<&str> {
        match &self.body {
            Body::Combined { fact_and_reason } => Some(fact_and_reason.as_str()),
            Body::Split { .. } => None,
        }
    }

    pub fn post_information(&self) -> &str {
        &self.post_information
    }

    pub fn template(&self) -> Option<Template> {
        self.template
    }

    pub fn error(&self) -> Option<ParseError> {
        self.error
    }

    pub fn is_success(&self) -> bool {
        self.template.is_some() && self.error.is_none()
    }

    /// Successful, and no section (pre, main, body, post) came out empty.
    pub fn is_complete(&self) -> bool {
        self.is_success()
            && !self.pre_information.is_empty()
            && !self.main.is_empty()
            && self.body.sections().iter().all(|s| !s.is_empty())
            && !self.post_information.is_empty()
    }
}

/// On-disk shape. Error tags written as sentences by older tooling are
/// accepted on input.
#[derive(Serialize, Deserialize)]
struct WireResult {
    #[serde(rename = "Pre-Information", default)]
    pre_information: String,
    #[serde(rename = "Main", default)]
    main: String,
    #[serde(rename = "Fact", default, skip_serializing_if = "Option::is_none")]
    fact: Option<String>,
    #[serde(rename = "Reason", default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(
        rename = "Fact and Reason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    fact_and_reason: Option<String>,
    #[serde(rename = "Post-Information", default)]
    post_information: String,
    #[serde(default)]
    pattern: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ParseError>,
}

impl From<ParseResult> for WireResult {
    fn from(result: ParseResult) -> Self {
        let (fact, reason, fact_and_reason) = match result.body {
            Body::Split { fact, reason } => (Some(fact), Some(reason), None),
            Body::Combined { fact_and_reason } => (None, None, Some(fact_and_reason)),
        };
        WireResult {
            pre_information: result.pre_information,
            main: result.main,
            fact,
            reason,
            fact_and_reason,
            post_information: result.post_information,
            pattern: result
                .template
                .map(|t| t.phrases().into_iter().map(String::from).collect()),
            error: result.error,
        }
    }
}

impl TryFrom<WireResult> for ParseResult {
    type Error = MalformedRecord;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        let template = match &wire.pattern {
            Some(phrases) => Some(Template::from_phrases(phrases.as_slice()).ok_or_else(|| {
                MalformedRecord(format!("unknown pattern {:?}", phrases))
            })?),
            None => None,
        };
        let body = match template {
            Some(Template::FourPart) => Body::Split {
                fact: wire.fact.unwrap_or_default(),
                reason: wire.reason.unwrap_or_default(),
            },
            _ => Body::Combined {
                fact_and_reason: wire.fact_and_reason.unwrap_or_default(),
            },
        };
        Ok(ParseResult {
            pre_information: wire.pre_information,
            main: wire.main,
            body,
            post_information: wire.post_information,
            template,
            error: wire.error,
        })
    }
}
