//! Rebuilding a normalized judgment from its sections
//!
//! Reconstruction is lossy by contract. Marker lines are re-emitted as their
//! canonical phrases, so spacing and separators on heading lines are lost, and
//! the date line becomes the bare `中華民國年月日` phrase: the concrete date is
//! not carried by a [`ParseResult`] and cannot be restored.

use super::markers::Marker;
use super::result::{Body, ParseResult};
use super::templates::Template;

/// Emit `result` as newline-joined text.
///
/// Returns an empty string when the result has no template, or when its body
/// does not fit its template family.
pub fn reconstruct(result: &ParseResult) -> String {
    let Some(template) = result.template() else {
        return String::new();
    };

    let mut parts: Vec<&str> = Vec::new();
    push_section(&mut parts, result.pre_information());
    parts.push(Marker::Holding.phrase());
    push_section(&mut parts, result.main());

    match (template, result.body()) {
        (Template::FourPart, Body::Split { fact, reason }) => {
            parts.push(template.secondary().phrase());
            push_section(&mut parts, fact);
            parts.push(Marker::Reasoning.phrase());
            push_section(&mut parts, reason);
        }
        (Template::ThreePart(_), Body::Combined { fact_and_reason }) => {
            parts.push(template.secondary().phrase());
            push_section(&mut parts, fact_and_reason);
        }
        _ => return String::new(),
    }

    parts.push(Marker::Date.phrase());
    push_section(&mut parts, result.post_information());
    parts.join("\n")
}

fn push_section<'a>(parts: &mut Vec<&'a str>, section: &'a str) {
    let section = section.trim();
    if !section.is_empty() {
        parts.push(section);
    }
}
