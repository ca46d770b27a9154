//! Partitioning a judgment into sections
//!
//! Marker lines themselves never end up in a section. Every other line lands in
//! exactly one section: before the holding, between two consecutive structural
//! markers, or after the date line.

use super::locator::PositionMap;
use super::result::{Body, ParseError, ParseResult};
use super::templates::{select, Template};
use std::ops::Range;

/// Segment a full judgment text.
///
/// Empty input yields [`ParseError::InvalidInput`]. When no template validates
/// the whole text is kept verbatim as post-information with
/// [`ParseError::NoPatternMatch`].
pub fn parse(text: &str) -> ParseResult {
    if text.is_empty() {
        return ParseResult::failure(ParseError::InvalidInput, text);
    }

    let lines: Vec<&str> = text.split('\n').collect();
    match select(&lines) {
        Some(selection) => segment(&lines, selection.template, &selection.positions)
            .unwrap_or_else(|| ParseResult::failure(ParseError::NoPatternMatch, text)),
        None => ParseResult::failure(ParseError::NoPatternMatch, text),
    }
}

/// Cut `lines` at the positions of `template`'s markers.
///
/// Returns `None` if a marker of the template is missing from `positions`.
pub fn segment(lines: &[&str], template: Template, positions: &PositionMap) -> Option<ParseResult> {
    let bounds = positions.indices_of(&template.document_order())?;
    let (first, last) = (*bounds.first()?, *bounds.last()?);

    // Sections strictly between consecutive marker lines.
    let inner: Vec<String> = bounds
        .windows(2)
        .map(|pair| join(lines, pair[0] + 1..pair[1]))
        .collect();

    let pre_information = join(lines, 0..first);
    let post_information = join(lines, last + 1..lines.len());

    let (main, body) = match (template, inner.as_slice()) {
        (Template::FourPart, [main, fact, reason]) => (
            main.clone(),
            Body::Split {
                fact: fact.clone(),
                reason: reason.clone(),
            },
        ),
        (Template::ThreePart(_), [main, fact_and_reason]) => (
            main.clone(),
            Body::Combined {
                fact_and_reason: fact_and_reason.clone(),
            },
        ),
        _ => return None,
    };

    Some(ParseResult::new(
        pre_information,
        main,
        body,
        post_information,
        template,
    ))
}

fn join(lines: &[&str], range: Range<usize>) -> String {
    lines
        .get(range)
        .map(|slice| slice.join("\n").trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::markers::CombinedLabel;

    #[test]
    fn empty_text_is_invalid_input() {
        let result = parse("");
        assert_eq!(result.error(), Some(ParseError::InvalidInput));
        assert_eq!(result.template(), None);
        assert_eq!(result.post_information(), "");
    }

    #[test]
    fn whitespace_only_text_finds_no_pattern() {
        let result = parse("   \n  ");
        assert_eq!(result.error(), Some(ParseError::NoPatternMatch));
        assert_eq!(result.post_information(), "   \n  ");
    }

    #[test]
    fn splits_four_part_layout() {
        let text = "法院判決\n  主文\n駁回。\n  事實\n甲主張。\n  理由\n乙理由。\n中華民國112年1月2日\n法官 某";
        let result = parse(text);
        assert_eq!(result.template(), Some(Template::FourPart));
        assert_eq!(result.pre_information(), "法院判決");
        assert_eq!(result.main(), "駁回。");
        assert_eq!(result.fact(), Some("甲主張。"));
        assert_eq!(result.reason(), Some("乙理由。"));
        assert_eq!(result.post_information(), "法官 某");
        assert_eq!(result.error(), None);
    }

    #[test]
    fn splits_three_part_layout() {
        let text = "判決\n主文\n一\n二\n事實及理由：\n三\n\n四\n中華民國九十年七月三十一日\n";
        let result = parse(text);
        assert_eq!(
            result.template(),
            Some(Template::ThreePart(CombinedLabel::FactsAndReasons))
        );
        assert_eq!(result.main(), "一\n二");
        assert_eq!(result.fact_and_reason(), Some("三\n\n四"));
        assert_eq!(result.post_information(), "");
    }

    #[test]
    fn adjacent_markers_give_empty_sections() {
        let text = "主文\n事實與理由\n中華民國1年1月1日";
        let result = parse(text);
        assert_eq!(result.pre_information(), "");
        assert_eq!(result.main(), "");
        assert_eq!(result.fact_and_reason(), Some(""));
        assert!(result.is_success());
        assert!(!result.is_complete());
    }

    #[test]
    fn crlf_line_endings_are_trimmed() {
        let text = "前\r\n主文\r\n內容\r\n理由\r\n說明\r\n中華民國1年1月1日\r\n後\r\n";
        let result = parse(text);
        assert_eq!(
            result.template(),
            Some(Template::ThreePart(CombinedLabel::Reasons))
        );
        assert_eq!(result.main(), "內容");
        assert_eq!(result.post_information(), "後");
    }

    #[test]
    fn segment_rejects_incomplete_positions() {
        let lines = ["主文", "內容"];
        let positions = PositionMap::default();
        assert_eq!(segment(&lines, Template::FourPart, &positions), None);
    }
}
