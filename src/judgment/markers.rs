//! Marker vocabulary and whole-line matching rules
//!
//! Every heading the segmenter recognizes is a [`Marker`]. A marker compiles to
//! a [`LineRule`]: a regex anchored at both ends of a trimmed line.
//!
//! Ordinary markers accept their characters in order with any run of
//! whitespace between two characters, then at most one separator (`：`, `:`
//! or `︰`) and trailing whitespace:
//!
//!     主文            -> matches
//!     主　　文：       -> matches
//!     主文如下        -> no match (extra text on the line)
//!
//! The date marker is compound. Its line must start with the era name and then
//! contain the year, month and day units in order, with any filler between
//! them:
//!
//!     中　華　民　國　九十　年　七　月　三十一　日

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Canonical phrase of the compound date marker.
pub const DATE_PHRASE: &str = "中華民國年月日";

/// Era name that opens every date line.
pub const ERA_NAME: &str = "中華民國";

/// Year, month and day units, in the order they must appear.
pub const DATE_UNITS: [&str; 3] = ["年", "月", "日"];

/// Characters accepted as a single trailing separator after a heading.
pub const SEPARATORS: &str = "：:︰";

/// Section labels that may stand in for separate facts and reasoning headings.
///
/// Declaration order is the priority order used by template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CombinedLabel {
    /// 事實及理由
    FactsAndReasons,
    /// 事實及理由要領
    FactsAndReasonsSummary,
    /// 理由要領
    ReasonsSummary,
    /// 理由
    Reasons,
    /// 判決事實及理由要領
    JudgmentFactsAndReasonsSummary,
    /// 訴訟標的及理由要領
    ClaimAndReasonsSummary,
    /// 爭執事項及理由要領
    DisputedIssuesAndReasonsSummary,
    /// 事實
    Facts,
    /// 事實與理由
    FactsWithReasons,
}

impl CombinedLabel {
    pub const ALL: [CombinedLabel; 9] = [
        CombinedLabel::FactsAndReasons,
        CombinedLabel::FactsAndReasonsSummary,
        CombinedLabel::ReasonsSummary,
        CombinedLabel::Reasons,
        CombinedLabel::JudgmentFactsAndReasonsSummary,
        CombinedLabel::ClaimAndReasonsSummary,
        CombinedLabel::DisputedIssuesAndReasonsSummary,
        CombinedLabel::Facts,
        CombinedLabel::FactsWithReasons,
    ];

    pub fn phrase(self) -> &'static str {
        match self {
            CombinedLabel::FactsAndReasons => "事實及理由",
            CombinedLabel::FactsAndReasonsSummary => "事實及理由要領",
            CombinedLabel::ReasonsSummary => "理由要領",
            CombinedLabel::Reasons => "理由",
            CombinedLabel::JudgmentFactsAndReasonsSummary => "判決事實及理由要領",
            CombinedLabel::ClaimAndReasonsSummary => "訴訟標的及理由要領",
            CombinedLabel::DisputedIssuesAndReasonsSummary => "爭執事項及理由要領",
            CombinedLabel::Facts => "事實",
            CombinedLabel::FactsWithReasons => "事實與理由",
        }
    }

    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.phrase() == phrase)
    }
}

/// A heading that delimits judgment sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Compound date line closing the reasoning (中華民國…年…月…日)
    Date,
    /// Operative holding (主文)
    Holding,
    /// Factual narrative (事實), four-part layout only
    Facts,
    /// Legal reasoning (理由), four-part layout only
    Reasoning,
    /// Combined facts/reasoning heading of a three-part layout
    Label(CombinedLabel),
}

impl Marker {
    /// Canonical phrase emitted when a document is reconstructed.
    pub fn phrase(self) -> &'static str {
        match self {
            Marker::Date => DATE_PHRASE,
            Marker::Holding => "主文",
            Marker::Facts => "事實",
            Marker::Reasoning => "理由",
            Marker::Label(label) => label.phrase(),
        }
    }

    /// Every marker the segmenter knows about.
    pub fn all() -> impl Iterator<Item = Marker> {
        [Marker::Date, Marker::Holding, Marker::Facts, Marker::Reasoning]
            .into_iter()
            .chain(CombinedLabel::ALL.into_iter().map(Marker::Label))
    }

    /// Compiled line rule for this marker.
    pub fn rule(self) -> &'static LineRule {
        &LINE_RULES[&self]
    }
}

/// Line rules are pure functions of the phrase, so they are compiled once.
static LINE_RULES: Lazy<HashMap<Marker, LineRule>> = Lazy::new(|| {
    Marker::all()
        .map(|marker| {
            let rule = LineRule::build(marker.phrase()).expect("marker phrases are escaped");
            (marker, rule)
        })
        .collect()
});

/// Escape each character of `text` and join them with `gap`.
pub(crate) fn spaced(text: &str, gap: &str) -> String {
    text.chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect::<Vec<_>>()
        .join(gap)
}

/// Anchored whole-line rule for one marker.
#[derive(Debug, Clone)]
pub struct LineRule {
    regex: Regex,
}

impl LineRule {
    /// Build the rule for a marker phrase.
    ///
    /// [`DATE_PHRASE`] selects the compound date rule; any other text is
    /// treated as an ordinary heading.
    pub fn build(marker_text: &str) -> Result<Self, regex::Error> {
        let pattern = if marker_text == DATE_PHRASE {
            format!(
                r"^\s*{}.*?{}.*?{}.*?{}\s*$",
                spaced(ERA_NAME, r"\s*"),
                regex::escape(DATE_UNITS[0]),
                regex::escape(DATE_UNITS[1]),
                regex::escape(DATE_UNITS[2]),
            )
        } else {
            format!(
                r"^\s*{}\s*[{}]?\s*$",
                spaced(marker_text, r"\s*"),
                SEPARATORS
            )
        };
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// True when the trimmed line, in its entirety, is this marker.
    pub fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line.trim())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_heading_matches_whole_line() {
        let rule = Marker::Holding.rule();
        assert!(rule.matches("主文"));
        assert!(rule.matches("    主文   "));
        assert!(!rule.matches("主文如下"));
        assert!(!rule.matches("本件主文"));
    }

    #[test]
    fn plain_heading_tolerates_inner_whitespace() {
        let rule = Marker::Holding.rule();
        assert!(rule.matches("主　　文"));
        assert!(rule.matches("主 \t 文"));
        assert!(Marker::Label(CombinedLabel::FactsAndReasons)
            .rule()
            .matches("事　實　及　理　由"));
    }

    #[test]
    fn plain_heading_accepts_one_trailing_separator() {
        let rule = Marker::Facts.rule();
        assert!(rule.matches("事實："));
        assert!(rule.matches("事實:"));
        assert!(rule.matches("事實︰"));
        assert!(rule.matches("事實 ： "));
        assert!(!rule.matches("事實：："));
        assert!(!rule.matches("事實；"));
    }

    #[test]
    fn labels_do_not_match_their_prefixes() {
        assert!(!Marker::Facts.rule().matches("事實及理由"));
        assert!(!Marker::Label(CombinedLabel::FactsAndReasons)
            .rule()
            .matches("事實及理由要領"));
        assert!(!Marker::Reasoning.rule().matches("理由要領"));
    }

    #[test]
    fn date_rule_needs_units_in_order() {
        let rule = Marker::Date.rule();
        assert!(rule.matches("中華民國112年3月4日"));
        assert!(rule.matches("中　  　華　  　民　　　國　    九十　　年　　　七  　　月　  三十一   日"));
        assert!(!rule.matches("中華民國112年3月"));
        assert!(!rule.matches("中華民國112月3年4日"));
        assert!(!rule.matches("於中華民國112年3月4日"));
        assert!(!rule.matches("中華民國112年3月4日起"));
    }

    #[test]
    fn build_dispatches_on_date_phrase() {
        let date = LineRule::build(DATE_PHRASE).unwrap();
        assert!(date.matches("中華民國一百年一月一日"));
        assert!(!date.matches("中華民國年月日："));
        let plain = LineRule::build("主文").unwrap();
        assert!(plain.matches("主 文："));
    }

    #[test]
    fn label_phrases_round_trip() {
        for label in CombinedLabel::ALL {
            assert_eq!(CombinedLabel::from_phrase(label.phrase()), Some(label));
        }
        assert_eq!(CombinedLabel::from_phrase("主文"), None);
    }

    #[test]
    fn every_marker_has_a_rule() {
        for marker in Marker::all() {
            assert!(marker.rule().as_str().starts_with('^'));
        }
    }
}
