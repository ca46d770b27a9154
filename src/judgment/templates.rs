//! Section layout templates and priority-ordered selection
//!
//! A template is an ordered set of markers describing one accepted layout of a
//! judgment. Selection walks [`Template::PRIORITY`] in declaration order and
//! returns the first template whose markers are all present with strictly
//! increasing line positions:
//!
//! 1. four-part: 主文 → 事實 → 理由 → date (always tried first)
//! 2. three-part, one per [`CombinedLabel`]: 主文 → label → date
//!
//! The four-part layout wins whenever it validates, even if a three-part layout
//! built from one of its headings would validate as well.

use super::locator::{locate, PositionMap};
use super::markers::{CombinedLabel, Marker};

/// One accepted section layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Separate facts and reasoning sections
    FourPart,
    /// Facts and reasoning under a single combined heading
    ThreePart(CombinedLabel),
}

impl Template {
    /// Templates in the order they are tried.
    pub const PRIORITY: [Template; 10] = [
        Template::FourPart,
        Template::ThreePart(CombinedLabel::FactsAndReasons),
        Template::ThreePart(CombinedLabel::FactsAndReasonsSummary),
        Template::ThreePart(CombinedLabel::ReasonsSummary),
        Template::ThreePart(CombinedLabel::Reasons),
        Template::ThreePart(CombinedLabel::JudgmentFactsAndReasonsSummary),
        Template::ThreePart(CombinedLabel::ClaimAndReasonsSummary),
        Template::ThreePart(CombinedLabel::DisputedIssuesAndReasonsSummary),
        Template::ThreePart(CombinedLabel::Facts),
        Template::ThreePart(CombinedLabel::FactsWithReasons),
    ];

    /// Markers in declared order: date, holding, then the body headings.
    pub fn markers(self) -> Vec<Marker> {
        match self {
            Template::FourPart => vec![
                Marker::Date,
                Marker::Holding,
                Marker::Facts,
                Marker::Reasoning,
            ],
            Template::ThreePart(label) => vec![Marker::Date, Marker::Holding, Marker::Label(label)],
        }
    }

    /// Markers in the order their lines must appear in a document.
    pub fn document_order(self) -> Vec<Marker> {
        match self {
            Template::FourPart => vec![
                Marker::Holding,
                Marker::Facts,
                Marker::Reasoning,
                Marker::Date,
            ],
            Template::ThreePart(label) => vec![Marker::Holding, Marker::Label(label), Marker::Date],
        }
    }

    /// Heading that follows the operative holding.
    pub fn secondary(self) -> Marker {
        match self {
            Template::FourPart => Marker::Facts,
            Template::ThreePart(label) => Marker::Label(label),
        }
    }

    pub fn is_four_part(self) -> bool {
        matches!(self, Template::FourPart)
    }

    /// Marker phrases in declared order, as stored in serialized results.
    pub fn phrases(self) -> Vec<&'static str> {
        self.markers().into_iter().map(Marker::phrase).collect()
    }

    /// Inverse of [`Template::phrases`].
    pub fn from_phrases<S: AsRef<str>>(phrases: &[S]) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|template| {
            let expected = template.phrases();
            expected.len() == phrases.len()
                && expected
                    .iter()
                    .zip(phrases)
                    .all(|(want, got)| *want == AsRef::<str>::as_ref(got))
        })
    }

    /// Locate this template's markers and validate their ordering.
    pub fn try_match(self, lines: &[&str]) -> Option<Selection> {
        let order = self.document_order();
        let positions = locate(lines, &order);
        let indices = positions.indices_of(&order)?;
        indices
            .windows(2)
            .all(|pair| pair[0] < pair[1])
            .then_some(Selection {
                template: self,
                positions,
            })
    }
}

/// A template that validated against a document, with its marker positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub template: Template,
    pub positions: PositionMap,
}

/// Pick the first template in priority order that fully matches `lines`.
///
/// `None` means no layout validated.
pub fn select(lines: &[&str]) -> Option<Selection> {
    Template::PRIORITY
        .into_iter()
        .find_map(|template| template.try_match(lines))
}
