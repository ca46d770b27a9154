//! First-occurrence line positions of markers

use super::markers::Marker;
use std::collections::HashMap;

/// Marker → index of the first line that fully matches the marker's rule.
///
/// Markers that never match are absent. Later matches of a marker that was
/// already found are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    positions: HashMap<Marker, usize>,
}

impl PositionMap {
    pub fn get(&self, marker: Marker) -> Option<usize> {
        self.positions.get(&marker).copied()
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.positions.contains_key(&marker)
    }

    /// Line indices for `markers`, in the given order, or `None` if any is absent.
    pub fn indices_of(&self, markers: &[Marker]) -> Option<Vec<usize>> {
        markers.iter().map(|&marker| self.get(marker)).collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Scan `lines` once per marker and record where each marker first appears.
pub fn locate(lines: &[&str], markers: &[Marker]) -> PositionMap {
    let positions = markers
        .iter()
        .filter_map(|&marker| {
            let rule = marker.rule();
            lines
                .iter()
                .position(|line| rule.matches(line))
                .map(|index| (marker, index))
        })
        .collect();
    PositionMap { positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::markers::CombinedLabel;

    #[test]
    fn records_first_match_only() {
        let lines = ["前言", "主文", "內容", "  主 文 ", "理由"];
        let map = locate(&lines, &[Marker::Holding, Marker::Reasoning]);
        assert_eq!(map.get(Marker::Holding), Some(1));
        assert_eq!(map.get(Marker::Reasoning), Some(4));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn absent_markers_are_missing_not_errors() {
        let lines = ["主文", "事實及理由"];
        let map = locate(&lines, &[Marker::Holding, Marker::Date, Marker::Facts]);
        assert!(map.contains(Marker::Holding));
        assert!(!map.contains(Marker::Date));
        assert!(!map.contains(Marker::Facts));
        assert_eq!(map.indices_of(&[Marker::Holding, Marker::Date]), None);
    }

    #[test]
    fn substring_occurrences_do_not_count() {
        let lines = ["本件事實及理由如下", "事實及理由："];
        let label = Marker::Label(CombinedLabel::FactsAndReasons);
        let map = locate(&lines, &[label]);
        assert_eq!(map.get(label), Some(1));
    }

    #[test]
    fn empty_document_yields_empty_map() {
        let map = locate(&[], &[Marker::Holding]);
        assert!(map.is_empty());
    }
}
