//! Per-class label counts

use cloudlabel_core::{ClassId, LabelMap};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    counts: [usize; ClassId::COUNT],
}

impl Statistics {
    pub fn from_labels(labels: &LabelMap) -> Self {
        labels.iter().map(|(_, class)| class).collect()
    }

    pub fn count(&self, class: ClassId) -> usize {
        self.counts[class.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Classes with at least one label, in ascending class order
    pub fn non_zero(&self) -> impl Iterator<Item = (ClassId, usize)> + '_ {
        ClassId::all()
            .map(|class| (class, self.count(class)))
            .filter(|&(_, count)| count > 0)
    }
}

impl FromIterator<ClassId> for Statistics {
    fn from_iter<I: IntoIterator<Item = ClassId>>(iter: I) -> Self {
        let mut stats = Self::default();
        for class in iter {
            stats.counts[class.index()] += 1;
        }
        stats
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Counts for each class are:")?;
        for (class, count) in self.non_zero() {
            writeln!(f, "    Class {}: {}", class, count)?;
        }
        write!(f, "Total: {}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(value: u8) -> ClassId {
        ClassId::new(value).unwrap()
    }

    #[test]
    fn test_counts_match_labels() {
        let labels: LabelMap = [(0, class(1)), (1, class(2)), (2, class(1)), (7, class(9))]
            .into_iter()
            .collect();
        let stats = Statistics::from_labels(&labels);

        assert_eq!(stats.count(class(1)), 2);
        assert_eq!(stats.count(class(2)), 1);
        assert_eq!(stats.count(class(0)), 0);
        assert_eq!(stats.total(), labels.len());
        assert_eq!(
            stats.non_zero().collect::<Vec<_>>(),
            vec![(class(1), 2), (class(2), 1), (class(9), 1)]
        );
    }

    #[test]
    fn test_report_lists_only_present_classes() {
        let labels: LabelMap = [(4, class(3)), (5, class(3))].into_iter().collect();
        let report = Statistics::from_labels(&labels).to_string();
        assert_eq!(report, "Counts for each class are:\n    Class 3: 2\nTotal: 2");
    }

    #[test]
    fn test_empty_report() {
        let report = Statistics::from_labels(&LabelMap::new()).to_string();
        assert_eq!(report, "Counts for each class are:\nTotal: 0");
    }
}
