//! Coloring a cloud by its labels

use crate::palette::ClassPalette;
use crate::stats::Statistics;
use cloudlabel_core::{ClassId, LabelMap, Result, Rgb, BLACK};
use std::collections::BTreeSet;

/// Per-point display colors plus what ended up visible
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub colors: Vec<Rgb>,
    /// Classes that colored at least one point
    pub shown: BTreeSet<ClassId>,
    /// Counts of the colored points per class
    pub counts: Statistics,
}

/// Color every point black, then paint each labeled point with its class color.
///
/// With a `filter`, only labels whose class is in the filter are painted.
/// Fails if a labeled index does not address a point of the cloud.
pub fn classify_colors(
    point_count: usize,
    labels: &LabelMap,
    palette: &ClassPalette,
    filter: Option<&BTreeSet<ClassId>>,
) -> Result<Classification> {
    labels.check_indices(point_count)?;

    let mut colors = vec![BLACK; point_count];
    let mut shown = BTreeSet::new();
    let mut painted = Vec::new();

    for (index, class) in labels.iter() {
        if filter.is_some_and(|classes| !classes.contains(&class)) {
            continue;
        }
        colors[index] = palette.color(class);
        shown.insert(class);
        painted.push(class);
    }

    Ok(Classification {
        colors,
        shown,
        counts: painted.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlabel_core::Error;

    fn class(value: u8) -> ClassId {
        ClassId::new(value).unwrap()
    }

    fn palette() -> ClassPalette {
        let mut colors = [[0.0; 3]; ClassId::COUNT];
        for (i, color) in colors.iter_mut().enumerate() {
            *color = [0.1 * (i + 1) as f32, 0.5, 0.5];
        }
        ClassPalette::from_colors(colors)
    }

    fn sample_labels() -> LabelMap {
        [(0, class(1)), (1, class(2)), (2, class(1))].into_iter().collect()
    }

    #[test]
    fn test_unfiltered() {
        let result = classify_colors(4, &sample_labels(), &palette(), None).unwrap();
        assert_eq!(result.colors[0], palette().color(class(1)));
        assert_eq!(result.colors[1], palette().color(class(2)));
        assert_eq!(result.colors[3], BLACK);
        assert_eq!(result.shown, BTreeSet::from([class(1), class(2)]));
        assert_eq!(result.counts.total(), 3);
    }

    #[test]
    fn test_filter_single_class() {
        let filter = BTreeSet::from([class(1)]);
        let result = classify_colors(3, &sample_labels(), &palette(), Some(&filter)).unwrap();

        let colored: Vec<usize> = (0..3).filter(|&i| result.colors[i] != BLACK).collect();
        assert_eq!(colored, vec![0, 2]);
        assert_eq!(result.shown, BTreeSet::from([class(1)]));
        assert_eq!(result.counts.count(class(1)), 2);
        assert_eq!(result.counts.count(class(2)), 0);
    }

    #[test]
    fn test_filter_for_absent_class_shows_nothing() {
        let filter = BTreeSet::from([class(7)]);
        let result = classify_colors(3, &sample_labels(), &palette(), Some(&filter)).unwrap();
        assert!(result.colors.iter().all(|&c| c == BLACK));
        assert!(result.shown.is_empty());
    }

    #[test]
    fn test_index_out_of_range() {
        let labels: LabelMap = [(10, class(0))].into_iter().collect();
        let result = classify_colors(10, &labels, &palette(), None);
        assert!(matches!(result, Err(Error::LabelOutOfRange { index: 10, len: 10 })));
    }
}
