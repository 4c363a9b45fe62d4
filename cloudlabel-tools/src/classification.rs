//! The label inspection run shared by both visualizers

use anyhow::Context;
use cloudlabel_annotate::{classify_colors, ClassPalette, Classification};
use cloudlabel_core::{ClassId, Point3f};
use cloudlabel_io::{read_labels, read_point_cloud};
use cloudlabel_visualization::{show_point_cloud, ViewerConfig};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;

/// A cloud recolored by its labels, ready for display
#[derive(Debug)]
pub struct ClassifiedCloud {
    pub points: Vec<Point3f>,
    pub classification: Classification,
}

impl ClassifiedCloud {
    /// Which classes are on screen, followed by the per-class counts
    pub fn report(&self) -> String {
        let mut report = String::new();
        if self.classification.shown.is_empty() {
            report.push_str("No labeled points match the requested classes\n");
        } else {
            let shown: Vec<String> = self.classification.shown.iter().map(ClassId::to_string).collect();
            let _ = writeln!(report, "Showing classes: {}", shown.join(", "));
        }
        let _ = write!(report, "{}", self.classification.counts);
        report
    }
}

/// Load the cloud and its label file and color every point by class.
///
/// The label file must exist. Without a `seed` the palette differs per run.
pub fn prepare_classification(
    cloud_path: &Path,
    data_path: &Path,
    filter: Option<&BTreeSet<ClassId>>,
    seed: Option<u64>,
) -> anyhow::Result<ClassifiedCloud> {
    let cloud = read_point_cloud(cloud_path)
        .with_context(|| format!("Failed to load point cloud {}", cloud_path.display()))?;
    let labels = read_labels(data_path)?;

    let palette = match seed {
        Some(seed) => ClassPalette::seeded(seed),
        None => ClassPalette::random(&mut rand::thread_rng()),
    };
    let classification = classify_colors(cloud.len(), &labels, &palette, filter)
        .with_context(|| format!("Labels in {} do not fit {}", data_path.display(), cloud_path.display()))?;

    Ok(ClassifiedCloud {
        points: cloud.points.points,
        classification,
    })
}

/// Print the report and open the viewer until it is closed
pub fn show_classification(cloud: ClassifiedCloud, config: ViewerConfig) -> anyhow::Result<()> {
    println!("{}", cloud.report());
    show_point_cloud(cloud.points, cloud.classification.colors, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlabel_core::{Error, BLACK};
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, labels: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let cloud_path = dir.path().join("cloud.xyz");
        fs::write(&cloud_path, "0 0 0\n1 0 0\n2 0 0\n3 0 0\n").unwrap();
        let data_path = dir.path().join("cloud.xyz.json");
        fs::write(&data_path, labels).unwrap();
        (cloud_path, data_path)
    }

    #[test]
    fn test_filtered_classes() {
        let dir = TempDir::new().unwrap();
        let (cloud_path, data_path) = write_fixture(&dir, r#"{"0":1,"1":2,"2":1}"#);
        let filter = BTreeSet::from([ClassId::new(1).unwrap()]);

        let cloud = prepare_classification(&cloud_path, &data_path, Some(&filter), Some(7)).unwrap();
        let colors = &cloud.classification.colors;
        assert_ne!(colors[0], BLACK);
        assert_eq!(colors[1], BLACK);
        assert_ne!(colors[2], BLACK);
        assert_eq!(colors[3], BLACK);
        assert_eq!(cloud.classification.shown, filter);
        assert!(cloud.report().starts_with("Showing classes: 1\n"));
    }

    #[test]
    fn test_seeded_palette_is_stable() {
        let dir = TempDir::new().unwrap();
        let (cloud_path, data_path) = write_fixture(&dir, r#"{"3":5}"#);

        let a = prepare_classification(&cloud_path, &data_path, None, Some(11)).unwrap();
        let b = prepare_classification(&cloud_path, &data_path, None, Some(11)).unwrap();
        assert_eq!(a.classification.colors, b.classification.colors);
    }

    #[test]
    fn test_missing_label_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (cloud_path, _) = write_fixture(&dir, "{}");
        let missing = dir.path().join("absent.json");

        let err = prepare_classification(&cloud_path, &missing, None, None).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::LabelFileNotFound(_))));
    }

    #[test]
    fn test_label_beyond_cloud_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (cloud_path, data_path) = write_fixture(&dir, r#"{"4":0}"#);
        assert!(prepare_classification(&cloud_path, &data_path, None, None).is_err());
    }

    #[test]
    fn test_report_without_matches() {
        let dir = TempDir::new().unwrap();
        let (cloud_path, data_path) = write_fixture(&dir, r#"{"0":1}"#);
        let filter = BTreeSet::from([ClassId::new(9).unwrap()]);

        let cloud = prepare_classification(&cloud_path, &data_path, Some(&filter), None).unwrap();
        assert_eq!(
            cloud.report(),
            "No labeled points match the requested classes\nCounts for each class are:\nTotal: 0"
        );
    }
}
