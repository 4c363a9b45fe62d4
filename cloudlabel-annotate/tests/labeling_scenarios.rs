//! End-to-end labeling runs against label files on disk

use cloudlabel_annotate::{AnnotationSession, CursorOptions, Statistics, Transition};
use cloudlabel_core::{ClassId, LabelMap, Point3f, PointCloud};
use cloudlabel_io::{default_label_path, read_labels, read_labels_or_default, write_labels};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn class(value: u8) -> ClassId {
    ClassId::new(value).unwrap()
}

fn grid_cloud(n: usize) -> PointCloud<Point3f> {
    (0..n)
        .map(|i| Point3f::new((i % 10) as f32, (i / 10) as f32, 0.0))
        .collect()
}

fn start(n: usize, labels: LabelMap, seed: u64) -> AnnotationSession<StdRng> {
    AnnotationSession::new(grid_cloud(n), labels, CursorOptions::default(), StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn fresh_session_writes_two_labels() {
    let dir = TempDir::new().unwrap();
    let label_path = default_label_path(dir.path().join("scan.xyz"));
    assert!(label_path.ends_with("scan.xyz.json"));

    let labels = read_labels_or_default(&label_path).unwrap();
    assert!(labels.is_empty());

    let mut session = start(100, labels, 11);
    let first = session.current().unwrap();
    session.assign_class(class(3));
    let second = session.current().unwrap();
    session.skip();
    session.assign_class(class(7));
    session.shutdown(&label_path).unwrap();

    let saved = read_labels(&label_path).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.get(first), Some(class(3)));
    assert_eq!(saved.get(second), None);
    assert!(saved.iter().any(|(_, c)| c == class(7)));
}

#[test]
fn resumed_session_keeps_existing_labels() {
    let dir = TempDir::new().unwrap();
    let label_path = dir.path().join("labels.json");
    std::fs::write(&label_path, r#"{"5": 2, "9": 7}"#).unwrap();

    let labels = read_labels(&label_path).unwrap();
    let mut session = start(10, labels, 12);
    let current = session.current().unwrap();
    assert!(current != 5 && current != 9);

    assert_eq!(session.undo(), Transition::NothingToUndo);
    session.assign_class(class(1));
    session.shutdown(&label_path).unwrap();

    let saved = read_labels(&label_path).unwrap();
    assert_eq!(saved.get(5), Some(class(2)));
    assert_eq!(saved.get(9), Some(class(7)));
    assert_eq!(saved.get(current), Some(class(1)));
    assert_eq!(saved.len(), 3);
}

#[test]
fn undo_on_empty_history_writes_empty_map() {
    let dir = TempDir::new().unwrap();
    let label_path = dir.path().join("labels.json");

    let mut session = start(10, LabelMap::new(), 13);
    assert_eq!(session.undo(), Transition::NothingToUndo);
    session.shutdown(&label_path).unwrap();

    assert_eq!(std::fs::read_to_string(&label_path).unwrap().trim(), "{}");
}

#[test]
fn labeling_everything_then_resuming_is_refused() {
    let dir = TempDir::new().unwrap();
    let label_path = dir.path().join("labels.json");

    let mut session = start(5, LabelMap::new(), 14);
    for value in 0..5 {
        session.assign_class(class(value));
    }
    assert!(session.is_complete());
    let labels = session.shutdown(&label_path).unwrap();
    assert_eq!(Statistics::from_labels(&labels).total(), 5);

    let reloaded = read_labels(&label_path).unwrap();
    let result = AnnotationSession::new(grid_cloud(5), reloaded, CursorOptions::default(), StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(cloudlabel_core::Error::FullyLabeled(5))));
}

#[test]
fn saved_file_round_trips_through_new_session() {
    let dir = TempDir::new().unwrap();
    let label_path = dir.path().join("labels.json");

    let mut session = start(40, LabelMap::new(), 15);
    for value in [1, 1, 4, 9] {
        session.assign_class(class(value));
    }
    let labels = session.shutdown(&label_path).unwrap();

    let resumed = start(40, read_labels(&label_path).unwrap(), 16);
    assert_eq!(resumed.labels(), &labels);
    assert_eq!(resumed.unlabeled_count(), 36);

    write_labels(&label_path, resumed.labels()).unwrap();
    assert_eq!(read_labels(&label_path).unwrap(), labels);
}
