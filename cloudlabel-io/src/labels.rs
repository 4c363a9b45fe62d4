//! JSON label store
//!
//! The label file is a flat JSON object mapping decimal point indices to class
//! ids, e.g. `{"5": 2, "9": 7}`. It is read once at startup and replaced as a
//! whole on save.

use cloudlabel_core::{Error, LabelMap, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Label file used when none is given: the cloud path with `.json` appended
pub fn default_label_path<P: AsRef<Path>>(cloud_path: P) -> PathBuf {
    let mut path = cloud_path.as_ref().as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}

/// Read a label file that must exist
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<LabelMap> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::LabelFileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let labels: LabelMap = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        Error::MalformedLabels {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    info!(path = %path.display(), labels = labels.len(), "labels loaded");
    Ok(labels)
}

/// Read a label file, starting from an empty map when it does not exist yet
pub fn read_labels_or_default<P: AsRef<Path>>(path: P) -> Result<LabelMap> {
    match read_labels(&path) {
        Err(Error::LabelFileNotFound(path)) => {
            info!(path = %path.display(), "no label file yet, starting a new label set");
            Ok(LabelMap::new())
        }
        other => other,
    }
}

/// Replace the label file at `path` with `labels`.
///
/// The JSON is written to a temporary file next to `path` and renamed over it,
/// so an interrupted save leaves the previous file intact.
pub fn write_labels<P: AsRef<Path>>(path: P, labels: &LabelMap) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer(&mut writer, labels).map_err(std::io::Error::from)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    debug!(temp = %file.path().display(), "label file staged");

    file.persist(path).map_err(|e| Error::Io(e.error))?;
    info!(path = %path.display(), labels = labels.len(), "labels written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlabel_core::ClassId;
    use std::fs;

    fn labels(pairs: &[(usize, u8)]) -> LabelMap {
        pairs
            .iter()
            .map(|&(i, c)| (i, ClassId::new(c).unwrap()))
            .collect()
    }

    #[test]
    fn test_default_label_path() {
        assert_eq!(default_label_path("scans/room.ply"), PathBuf::from("scans/room.ply.json"));
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply.json");

        let original = labels(&[(0, 0), (3, 9), (17, 4), (1024, 2)]);
        write_labels(&path, &original).unwrap();
        assert_eq!(read_labels(&path).unwrap(), original);
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");

        write_labels(&path, &labels(&[(9, 7), (5, 2)])).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"5": 2, "9": 7}));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, r#"{"1": 1, "2": 2, "3": 3}"#).unwrap();

        write_labels(&path, &labels(&[(4, 4)])).unwrap();
        assert_eq!(read_labels(&path).unwrap(), labels(&[(4, 4)]));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(matches!(read_labels(&path), Err(Error::LabelFileNotFound(_))));
        assert!(read_labels_or_default(&path).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        for content in [
            r#"{"1": 12}"#,
            r#"{"one": 1}"#,
            r#"{"1": "2"}"#,
            r#"{"1": {"class": 2}}"#,
            "not json",
        ] {
            fs::write(&path, content).unwrap();
            assert!(
                matches!(read_labels(&path), Err(Error::MalformedLabels { .. })),
                "expected {:?} to be rejected",
                content
            );
            // A malformed file is never mistaken for a missing one
            assert!(read_labels_or_default(&path).is_err());
        }
    }
}
