//! I/O operations for cloudlabel
//!
//! This crate reads point clouds (PLY, PCD and XYZ/CSV text) together with
//! their optional per-point colors, and reads and writes the JSON label
//! sidecar file.

pub mod ply;
pub mod pcd;
pub mod xyz;
pub mod labels;

pub use labels::{default_label_path, read_labels, read_labels_or_default, write_labels};

use cloudlabel_core::{Error, LoadedCloud, Result};
use std::path::Path;
use tracing::info;

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<LoadedCloud>;
}

/// Auto-detect format from the file extension and read a point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<LoadedCloud> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    let cloud = match extension.as_deref() {
        Some("ply") => ply::PlyReader::read_point_cloud(path)?,
        Some("pcd") => pcd::PcdReader::read_point_cloud(path)?,
        Some("xyz") | Some("xyzrgb") | Some("txt") | Some("csv") => {
            xyz::XyzReader::read_point_cloud(path)?
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "Unsupported point cloud format: {:?}",
                path.extension()
            )))
        }
    };

    info!(
        path = %path.display(),
        points = cloud.len(),
        colors = cloud.has_colors(),
        "point cloud loaded"
    );
    Ok(cloud)
}
