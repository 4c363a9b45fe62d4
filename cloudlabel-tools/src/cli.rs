//! Command line definitions of the binaries and the helpers they share

use anyhow::bail;
use clap::{Args, Parser, ValueEnum};
use cloudlabel_annotate::CursorColor;
use cloudlabel_core::{ClassId, Rgb};
use cloudlabel_io::default_label_path;
use cloudlabel_visualization::{RenderConfig, ViewerConfig};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Display color of points in clouds that carry no colors of their own
pub const DEFAULT_POINT_COLOR: Rgb = [0.5, 0.5, 0.5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CursorColorArg {
    Red,
    Green,
    Blue,
}

impl From<CursorColorArg> for CursorColor {
    fn from(arg: CursorColorArg) -> Self {
        match arg {
            CursorColorArg::Red => CursorColor::Red,
            CursorColorArg::Green => CursorColor::Green,
            CursorColorArg::Blue => CursorColor::Blue,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ViewerArgs {
    /// Diameter of the drawn points in pixels
    #[arg(long = "point_size", default_value_t = 3.0)]
    pub point_size: f32,

    /// Log debug output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ViewerArgs {
    pub fn viewer_config(&self, title: &str) -> ViewerConfig {
        ViewerConfig {
            title: title.to_string(),
            render: RenderConfig {
                point_size: self.point_size,
                ..RenderConfig::default()
            },
            ..ViewerConfig::default()
        }
    }
}

/// Arguments of `classify`
#[derive(Parser, Debug)]
#[command(name = "classify", version, about = "Label point cloud points with class digits 0-9", long_about = None)]
pub struct ClassifyArgs {
    /// Point cloud to label (.ply, .pcd, .xyz, .xyzrgb, .txt or .csv)
    pub cloud: PathBuf,

    /// Radius of the cursor sphere
    #[arg(long, default_value_t = 0.25)]
    pub radius: f32,

    /// Color of the cursor sphere
    #[arg(long, value_enum, ignore_case = true, default_value_t = CursorColorArg::Red)]
    pub color: CursorColorArg,

    /// Label file to resume from and save to (default: <cloud>.json)
    #[arg(long = "output_path")]
    pub output_path: Option<PathBuf>,

    #[command(flatten)]
    pub viewer: ViewerArgs,
}

/// Arguments of `visualize_classification`
#[derive(Parser, Debug)]
#[command(
    name = "visualize_classification",
    version,
    about = "Color a point cloud by its stored labels",
    long_about = None
)]
pub struct VisualizeClassificationArgs {
    /// Labeled point cloud
    pub cloud: PathBuf,

    /// Label file to display (default: <cloud>.json); it must exist
    #[arg(long = "data_path")]
    pub data_path: Option<PathBuf>,

    /// Seed for reproducible class colors
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub viewer: ViewerArgs,
}

/// Arguments of `visualize_classes`
#[derive(Parser, Debug)]
#[command(
    name = "visualize_classes",
    version,
    about = "Color a point cloud by selected classes of its stored labels",
    long_about = None
)]
pub struct VisualizeClassesArgs {
    /// Labeled point cloud
    pub cloud: PathBuf,

    /// Label file to display (default: <cloud>.json); it must exist
    #[arg(long = "data_path")]
    pub data_path: Option<PathBuf>,

    /// Classes to color, e.g. `--classes 1 4` or `--classes 1,4` (default: all)
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub classes: Vec<u8>,

    /// Seed for reproducible class colors
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub viewer: ViewerArgs,
}

/// The explicit label path, or the sidecar next to the cloud
pub fn label_path(cloud: &Path, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| default_label_path(cloud))
}

/// Fail early when the directory that will receive the label file is missing
pub fn ensure_label_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            bail!(
                "Cannot save labels to {}: directory {} does not exist",
                path.display(),
                dir.display()
            )
        }
        _ => Ok(()),
    }
}

/// Class filter from `--classes`; an empty list means every class
pub fn class_filter(classes: &[u8]) -> Option<BTreeSet<ClassId>> {
    if classes.is_empty() {
        return None;
    }
    Some(classes.iter().filter_map(|&value| ClassId::new(value)).collect())
}
