//! Label the points of a cloud one at a time.
//!
//! A random unlabeled point is highlighted by a sphere; pressing a digit
//! records that class for it and moves on. Labels are saved on quit.

use anyhow::Context;
use clap::Parser;
use cloudlabel_annotate::{AnnotationSession, CursorOptions, HELP_MESSAGE};
use cloudlabel_io::{read_labels_or_default, read_point_cloud};
use cloudlabel_tools::cli::DEFAULT_POINT_COLOR;
use cloudlabel_tools::{ensure_label_dir, label_path, setup_logging, Annotator, ClassifyArgs};
use cloudlabel_visualization::{Scene, Viewer};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = ClassifyArgs::parse();
    setup_logging(args.viewer.verbose)?;

    let output_path = label_path(&args.cloud, args.output_path);
    ensure_label_dir(&output_path)?;
    let cloud = read_point_cloud(&args.cloud)
        .with_context(|| format!("Failed to load point cloud {}", args.cloud.display()))?;
    let labels = read_labels_or_default(&output_path)?;

    let cursor = CursorOptions {
        radius: args.radius,
        color: args.color.into(),
    };
    let colors = cloud.colors_or(DEFAULT_POINT_COLOR);
    let session = AnnotationSession::new(cloud.points, labels, cursor, rand::thread_rng())
        .with_context(|| format!("Cannot label {}", args.cloud.display()))?;

    println!("{}", HELP_MESSAGE);

    let annotator = Annotator::new(session);
    let scene = Scene::new(annotator.session().points().points.clone(), colors)?.with_marker(annotator.cursor_mesh());
    let title = format!("classify: {}", args.cloud.display());

    let annotator = Viewer::new(args.viewer.viewer_config(&title)).run(scene, annotator)?;

    let labels = annotator
        .into_session()
        .shutdown(&output_path)
        .with_context(|| format!("Failed to save labels to {}", output_path.display()))?;
    info!(labels = labels.len(), path = %output_path.display(), "session saved");
    println!("Saved {} labels to {}", labels.len(), output_path.display());
    Ok(())
}
