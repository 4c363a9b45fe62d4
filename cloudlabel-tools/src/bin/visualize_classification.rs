//! Show a labeled cloud with each class in its own color.

use clap::Parser;
use cloudlabel_tools::{
    label_path, prepare_classification, setup_logging, show_classification, VisualizeClassificationArgs,
};

fn main() -> anyhow::Result<()> {
    let args = VisualizeClassificationArgs::parse();
    setup_logging(args.viewer.verbose)?;

    let data_path = label_path(&args.cloud, args.data_path);
    let classified = prepare_classification(&args.cloud, &data_path, None, args.seed)?;

    let title = format!("classification: {}", args.cloud.display());
    show_classification(classified, args.viewer.viewer_config(&title))
}
