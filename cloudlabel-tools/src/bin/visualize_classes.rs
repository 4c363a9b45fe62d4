//! Show a labeled cloud with only the chosen classes colored.

use clap::Parser;
use cloudlabel_tools::cli::class_filter;
use cloudlabel_tools::{label_path, prepare_classification, setup_logging, show_classification, VisualizeClassesArgs};

fn main() -> anyhow::Result<()> {
    let args = VisualizeClassesArgs::parse();
    setup_logging(args.viewer.verbose)?;

    let data_path = label_path(&args.cloud, args.data_path);
    let filter = class_filter(&args.classes);
    let classified = prepare_classification(&args.cloud, &data_path, filter.as_ref(), args.seed)?;

    let title = format!("classes: {}", args.cloud.display());
    show_classification(classified, args.viewer.viewer_config(&title))
}
