//! Shared pieces of the cloudlabel command line tools
//!
//! - `classify`: label points one at a time
//! - `visualize_classification`: show every stored label in its class color
//! - `visualize_classes`: the same, restricted to chosen classes

pub mod annotator;
pub mod classification;
pub mod cli;
pub mod logging;

pub use annotator::Annotator;
pub use classification::{prepare_classification, show_classification, ClassifiedCloud};
pub use cli::{
    ensure_label_dir, label_path, ClassifyArgs, CursorColorArg, ViewerArgs, VisualizeClassesArgs,
    VisualizeClassificationArgs,
};
pub use logging::setup_logging;
