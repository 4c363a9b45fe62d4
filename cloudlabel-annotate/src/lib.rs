//! Labeling logic for cloudlabel
//!
//! Everything here is independent of rendering:
//! - [`AnnotationSession`]: the labeling state machine (cursor, label map, one-step undo)
//! - [`Command`]: key to command mapping for the labeling window
//! - [`Statistics`]: per-class label counts
//! - [`ClassPalette`] and [`classify_colors`]: coloring a cloud by its labels
//!
//! The viewer integration calls the session's transition methods and then
//! applies the returned [`Transition`] to the marker and camera.

pub mod command;
pub mod pool;
pub mod session;
pub mod stats;
pub mod palette;
pub mod classify;

pub use command::{Command, HELP_MESSAGE};
pub use pool::UnlabeledPool;
pub use session::{AnnotationSession, CursorColor, CursorOptions, SessionState, Transition};
pub use stats::Statistics;
pub use palette::ClassPalette;
pub use classify::{classify_colors, Classification};
