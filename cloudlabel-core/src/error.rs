//! Error types for cloudlabel

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cloudlabel operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Point cloud is empty")]
    EmptyCloud,

    #[error("Every one of the {0} points is already labeled")]
    FullyLabeled(usize),

    #[error("Label file not found: {}", .0.display())]
    LabelFileNotFound(PathBuf),

    #[error("Malformed label file {}: {message}", .path.display())]
    MalformedLabels { path: PathBuf, message: String },

    #[error("Labeled point index {index} is out of range for a cloud of {len} points")]
    LabelOutOfRange { index: usize, len: usize },

    #[error("Class id {0} is outside 0..=9")]
    InvalidClass(u64),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for cloudlabel operations
pub type Result<T> = std::result::Result<T, Error>;
