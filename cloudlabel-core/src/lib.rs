//! Core data structures for cloudlabel
//!
//! This crate provides the fundamental types shared by the labeling and
//! inspection tools: points, point clouds, the cursor mesh, transforms,
//! class ids and the label map.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod label;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use label::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
