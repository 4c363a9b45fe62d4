//! Visualization and rendering for labeled point clouds
//!
//! Real-time display of point clouds using wgpu and winit:
//! - Interactive viewer with orbit, pan and zoom
//! - Point sprite rendering with per-point colors
//! - A marker mesh overlay, driven through [`ViewControl`]

pub mod camera;
pub mod device;
pub mod renderer;
pub mod viewer;

pub use camera::*;
pub use device::GpuContext;
pub use renderer::*;
pub use viewer::*;

use cloudlabel_core::{Point3f, Result, Rgb};

/// Show colored points in an interactive viewer and block until it closes
pub fn show_point_cloud(points: Vec<Point3f>, colors: Vec<Rgb>, config: ViewerConfig) -> Result<()> {
    let scene = Scene::new(points, colors)?;
    Viewer::new(config).run(scene, NoKeys)?;
    Ok(())
}
