//! Interactive point cloud window
//!
//! The viewer owns the window, the camera and the mouse controls. Anything
//! application specific reaches it through two seams: a [`KeyHandler`] gets
//! every character key the viewer does not reserve, and it acts on the scene
//! through the [`ViewControl`] it is handed.

use crate::camera::Camera;
use crate::renderer::{mesh_vertices, point_sprite_vertices, PointCloudRenderer, RenderConfig};
use cloudlabel_core::{Drawable, Error, Point3f, Result, Rgb, TriangleMesh};
use std::sync::Arc;
use tracing::{debug, error, info};
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

/// Radians of orbit per pixel of mouse drag
const ORBIT_SPEED: f32 = 0.005;
/// Fraction of the camera distance panned per pixel of drag
const PAN_SPEED: f32 = 0.001;
const ZOOM_PER_LINE: f32 = 0.1;

/// What the viewer draws: colored points plus an optional marker mesh
#[derive(Debug, Clone)]
pub struct Scene {
    points: Vec<Point3f>,
    colors: Vec<Rgb>,
    marker: Option<TriangleMesh>,
    marker_visible: bool,
}

impl Scene {
    /// Fails on an empty cloud or when `colors` does not match `points`
    pub fn new(points: Vec<Point3f>, colors: Vec<Rgb>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyCloud);
        }
        if colors.len() != points.len() {
            return Err(Error::InvalidData(format!(
                "{} colors for {} points",
                colors.len(),
                points.len()
            )));
        }
        Ok(Self {
            points,
            colors,
            marker: None,
            marker_visible: false,
        })
    }

    pub fn with_marker(mut self, marker: TriangleMesh) -> Self {
        self.marker = Some(marker);
        self.marker_visible = true;
        self
    }

    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn marker(&self) -> Option<&TriangleMesh> {
        self.marker.as_ref()
    }

    pub fn marker_visible(&self) -> bool {
        self.marker_visible && self.marker.is_some()
    }
}

/// Scene and camera operations available to a [`KeyHandler`]
pub trait ViewControl {
    /// Point the camera at `target` without changing the viewing direction
    fn look_at(&mut self, target: Point3f);

    /// Mutable access to the marker mesh; edits show on the next frame
    fn marker_mut(&mut self) -> Option<&mut TriangleMesh>;

    fn set_marker_visible(&mut self, visible: bool);
}

/// Application keyboard handling
pub trait KeyHandler {
    /// Handle a key press. Returns `true` when the view changed and needs a redraw.
    fn handle_key(&mut self, key: char, view: &mut dyn ViewControl) -> bool;
}

/// Handler for viewers that only need the built-in controls
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeys;

impl KeyHandler for NoKeys {
    fn handle_key(&mut self, _key: char, _view: &mut dyn ViewControl) -> bool {
        false
    }
}

/// Window configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "cloudlabel".to_string(),
            width: 1280,
            height: 800,
            render: RenderConfig::default(),
        }
    }
}

/// Scene plus camera, with a flag for marker geometry that needs re-uploading
struct ViewState {
    scene: Scene,
    camera: Camera,
    overlay_dirty: bool,
}

impl ViewState {
    fn overlay_vertices(&self) -> Vec<crate::renderer::PointVertex> {
        match &self.scene.marker {
            Some(marker) if self.scene.marker_visible => mesh_vertices(marker),
            _ => Vec::new(),
        }
    }
}

impl ViewControl for ViewState {
    fn look_at(&mut self, target: Point3f) {
        self.camera.look_at(target);
    }

    fn marker_mut(&mut self) -> Option<&mut TriangleMesh> {
        self.overlay_dirty = true;
        self.scene.marker.as_mut()
    }

    fn set_marker_visible(&mut self, visible: bool) {
        if self.scene.marker_visible != visible {
            self.scene.marker_visible = visible;
            self.overlay_dirty = true;
        }
    }
}

#[derive(Debug, Default)]
struct MouseState {
    left: bool,
    right: bool,
    last_position: Option<PhysicalPosition<f64>>,
}

/// Interactive 3D viewer
pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Open the window and block until it is closed.
    ///
    /// Q, Escape and closing the window end the loop; R resets the camera when
    /// the handler leaves the view unchanged. The handler is handed back afterwards
    /// so the caller can finish its work, such as saving.
    pub fn run<H: KeyHandler>(self, scene: Scene, mut handler: H) -> Result<H> {
        let event_loop =
            EventLoop::new().map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(self.config.title.as_str())
                .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer = pollster::block_on(PointCloudRenderer::new(window.clone(), self.config.render.clone()))?;
        renderer.set_cloud(&point_sprite_vertices(scene.points(), scene.colors()));

        let mut camera = Camera::default();
        let (min, max) = scene.points().bounding_box();
        camera.fit_to_bounds(&min, &max);
        let size = window.inner_size();
        camera.aspect_ratio = size.width.max(1) as f32 / size.height.max(1) as f32;

        let mut state = ViewState {
            scene,
            camera,
            overlay_dirty: true,
        };
        let mut mouse = MouseState::default();
        let mut failure = None;

        info!(points = state.scene.points().len(), "viewer window opened");

        event_loop
            .run(|event, target| {
                target.set_control_flow(ControlFlow::Wait);

                let Event::WindowEvent { event, .. } = event else {
                    return;
                };

                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        if new_size.height > 0 {
                            state.camera.aspect_ratio = new_size.width as f32 / new_size.height as f32;
                        }
                        window.request_redraw();
                    }
                    WindowEvent::MouseInput { state: button_state, button, .. } => {
                        let pressed = button_state == ElementState::Pressed;
                        match button {
                            MouseButton::Left => mouse.left = pressed,
                            MouseButton::Right => mouse.right = pressed,
                            _ => {}
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if let Some(last) = mouse.last_position {
                            let dx = (position.x - last.x) as f32;
                            let dy = (position.y - last.y) as f32;
                            if mouse.left {
                                state.camera.orbit(dx * ORBIT_SPEED, dy * ORBIT_SPEED);
                                window.request_redraw();
                            } else if mouse.right {
                                state.camera.pan(dx * PAN_SPEED, dy * PAN_SPEED);
                                window.request_redraw();
                            }
                        }
                        mouse.last_position = Some(position);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                        };
                        state.camera.zoom(lines * ZOOM_PER_LINE);
                        window.request_redraw();
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => {
                        let key = match &logical_key {
                            Key::Named(NamedKey::Escape) => {
                                target.exit();
                                return;
                            }
                            Key::Named(NamedKey::Space) => ' ',
                            Key::Character(text) => match text.chars().next() {
                                Some(c) => c,
                                None => return,
                            },
                            _ => return,
                        };

                        if key.eq_ignore_ascii_case(&'q') {
                            target.exit();
                            return;
                        }
                        if handler.handle_key(key, &mut state) {
                            window.request_redraw();
                        } else if key.eq_ignore_ascii_case(&'r') {
                            state.camera.reset();
                            window.request_redraw();
                        } else {
                            debug!(%key, "unbound key");
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if state.overlay_dirty {
                            renderer.set_overlay(&state.overlay_vertices());
                            state.overlay_dirty = false;
                        }
                        renderer.update_camera(state.camera.view_matrix(), state.camera.projection_matrix());
                        if let Err(e) = renderer.render() {
                            error!("render failed: {}", e);
                            failure = Some(e);
                            target.exit();
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        info!("viewer window closed");
        match failure {
            Some(e) => Err(e),
            None => Ok(handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudlabel_core::WHITE;

    fn state_with_marker() -> ViewState {
        let scene = Scene::new(vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)], vec![WHITE; 2])
            .unwrap()
            .with_marker(TriangleMesh::uv_sphere(0.1, 4, 6));
        ViewState {
            scene,
            camera: Camera::default(),
            overlay_dirty: false,
        }
    }

    #[test]
    fn test_scene_validation() {
        assert!(matches!(Scene::new(vec![], vec![]), Err(Error::EmptyCloud)));
        assert!(matches!(
            Scene::new(vec![Point3f::origin()], vec![WHITE; 2]),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_marker_edits_mark_overlay_dirty() {
        let mut state = state_with_marker();
        assert!(state.marker_mut().is_some());
        assert!(state.overlay_dirty);
        assert!(!state.overlay_vertices().is_empty());
    }

    #[test]
    fn test_hidden_marker_draws_nothing() {
        let mut state = state_with_marker();
        state.set_marker_visible(false);
        assert!(state.overlay_dirty);
        assert!(!state.scene.marker_visible());
        assert!(state.overlay_vertices().is_empty());
    }

    #[test]
    fn test_look_at_moves_camera_target() {
        let mut state = state_with_marker();
        state.look_at(Point3f::new(1.0, 0.0, 0.0));
        assert_eq!(state.camera.target, Point3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_keys_consumes_nothing() {
        let mut state = state_with_marker();
        assert!(!NoKeys.handle_key('a', &mut state));
    }
}
