//! Glue between the labeling session and the viewer window

use cloudlabel_annotate::{AnnotationSession, Command, Transition};
use cloudlabel_core::{Point3f, TriangleMesh};
use cloudlabel_visualization::{KeyHandler, ViewControl};
use rand::Rng;
use tracing::debug;

const CURSOR_STACKS: usize = 16;
const CURSOR_SLICES: usize = 24;

/// Drives an [`AnnotationSession`] from key presses and keeps the cursor
/// sphere and camera in step with it
pub struct Annotator<R> {
    session: AnnotationSession<R>,
    /// Where the cursor sphere is centered right now
    marker_center: Point3f,
}

impl<R: Rng> Annotator<R> {
    pub fn new(session: AnnotationSession<R>) -> Self {
        let marker_center = session.current_point().unwrap_or_else(Point3f::origin);
        Self { session, marker_center }
    }

    /// The cursor sphere for the current point, sized and colored from the session
    pub fn cursor_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::uv_sphere(self.session.radius(), CURSOR_STACKS, CURSOR_SLICES);
        mesh.paint_uniform_color(self.session.color().rgb());
        mesh.translate(&self.marker_center.coords);
        mesh
    }

    pub fn session(&self) -> &AnnotationSession<R> {
        &self.session
    }

    pub fn into_session(self) -> AnnotationSession<R> {
        self.session
    }

    /// Run one command against the session and mirror the outcome in the view.
    ///
    /// Returns whether the view changed.
    pub fn apply(&mut self, command: Command, view: &mut dyn ViewControl) -> bool {
        match command {
            Command::Assign(class) => {
                if self.report_if_complete() {
                    return false;
                }
                let transition = self.session.assign_class(class);
                self.follow(transition, view)
            }
            Command::Skip => {
                if self.report_if_complete() {
                    return false;
                }
                let transition = self.session.skip();
                self.follow(transition, view)
            }
            Command::Undo => {
                let transition = self.session.undo();
                if transition == Transition::NothingToUndo {
                    println!("Nothing to undo");
                    return false;
                }
                self.follow(transition, view)
            }
            Command::Resize(factor) => {
                if self.session.resize_cursor(factor).is_none() {
                    return false;
                }
                match view.marker_mut() {
                    Some(marker) => {
                        marker.scale_about(factor, &self.marker_center);
                        true
                    }
                    None => false,
                }
            }
            Command::Center => match self.session.current_point() {
                Some(point) => {
                    view.look_at(point);
                    true
                }
                None => false,
            },
            Command::Statistics => {
                println!("{}", self.session.statistics());
                false
            }
        }
    }

    fn follow(&mut self, transition: Transition, view: &mut dyn ViewControl) -> bool {
        match transition {
            Transition::Moved { to, .. } => {
                let Some(point) = self.session.point(to) else {
                    return false;
                };
                if let Some(marker) = view.marker_mut() {
                    marker.translate(&(point - self.marker_center));
                }
                self.marker_center = point;
                view.set_marker_visible(true);
                view.look_at(point);
                debug!(index = to, "cursor moved");
                true
            }
            Transition::Completed { .. } => {
                view.set_marker_visible(false);
                println!("Every point is labeled. Press Q to save and quit, or U to undo the last label.");
                true
            }
            Transition::NothingToUndo | Transition::Unchanged => false,
        }
    }

    fn report_if_complete(&self) -> bool {
        if self.session.is_complete() {
            println!("Every point is labeled; nothing left to select.");
        }
        self.session.is_complete()
    }
}

impl<R: Rng> KeyHandler for Annotator<R> {
    fn handle_key(&mut self, key: char, view: &mut dyn ViewControl) -> bool {
        match Command::from_key(key) {
            Some(command) => self.apply(command, view),
            None => false,
        }
    }
}
