//! The labeling state machine
//!
//! A session owns the point coordinates, the label map, the set of unlabeled
//! indices and the selection cursor. Every operation is a plain method that
//! returns a [`Transition`] describing what moved; drawing the marker and
//! moving the camera is the caller's job.

use crate::pool::UnlabeledPool;
use crate::stats::Statistics;
use cloudlabel_core::{ClassId, Error, LabelMap, Point3f, PointCloud, Result, Rgb};
use rand::Rng;
use std::path::Path;
use tracing::{debug, info};

/// Display color of the selection cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorColor {
    #[default]
    Red,
    Green,
    Blue,
}

impl CursorColor {
    pub fn rgb(self) -> Rgb {
        match self {
            CursorColor::Red => [1.0, 0.0, 0.0],
            CursorColor::Green => [0.0, 1.0, 0.0],
            CursorColor::Blue => [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorOptions {
    pub radius: f32,
    pub color: CursorColor,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            radius: 0.25,
            color: CursorColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The cursor sits on `current`, which is unlabeled
    Selecting { current: usize },
    /// Every point carries a label; only undo leaves this state
    Complete,
}

/// Outcome of a session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cursor moved to `to`; `from` is `None` when leaving `Complete`
    Moved { from: Option<usize>, to: usize },
    /// The last unlabeled point was labeled and the cursor is gone
    Completed { from: usize },
    /// Undo was requested without a recorded label to revert
    NothingToUndo,
    /// Nothing changed
    Unchanged,
}

/// The one label that undo can revert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastAction {
    index: usize,
    class: ClassId,
}

pub struct AnnotationSession<R> {
    points: PointCloud<Point3f>,
    labels: LabelMap,
    unlabeled: UnlabeledPool,
    state: SessionState,
    last_action: Option<LastAction>,
    radius: f32,
    color: CursorColor,
    rng: R,
}

impl<R: Rng> AnnotationSession<R> {
    /// Start a session on `points`, resuming from `labels`.
    ///
    /// The cursor starts on a uniformly random unlabeled point. Fails when the
    /// cloud is empty, when a label addresses a point outside the cloud, or
    /// when every point is already labeled.
    pub fn new(points: PointCloud<Point3f>, labels: LabelMap, cursor: CursorOptions, mut rng: R) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyCloud);
        }
        labels.check_indices(points.len())?;

        let unlabeled = UnlabeledPool::new(points.len(), &labels);
        let current = unlabeled
            .sample(&mut rng)
            .ok_or(Error::FullyLabeled(points.len()))?;

        info!(
            points = points.len(),
            labeled = labels.len(),
            current,
            "annotation session started"
        );

        Ok(Self {
            points,
            labels,
            unlabeled,
            state: SessionState::Selecting { current },
            last_action: None,
            radius: cursor.radius,
            color: cursor.color,
            rng,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Index under the cursor, `None` once every point is labeled
    pub fn current(&self) -> Option<usize> {
        match self.state {
            SessionState::Selecting { current } => Some(current),
            SessionState::Complete => None,
        }
    }

    pub fn current_point(&self) -> Option<Point3f> {
        self.current().map(|index| self.points[index])
    }

    pub fn point(&self, index: usize) -> Option<Point3f> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &PointCloud<Point3f> {
        &self.points
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn into_labels(self) -> LabelMap {
        self.labels
    }

    pub fn unlabeled_count(&self) -> usize {
        self.unlabeled.len()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn color(&self) -> CursorColor {
        self.color
    }

    /// Label the current point and move to another unlabeled one
    pub fn assign_class(&mut self, class: ClassId) -> Transition {
        let SessionState::Selecting { current } = self.state else {
            return Transition::Unchanged;
        };

        self.labels.insert(current, class);
        self.unlabeled.remove(current);
        self.last_action = Some(LastAction { index: current, class });
        debug!(index = current, %class, "point labeled");

        self.advance()
    }

    /// Move to another unlabeled point without labeling this one
    pub fn skip(&mut self) -> Transition {
        if self.state == SessionState::Complete {
            return Transition::Unchanged;
        }
        self.advance()
    }

    /// Revert the most recent label and put the cursor back on that point
    pub fn undo(&mut self) -> Transition {
        let Some(LastAction { index, class }) = self.last_action.take() else {
            return Transition::NothingToUndo;
        };

        self.labels.remove(index);
        self.unlabeled.insert(index);
        let from = self.current();
        self.state = SessionState::Selecting { current: index };
        debug!(index, %class, "label reverted");

        Transition::Moved { from, to: index }
    }

    /// Scale the cursor radius; factors that are not finite and positive are ignored
    pub fn resize_cursor(&mut self, factor: f32) -> Option<f32> {
        if !(factor.is_finite() && factor > 0.0) {
            return None;
        }
        self.radius *= factor;
        Some(self.radius)
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_labels(&self.labels)
    }

    /// Write the labels to `path`, replacing any previous file
    pub fn shutdown<P: AsRef<Path>>(self, path: P) -> Result<LabelMap> {
        cloudlabel_io::write_labels(path, &self.labels)?;
        Ok(self.labels)
    }

    fn advance(&mut self) -> Transition {
        let from = self.current();
        match self.unlabeled.sample(&mut self.rng) {
            Some(to) => {
                self.state = SessionState::Selecting { current: to };
                Transition::Moved { from, to }
            }
            None => {
                self.state = SessionState::Complete;
                info!(points = self.points.len(), "every point is labeled");
                match from {
                    Some(from) => Transition::Completed { from },
                    None => Transition::Unchanged,
                }
            }
        }
    }
}
