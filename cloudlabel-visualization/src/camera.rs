//! Orbit camera for the point cloud viewer

use cloudlabel_core::Point3f;
use nalgebra::{Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector3};

/// Closest the camera may get to its target
const MIN_DISTANCE: f32 = 1e-3;
/// Keeps the orbit away from the poles so the up vector stays usable
const MAX_PITCH_COS: f32 = 0.995;

/// A 3D camera orbiting a target point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    home: (Point3<f32>, Point3<f32>),
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            home: (position, target),
        }
    }

    /// Frame the box `min..max` and make that framing the reset view
    pub fn fit_to_bounds(&mut self, min: &Point3f, max: &Point3f) {
        let center = nalgebra::center(min, max);
        let radius = ((max - min).norm() * 0.5).max(MIN_DISTANCE);
        let distance = radius / (self.fov * 0.5).tan() * 1.2;

        self.target = center;
        self.position = center + Vector3::z() * distance;
        self.near = (distance * 1e-3).max(1e-4);
        self.far = distance + radius * 4.0;
        self.home = (self.position, self.target);
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Center the view on `target`, keeping the current viewing offset
    pub fn look_at(&mut self, target: Point3f) {
        let offset = self.position - self.target;
        self.target = target;
        self.position = target + offset;
    }

    /// Rotate the camera around the target by yaw and pitch angles in radians
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let up = Unit::new_normalize(self.up);
        let mut offset = UnitQuaternion::from_axis_angle(&up, -yaw) * (self.position - self.target);

        let right = offset.cross(&up);
        if right.norm() > f32::EPSILON {
            let rotation = UnitQuaternion::from_axis_angle(&Unit::new_normalize(right), -pitch);
            let pitched = rotation * offset;
            if pitched.normalize().dot(&up).abs() < MAX_PITCH_COS {
                offset = pitched;
            }
        }

        self.position = self.target + offset;
    }

    /// Slide camera and target across the view plane.
    ///
    /// `dx` and `dy` are fractions of the distance to the target.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up);
        if right.norm() <= f32::EPSILON {
            return;
        }
        let right = right.normalize();
        let screen_up = right.cross(&forward);

        let shift = (screen_up * dy - right * dx) * self.distance();
        self.position += shift;
        self.target += shift;
    }

    /// Move toward the target; positive amounts zoom in
    pub fn zoom(&mut self, amount: f32) {
        let factor = (1.0 - amount).clamp(0.1, 10.0);
        let offset = (self.position - self.target) * factor;
        if offset.norm() >= MIN_DISTANCE {
            self.position = self.target + offset;
        }
    }

    /// Return to the view set by construction or the last [`Camera::fit_to_bounds`]
    pub fn reset(&mut self) {
        (self.position, self.target) = self.home;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = Camera::default();
        let before = camera.distance();
        camera.orbit(0.7, 0.3);
        assert_relative_eq!(camera.distance(), before, epsilon = 1e-4);
        assert_eq!(camera.target, Point3::origin());
        assert!((camera.position - Point3::new(0.0, 0.0, 5.0)).norm() > 0.1);
    }

    #[test]
    fn test_orbit_stops_short_of_the_pole() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.orbit(0.0, 0.2);
        }
        let direction = (camera.position - camera.target).normalize();
        assert!(direction.dot(&camera.up).abs() < MAX_PITCH_COS);
    }

    #[test]
    fn test_look_at_keeps_offset() {
        let mut camera = Camera::default();
        camera.orbit(0.4, 0.1);
        let offset = camera.position - camera.target;

        camera.look_at(Point3::new(2.0, -1.0, 3.0));
        assert_eq!(camera.target, Point3::new(2.0, -1.0, 3.0));
        assert_relative_eq!(camera.position - camera.target, offset, epsilon = 1e-5);
    }

    #[test]
    fn test_pan_moves_both_ends() {
        let mut camera = Camera::default();
        camera.pan(0.1, 0.0);
        assert_relative_eq!(camera.distance(), 5.0, epsilon = 1e-5);
        assert_relative_eq!(camera.target.x, -0.5, epsilon = 1e-5);
        assert_relative_eq!(camera.position.x, -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_and_reset() {
        let mut camera = Camera::default();
        camera.zoom(0.5);
        assert_relative_eq!(camera.distance(), 2.5, epsilon = 1e-5);
        camera.zoom(-0.5);
        assert_relative_eq!(camera.distance(), 3.75, epsilon = 1e-5);

        camera.look_at(Point3::new(1.0, 1.0, 1.0));
        camera.reset();
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut camera = Camera::default();
        camera.fit_to_bounds(&Point3::new(-1.0, -1.0, -1.0), &Point3::new(3.0, 1.0, 1.0));
        assert_eq!(camera.target, Point3::new(1.0, 0.0, 0.0));
        assert!(camera.distance() > 2.0);
        assert!(camera.far > camera.distance());

        camera.orbit(1.0, 0.0);
        camera.reset();
        assert_eq!(camera.target, Point3::new(1.0, 0.0, 0.0));
    }
}
