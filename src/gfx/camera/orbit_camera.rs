use cgmath::{InnerSpace, Vector3};

use super::camera_utils::{clamp_pitch, spherical_direction, to_radians, Camera, CameraState};

pub const DEFAULT_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_radius: 2.0,
            max_radius: 80.0,
        }
    }
}

/// Camera circling a look-at target
///
/// The target is the independent variable; position is derived on every
/// update as `target + radius · spherical(pitch, yaw)`. Rotation replaces the
/// current angles rather than adding to them.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: CameraState,
    radius: f32,
    bounds: OrbitCameraBounds,
    world_up: Vector3<f32>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    /// Looks at the origin from [`DEFAULT_RADIUS`] units along +z
    pub fn new() -> Self {
        let mut camera = Self {
            state: CameraState::default(),
            radius: DEFAULT_RADIUS,
            bounds: OrbitCameraBounds::default(),
            world_up: Vector3::unit_y(),
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn set_look_at(&mut self, target: Vector3<f32>) {
        self.state.target = target;
        self.update_camera_vectors();
    }

    /// Moves the target, carrying the camera with it
    pub fn pan(&mut self, offset: Vector3<f32>) {
        self.set_look_at(self.state.target + offset);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.clamp(self.bounds.min_radius, self.bounds.max_radius);
        self.update_camera_vectors();
    }

    pub fn bounds(&self) -> OrbitCameraBounds {
        self.bounds
    }

    /// Updates the camera after changing `radius`, `pitch`, `yaw` or `target`.
    fn update_camera_vectors(&mut self) {
        let s = &mut self.state;
        let offset = spherical_direction(s.pitch, s.yaw);
        s.position = s.target + offset * self.radius;

        // Pitch never reaches the poles, so direction is never parallel to world up.
        s.direction = -offset.normalize();
        s.right = s.direction.cross(self.world_up).normalize();
        s.up = s.right.cross(s.direction).normalize();
    }
}

impl Camera for OrbitCamera {
    fn state(&self) -> &CameraState {
        &self.state
    }

    fn rotate(&mut self, pitch_deg: f32, yaw_deg: f32) {
        self.state.pitch = clamp_pitch(to_radians(pitch_deg));
        self.state.yaw = to_radians(yaw_deg);
        self.update_camera_vectors();
    }

    fn set_fov(&mut self, fov_deg: f32) {
        self.state.fov = fov_deg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_camera_is_initialised() {
        let cam = OrbitCamera::new();
        assert!(cam.has_valid_basis());
        assert_relative_eq!(cam.position().z, DEFAULT_RADIUS);
        assert_relative_eq!(cam.direction().z, -1.0);
    }

    #[test]
    fn test_rotate_replaces_angles() {
        let mut cam = OrbitCamera::new();
        cam.rotate(10.0, 20.0);
        cam.rotate(5.0, 5.0);
        assert_relative_eq!(cam.state().pitch, to_radians(5.0));
        assert_relative_eq!(cam.state().yaw, to_radians(5.0));
    }

    #[test]
    fn test_position_tracks_target_at_radius() {
        let mut cam = OrbitCamera::new();
        cam.rotate(30.0, -60.0);
        cam.set_look_at(Vector3::new(1.0, 2.0, 3.0));
        let distance = (cam.position() - cam.target()).magnitude();
        assert_relative_eq!(distance, DEFAULT_RADIUS, epsilon = 1e-4);

        cam.pan(Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(cam.target().x, 2.0);
    }

    #[test]
    fn test_radius_is_clamped() {
        let mut cam = OrbitCamera::new();
        cam.set_radius(0.5);
        assert_eq!(cam.radius(), 2.0);
        cam.set_radius(500.0);
        assert_eq!(cam.radius(), 80.0);
        let distance = (cam.position() - cam.target()).magnitude();
        assert_relative_eq!(distance, 80.0, epsilon = 1e-3);
    }

    #[test]
    fn test_basis_is_orthonormal_after_rotation() {
        let mut cam = OrbitCamera::new();
        for (p, y) in [(0.0, 0.0), (45.0, 90.0), (-80.0, 200.0), (89.0, -45.0)] {
            cam.rotate(p, y);
            assert!(cam.has_valid_basis(), "pitch {} yaw {}", p, y);
        }
    }
}
