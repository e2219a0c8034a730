use cgmath::{InnerSpace, Vector3};

use super::camera_utils::{clamp_pitch, spherical_direction, to_radians, Camera, CameraState};

/// Free-look camera whose position is set directly
///
/// Rotation accumulates: each call adds to the current pitch and yaw.
#[derive(Debug, Clone)]
pub struct FirstPersonCamera {
    state: CameraState,
    world_up: Vector3<f32>,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FirstPersonCamera {
    /// Creates a camera at the origin; the basis stays zero until the first update
    pub fn new() -> Self {
        Self {
            state: CameraState::default(),
            world_up: Vector3::unit_y(),
        }
    }

    pub fn move_by(&mut self, offset: Vector3<f32>) {
        self.state.position += offset;
        self.update_camera_vectors();
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.state.position = position;
        self.update_camera_vectors();
    }

    /// Where `move_by(offset)` would put the camera, without moving it
    pub fn candidate_position(&self, offset: Vector3<f32>) -> Vector3<f32> {
        self.state.position + offset
    }

    fn update_camera_vectors(&mut self) {
        let s = &mut self.state;
        s.direction = spherical_direction(s.pitch, s.yaw).normalize();
        s.right = s.direction.cross(self.world_up).normalize();
        s.up = s.right.cross(s.direction).normalize();
        s.target = s.position + s.direction;
    }
}

impl Camera for FirstPersonCamera {
    fn state(&self) -> &CameraState {
        &self.state
    }

    fn rotate(&mut self, pitch_deg: f32, yaw_deg: f32) {
        self.state.pitch = clamp_pitch(self.state.pitch + to_radians(pitch_deg));
        self.state.yaw += to_radians(yaw_deg);
        self.update_camera_vectors();
    }

    fn set_fov(&mut self, fov_deg: f32) {
        self.state.fov = fov_deg;
    }
}
