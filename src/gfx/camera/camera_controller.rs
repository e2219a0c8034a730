use cgmath::Vector3;
use winit::{
    dpi::PhysicalPosition,
    event::MouseScrollDelta,
    keyboard::{KeyCode, PhysicalKey},
};

use super::camera_utils::CameraState;

/// Ground-plane movement directions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKey {
    Left,
    Right,
    Forward,
    Back,
}

impl MovementKey {
    /// WASD and the arrow keys
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::Right),
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Self::Back),
            _ => None,
        }
    }

    pub fn from_physical_key(key: PhysicalKey) -> Option<Self> {
        match key {
            PhysicalKey::Code(code) => Self::from_key_code(code),
            PhysicalKey::Unidentified(_) => None,
        }
    }
}

/// Converts raw input into camera offsets and angle changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    /// World units per key press
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion
    pub angle_speed: f32,
    /// Orbit radius change per scroll line
    pub zoom_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.1, 0.1, 1.0)
    }
}

impl CameraController {
    pub fn new(move_speed: f32, angle_speed: f32, zoom_speed: f32) -> Self {
        Self {
            move_speed,
            angle_speed,
            zoom_speed,
        }
    }

    /// Offset on the X/Z plane for `key`
    ///
    /// Strafing follows the camera's right vector and walking follows its
    /// direction; the vertical components are dropped so the eye height stays put.
    pub fn movement_offset(&self, key: MovementKey, camera: &CameraState) -> Vector3<f32> {
        let flat = |v: Vector3<f32>| Vector3::new(v.x, 0.0, v.z) * self.move_speed;
        match key {
            MovementKey::Left => -flat(camera.right),
            MovementKey::Right => flat(camera.right),
            MovementKey::Forward => flat(camera.direction),
            MovementKey::Back => -flat(camera.direction),
        }
    }

    /// Mouse delta in pixels to `(pitch, yaw)` in degrees
    pub fn look_delta(&self, dx: f32, dy: f32) -> (f32, f32) {
        (-dy * self.angle_speed, -dx * self.angle_speed)
    }

    /// Radius change for a scroll amount; scrolling up moves closer
    pub fn zoom_delta(&self, scroll: f32) -> f32 {
        -scroll * self.zoom_speed
    }
}

/// Scroll amount in lines, positive away from the user
pub fn scroll_amount(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, scroll) => *scroll,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll as f32 / 20.0,
    }
}
