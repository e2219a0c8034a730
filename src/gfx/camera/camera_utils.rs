use cgmath::{perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Zero};

use super::{
    camera_controller::{CameraController, MovementKey},
    first_person_camera::FirstPersonCamera,
    orbit_camera::OrbitCamera,
};

/// Maps OpenGL clip depth `[-1, 1]` onto wgpu's `[0, 1]`
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Near clip plane distance
pub const Z_NEAR: f32 = 0.1;
/// Far clip plane distance
pub const Z_FAR: f32 = 200.0;
/// Margin kept between pitch and the poles, in radians
pub const PITCH_MARGIN: f32 = 0.1;

/// Position and orientation shared by every camera variant
///
/// Angles are radians, `fov` is degrees. A freshly created state has zero
/// direction and right vectors until its camera recomputes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub right: Vector3<f32>,
    pub pitch: f32,
    pub yaw: f32,
    pub fov: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            target: Vector3::zero(),
            up: Vector3::unit_y(),
            direction: Vector3::zero(),
            right: Vector3::zero(),
            pitch: 0.0,
            yaw: 0.0,
            fov: 45.0,
        }
    }
}

/// Unit vector for `pitch`/`yaw` in radians
///
/// `(cos(pitch)·sin(yaw), sin(pitch), cos(pitch)·cos(yaw))`
pub fn spherical_direction(pitch: f32, yaw: f32) -> Vector3<f32> {
    Vector3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
}

/// Keeps pitch inside `(-π/2 + 0.1, π/2 - 0.1)`
pub fn clamp_pitch(pitch: f32) -> f32 {
    let limit = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;
    pitch.clamp(-limit, limit)
}

pub fn to_radians(degrees: f32) -> f32 {
    Rad::from(Deg(degrees)).0
}

/// Behaviour common to the camera variants
///
/// Accessors hand out copies; state only changes through the mutating
/// methods, each of which recomputes the basis vectors.
pub trait Camera {
    fn state(&self) -> &CameraState;

    /// Applies a pitch/yaw change in degrees
    fn rotate(&mut self, pitch_deg: f32, yaw_deg: f32);

    fn set_fov(&mut self, fov_deg: f32);

    fn position(&self) -> Vector3<f32> {
        self.state().position
    }

    fn target(&self) -> Vector3<f32> {
        self.state().target
    }

    fn up(&self) -> Vector3<f32> {
        self.state().up
    }

    fn direction(&self) -> Vector3<f32> {
        self.state().direction
    }

    fn right(&self) -> Vector3<f32> {
        self.state().right
    }

    fn fov(&self) -> f32 {
        self.state().fov
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        let state = self.state();
        Matrix4::look_at_rh(
            Point3::from_vec(state.position),
            Point3::from_vec(state.target),
            state.up,
        )
    }

    /// OpenGL-convention perspective for the camera's field of view
    fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        perspective(Deg(self.fov()), aspect, Z_NEAR, Z_FAR)
    }

    /// Whether direction, right and up currently form an orthonormal basis
    fn has_valid_basis(&self) -> bool {
        const EPS: f32 = 1e-4;
        let s = self.state();
        let unit = |v: Vector3<f32>| (v.magnitude() - 1.0).abs() < EPS;
        unit(s.direction)
            && unit(s.right)
            && unit(s.up)
            && s.direction.dot(s.right).abs() < EPS
            && s.direction.dot(s.up).abs() < EPS
            && s.right.dot(s.up).abs() < EPS
    }
}

/// The camera variant driving a scene, chosen at construction
#[derive(Debug, Clone)]
pub enum ActiveCamera {
    FirstPerson(FirstPersonCamera),
    /// Orbit rotation is absolute, so accumulated input angles live here
    Orbit {
        camera: OrbitCamera,
        pitch_deg: f32,
        yaw_deg: f32,
    },
}

impl ActiveCamera {
    pub fn orbit(camera: OrbitCamera) -> Self {
        let state = camera.state();
        let (pitch_deg, yaw_deg) = (state.pitch.to_degrees(), state.yaw.to_degrees());
        Self::Orbit {
            camera,
            pitch_deg,
            yaw_deg,
        }
    }

    pub fn as_camera(&self) -> &dyn Camera {
        match self {
            Self::FirstPerson(camera) => camera as &dyn Camera,
            Self::Orbit { camera, .. } => camera as &dyn Camera,
        }
    }

    /// Turns the view by a relative amount for either variant
    pub fn rotate_by(&mut self, pitch_deg: f32, yaw_deg: f32) {
        match self {
            Self::FirstPerson(camera) => camera.rotate(pitch_deg, yaw_deg),
            Self::Orbit {
                camera,
                pitch_deg: pitch,
                yaw_deg: yaw,
            } => {
                let limit = (std::f32::consts::FRAC_PI_2 - PITCH_MARGIN).to_degrees();
                *pitch = (*pitch + pitch_deg).clamp(-limit, limit);
                *yaw += yaw_deg;
                camera.rotate(*pitch, *yaw);
            }
        }
    }
}

pub struct CameraManager {
    pub camera: ActiveCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: ActiveCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_camera()
    }

    /// Mouse drag while the look button is held
    pub fn process_mouse_look(&mut self, dx: f32, dy: f32) {
        let (pitch, yaw) = self.controller.look_delta(dx, dy);
        self.camera.rotate_by(pitch, yaw);
    }

    /// Ground-plane offset a movement key would apply to the current camera
    pub fn movement_offset(&self, key: MovementKey) -> Vector3<f32> {
        self.controller.movement_offset(key, self.camera().state())
    }

    /// Wheel input; only the orbit camera zooms
    pub fn process_scroll(&mut self, scroll: f32) {
        if let ActiveCamera::Orbit { camera, .. } = &mut self.camera {
            let radius = camera.radius() + self.controller.zoom_delta(scroll);
            camera.set_radius(radius);
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera().view_matrix()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        self.camera().projection_matrix(aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spherical_direction_is_unit() {
        for (p, y) in [(0.0, 0.0), (0.7, -2.0), (-1.2, 3.1)] {
            assert_relative_eq!(spherical_direction(p, y).magnitude(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_clamp_pitch_stays_off_poles() {
        let limit = std::f32::consts::FRAC_PI_2 - 0.1;
        assert_eq!(clamp_pitch(10.0), limit);
        assert_eq!(clamp_pitch(-10.0), -limit);
        assert_eq!(clamp_pitch(0.3), 0.3);
    }

    #[test]
    fn test_default_state_has_no_basis() {
        let cam = FirstPersonCamera::new();
        assert!(!cam.has_valid_basis());
        assert_eq!(cam.up(), Vector3::unit_y());
    }

    #[test]
    fn test_orbit_variant_accumulates_input() {
        let mut active = ActiveCamera::orbit(OrbitCamera::new());
        active.rotate_by(10.0, 20.0);
        active.rotate_by(5.0, 5.0);
        let state = *active.as_camera().state();
        assert_relative_eq!(state.pitch, to_radians(15.0), epsilon = 1e-6);
        assert_relative_eq!(state.yaw, to_radians(25.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scroll_zooms_only_orbit() {
        let controller = CameraController::new(0.1, 0.1, 1.0);
        let mut manager = CameraManager::new(ActiveCamera::orbit(OrbitCamera::new()), controller);
        manager.process_scroll(3.0);
        match &manager.camera {
            ActiveCamera::Orbit { camera, .. } => assert_relative_eq!(camera.radius(), 7.0),
            _ => unreachable!(),
        }

        let mut manager = CameraManager::new(
            ActiveCamera::FirstPerson(FirstPersonCamera::new()),
            CameraController::new(0.1, 0.1, 1.0),
        );
        let before = manager.camera().position();
        manager.process_scroll(3.0);
        assert_eq!(manager.camera().position(), before);
    }

    #[test]
    fn test_projection_uses_fov() {
        let mut cam = FirstPersonCamera::new();
        let narrow = cam.projection_matrix(1.0);
        cam.set_fov(90.0);
        let wide = cam.projection_matrix(1.0);
        // Wider field of view shrinks the x scale.
        assert!(wide.x.x < narrow.x.x);
        assert_relative_eq!(wide.x.x, 1.0, epsilon = 1e-5);
    }
}
