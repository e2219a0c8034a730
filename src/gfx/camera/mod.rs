pub mod camera_controller;
pub mod camera_utils;
pub mod first_person_camera;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::{CameraController, MovementKey};
pub use camera_utils::{ActiveCamera, Camera, CameraManager, CameraState};
pub use first_person_camera::FirstPersonCamera;
pub use orbit_camera::OrbitCamera;
