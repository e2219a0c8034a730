// src/lib.rs
//! Stellar 3D scene renderer
//!
//! Loads OBJ meshes and textures, lights them with a single Phong point
//! light and walks a first-person camera around them, built on wgpu and winit.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::StellarApp;
pub use error::{RenderError, Result};

/// Creates an application for the default scene
pub fn default() -> Result<StellarApp> {
    StellarApp::new(config::SceneConfig::default())
}
