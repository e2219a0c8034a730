//! # Stellar Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use stellar::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = SceneConfig::from_toml_str("[camera]\nfov = 60.0")?;
//!     StellarApp::new(config)?.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::StellarApp;
pub use crate::config::{CameraMode, ModelConfig, SceneConfig};
pub use crate::error::{RenderError, Result};

// Re-export asset loading
pub use crate::assets::{AssetLoader, AssetSource, FileSystemSource, LoadState, MemorySource};

// Re-export graphics and scene types
pub use crate::gfx::camera::{Camera, CameraManager, FirstPersonCamera, MovementKey, OrbitCamera};
pub use crate::gfx::rendering::{RenderContext, WgpuContext};
pub use crate::gfx::resources::{Material, ShaderProgram, Texture2D};
pub use crate::gfx::scene::{parse_obj, BoundingBox, Footprint, Mesh, Model, Scene, Vertex};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
