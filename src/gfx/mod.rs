//! # Graphics Module
//!
//! Everything between the scene description and the GPU.
//!
//! - **Camera System** ([`camera`]) - First-person and orbit cameras behind one trait
//! - **Rendering** ([`rendering`]) - The [`RenderContext`] seam and its wgpu implementation
//! - **Resources** ([`resources`]) - Shader programs, textures and materials
//! - **Scene** ([`scene`]) - OBJ meshes, models, collision and the frame loop
//!
//! [`RenderContext`]: rendering::RenderContext

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use rendering::{RenderContext, WgpuContext};
pub use scene::Scene;
