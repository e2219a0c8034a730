// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles shader programs, textures and per-model materials.

pub mod material;
pub mod shader_program;
pub mod texture;
pub mod texture_resource;

// Re-export main types
pub use material::Material;
pub use shader_program::ShaderProgram;
pub use texture::Texture2D;
pub use texture_resource::TextureResource;
