// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The scene graph talks to the GPU only through [`RenderContext`];
//! [`WgpuContext`] turns those calls into a depth-tested render pass.

pub mod context;
#[cfg(test)]
pub mod recording;
pub mod render_engine;
pub mod uniforms;

// Re-export main types
pub use context::{RenderContext, TextureImage, UniformValue};
pub use render_engine::WgpuContext;
