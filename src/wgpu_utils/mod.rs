// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Binding-type shorthands and a dynamic-offset uniform buffer.

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use uniform_buffer::{align_to, DynamicUniformBuffer};
