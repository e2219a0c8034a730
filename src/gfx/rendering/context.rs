//! # Render Context
//!
//! State-machine style GPU surface shared by meshes, textures and shader
//! programs. Resources are referred to by small integer handles; binding a
//! vertex array or texture changes what every later draw call sees until
//! something else is bound.
//!
//! [`WgpuContext`](super::render_engine::WgpuContext) implements it on wgpu.

use cgmath::{Matrix3, Matrix4, Vector3};
use image::{
    imageops::{resize, FilterType},
    RgbaImage,
};

use crate::{error::Result, gfx::scene::vertex::Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Value passed to a named shader uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vector3<f32>),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
    /// Texture unit a sampler reads from
    Sampler(u32),
}

/// RGBA8 pixels for a texture, full-size level first
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows for each mip level
    pub levels: Vec<Vec<u8>>,
}

impl TextureImage {
    /// A 1×1 image of `rgba`
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            levels: vec![rgba.to_vec()],
        }
    }

    /// Wraps a decoded image, optionally generating a full mip chain
    pub fn from_rgba(image: RgbaImage, generate_mips: bool) -> Self {
        let (width, height) = image.dimensions();
        let mut levels = Vec::new();

        if generate_mips {
            let (mut w, mut h) = (width, height);
            let mut current = image;
            while w > 1 || h > 1 {
                w = (w / 2).max(1);
                h = (h / 2).max(1);
                let next = resize(&current, w, h, FilterType::Triangle);
                levels.push(std::mem::replace(&mut current, next).into_raw());
            }
            levels.push(current.into_raw());
        } else {
            levels.push(image.into_raw());
        }

        Self {
            width,
            height,
            levels,
        }
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Size of mip `level` in pixels
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

/// GPU operations the scene graph issues
///
/// Handles from one context are meaningless to another. Deleting a handle
/// that is not live is a no-op.
pub trait RenderContext {
    fn create_vertex_array(&mut self, label: &str, vertices: &[Vertex]) -> VertexArrayId;
    fn delete_vertex_array(&mut self, id: VertexArrayId);
    fn bind_vertex_array(&mut self, id: VertexArrayId);
    /// Draws `count` vertices of the bound vertex array starting at `first`
    fn draw_arrays(&mut self, first: u32, count: u32);

    fn create_texture(&mut self, label: &str, image: &TextureImage) -> TextureId;
    /// Replaces the contents of a live texture, resizing it if needed
    fn update_texture(&mut self, id: TextureId, image: &TextureImage);
    fn delete_texture(&mut self, id: TextureId);
    fn bind_texture(&mut self, unit: u32, id: TextureId);

    /// Compiles and links a vertex/fragment pair
    fn compile_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId>;
    fn use_program(&mut self, id: ProgramId);
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue);
    fn delete_program(&mut self, id: ProgramId);

    fn viewport(&mut self, width: u32, height: u32);
    fn clear(&mut self, color: [f32; 4]);
}
