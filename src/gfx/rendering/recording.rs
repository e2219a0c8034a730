//! In-memory [`RenderContext`] that records every call, for tests

use std::collections::{BTreeSet, HashMap};

use super::context::{ProgramId, RenderContext, TextureId, TextureImage, UniformValue, VertexArrayId};
use crate::{
    error::{RenderError, Result, ShaderStage},
    gfx::scene::vertex::Vertex,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateVertexArray { id: VertexArrayId, label: String, vertex_count: usize },
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(VertexArrayId),
    DrawArrays { first: u32, count: u32 },
    CreateTexture { id: TextureId, width: u32, height: u32, levels: u32 },
    UpdateTexture { id: TextureId, width: u32, height: u32, levels: u32 },
    DeleteTexture(TextureId),
    BindTexture { unit: u32, id: TextureId },
    CompileProgram(ProgramId),
    UseProgram(ProgramId),
    SetUniform { program: ProgramId, name: String, value: UniformValue },
    DeleteProgram(ProgramId),
    Viewport(u32, u32),
    Clear([f32; 4]),
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    pub calls: Vec<Call>,
    pub live_vertex_arrays: BTreeSet<VertexArrayId>,
    pub live_textures: BTreeSet<TextureId>,
    pub live_programs: BTreeSet<ProgramId>,
    pub vertex_data: HashMap<VertexArrayId, Vec<Vertex>>,
    /// Makes `compile_program` fail with a fragment compile error
    pub reject_programs: bool,
    next_id: u32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Vertex counts of every draw call, in order
    pub fn draws(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawArrays { count, .. } => Some(*count),
                _ => None,
            })
            .collect()
    }

    /// Most recent value set for `name`
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetUniform { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Names of uniforms in the order they were set
    pub fn uniform_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetUniform { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_live_resources(&self) -> bool {
        !(self.live_vertex_arrays.is_empty()
            && self.live_textures.is_empty()
            && self.live_programs.is_empty())
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderContext for RecordingContext {
    fn create_vertex_array(&mut self, label: &str, vertices: &[Vertex]) -> VertexArrayId {
        let id = VertexArrayId(self.next());
        self.live_vertex_arrays.insert(id);
        self.vertex_data.insert(id, vertices.to_vec());
        self.calls.push(Call::CreateVertexArray {
            id,
            label: label.to_string(),
            vertex_count: vertices.len(),
        });
        id
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        self.live_vertex_arrays.remove(&id);
        self.vertex_data.remove(&id);
        self.calls.push(Call::DeleteVertexArray(id));
    }

    fn bind_vertex_array(&mut self, id: VertexArrayId) {
        self.calls.push(Call::BindVertexArray(id));
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        self.calls.push(Call::DrawArrays { first, count });
    }

    fn create_texture(&mut self, _label: &str, image: &TextureImage) -> TextureId {
        let id = TextureId(self.next());
        self.live_textures.insert(id);
        self.calls.push(Call::CreateTexture {
            id,
            width: image.width,
            height: image.height,
            levels: image.mip_level_count(),
        });
        id
    }

    fn update_texture(&mut self, id: TextureId, image: &TextureImage) {
        self.calls.push(Call::UpdateTexture {
            id,
            width: image.width,
            height: image.height,
            levels: image.mip_level_count(),
        });
    }

    fn delete_texture(&mut self, id: TextureId) {
        self.live_textures.remove(&id);
        self.calls.push(Call::DeleteTexture(id));
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) {
        self.calls.push(Call::BindTexture { unit, id });
    }

    fn compile_program(&mut self, _vertex_src: &str, _fragment_src: &str) -> Result<ProgramId> {
        if self.reject_programs {
            return Err(RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                message: "rejected by test context".into(),
            });
        }
        let id = ProgramId(self.next());
        self.live_programs.insert(id);
        self.calls.push(Call::CompileProgram(id));
        Ok(id)
    }

    fn use_program(&mut self, id: ProgramId) {
        self.calls.push(Call::UseProgram(id));
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        self.calls.push(Call::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn delete_program(&mut self, id: ProgramId) {
        self.live_programs.remove(&id);
        self.calls.push(Call::DeleteProgram(id));
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }
}
