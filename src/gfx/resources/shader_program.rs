//! Handle to a compiled vertex/fragment program
//!
//! Every method is a no-op on a program that was never compiled or has been
//! destroyed, so a scene that failed to build its program can still be torn
//! down safely.

use cgmath::{Matrix3, Matrix4, Vector3};

use crate::{
    error::Result,
    gfx::rendering::context::{ProgramId, RenderContext, UniformValue},
};

#[derive(Debug, Default)]
pub struct ShaderProgram {
    id: Option<ProgramId>,
}

impl ShaderProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(ctx: &mut dyn RenderContext, vertex_src: &str, fragment_src: &str) -> Result<Self> {
        let mut program = Self::new();
        program.load_shaders(ctx, vertex_src, fragment_src)?;
        Ok(program)
    }

    /// Replaces the current program with a freshly compiled one
    ///
    /// On failure the previous program is already gone and this one is left uncompiled.
    pub fn load_shaders(
        &mut self,
        ctx: &mut dyn RenderContext,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<()> {
        self.destroy(ctx);
        self.id = Some(ctx.compile_program(vertex_src, fragment_src)?);
        Ok(())
    }

    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    pub fn is_compiled(&self) -> bool {
        self.id.is_some()
    }

    pub fn use_program(&self, ctx: &mut dyn RenderContext) {
        if let Some(id) = self.id {
            ctx.use_program(id);
        }
    }

    fn set(&self, ctx: &mut dyn RenderContext, name: &str, value: UniformValue) {
        if let Some(id) = self.id {
            ctx.set_uniform(id, name, value);
        }
    }

    pub fn set_uniform_1f(&self, ctx: &mut dyn RenderContext, name: &str, v: f32) {
        self.set(ctx, name, UniformValue::Float(v));
    }

    pub fn set_uniform_3f(&self, ctx: &mut dyn RenderContext, name: &str, v: Vector3<f32>) {
        self.set(ctx, name, UniformValue::Vec3(v));
    }

    pub fn set_uniform_matrix3fv(&self, ctx: &mut dyn RenderContext, name: &str, m: Matrix3<f32>) {
        self.set(ctx, name, UniformValue::Mat3(m));
    }

    pub fn set_uniform_matrix4fv(&self, ctx: &mut dyn RenderContext, name: &str, m: Matrix4<f32>) {
        self.set(ctx, name, UniformValue::Mat4(m));
    }

    /// Points a sampler uniform at texture unit `unit`
    pub fn set_uniform_sampler(&self, ctx: &mut dyn RenderContext, name: &str, unit: u32) {
        self.set(ctx, name, UniformValue::Sampler(unit));
    }

    pub fn destroy(&mut self, ctx: &mut dyn RenderContext) {
        if let Some(id) = self.id.take() {
            ctx.delete_program(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RenderError,
        gfx::rendering::recording::{Call, RecordingContext},
    };

    #[test]
    fn test_compile_and_set_uniforms() {
        let mut ctx = RecordingContext::new();
        let program = ShaderProgram::compile(&mut ctx, "vs", "fs").unwrap();
        let id = program.id().unwrap();

        program.use_program(&mut ctx);
        program.set_uniform_1f(&mut ctx, "u_ambientIntensity", 3.0);

        assert!(ctx.calls.contains(&Call::UseProgram(id)));
        assert_eq!(
            ctx.last_uniform("u_ambientIntensity"),
            Some(UniformValue::Float(3.0))
        );
    }

    #[test]
    fn test_compile_error_surfaces() {
        let mut ctx = RecordingContext::new();
        ctx.reject_programs = true;
        let err = ShaderProgram::compile(&mut ctx, "vs", "fs").unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { .. }));
    }

    #[test]
    fn test_uncompiled_program_is_inert() {
        let mut ctx = RecordingContext::new();
        let mut program = ShaderProgram::new();
        program.use_program(&mut ctx);
        program.set_uniform_sampler(&mut ctx, "u_material.diffuseMap", 0);
        program.destroy(&mut ctx);
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn test_destroy_releases_once() {
        let mut ctx = RecordingContext::new();
        let mut program = ShaderProgram::compile(&mut ctx, "vs", "fs").unwrap();
        program.destroy(&mut ctx);
        program.destroy(&mut ctx);
        assert!(ctx.live_programs.is_empty());
        let deletes = ctx
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DeleteProgram(_)))
            .count();
        assert_eq!(deletes, 1);
    }

    #[test]
    fn test_reload_replaces_previous_program() {
        let mut ctx = RecordingContext::new();
        let mut program = ShaderProgram::compile(&mut ctx, "vs", "fs").unwrap();
        let first = program.id();
        program.load_shaders(&mut ctx, "vs2", "fs2").unwrap();
        assert_ne!(program.id(), first);
        assert_eq!(ctx.live_programs.len(), 1);
    }
}
