//! Phong material parameters
//!
//! Each model owns its own material; nothing is shared or batched between
//! models that use the same mesh.

use cgmath::Vector3;

use super::shader_program::ShaderProgram;
use crate::gfx::rendering::context::RenderContext;

/// Surface response to the scene light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient_color: Vector3<f32>,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    /// Weight of the specular term
    pub specular_coefficient: f32,
    /// Specular exponent
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_color: Vector3::new(0.1, 0.1, 0.1),
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            specular_coefficient: 0.5,
            shininess: 150.0,
        }
    }
}

impl Material {
    pub fn with_specular(mut self, specular_coefficient: f32, shininess: f32) -> Self {
        self.specular_coefficient = specular_coefficient;
        self.shininess = shininess;
        self
    }

    pub fn with_diffuse_color(mut self, color: Vector3<f32>) -> Self {
        self.diffuse_color = color;
        self
    }

    /// Pushes the five material uniforms to `program`
    pub fn apply(&self, ctx: &mut dyn RenderContext, program: &ShaderProgram) {
        program.set_uniform_3f(ctx, "u_material.ambientColor", self.ambient_color);
        program.set_uniform_3f(ctx, "u_material.diffuseColor", self.diffuse_color);
        program.set_uniform_3f(ctx, "u_material.specularColor", self.specular_color);
        program.set_uniform_1f(ctx, "u_material.specularCoefficient", self.specular_coefficient);
        program.set_uniform_1f(ctx, "u_material.shininess", self.shininess);
    }
}
