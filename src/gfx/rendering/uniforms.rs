//! Per-draw uniform block and the mapping from uniform names to its fields
//!
//! The layout mirrors the `Uniforms` struct declared by the built-in WGSL
//! Phong program: every `vec3` is followed by one scalar so the block packs
//! without padding words.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use super::context::UniformValue;
use crate::gfx::camera::camera_utils::OPENGL_TO_WGPU_MATRIX;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// `mat3x3<f32>`; each column padded to four floats
    pub normal_matrix: [[f32; 4]; 3],
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    pub light_diffuse: [f32; 3],
    pub attenuation_constant: f32,
    pub light_specular: [f32; 3],
    pub attenuation_linear: f32,
    pub ambient_color: [f32; 3],
    pub attenuation_quadratic: f32,
    pub material_ambient: [f32; 3],
    pub ambient_intensity: f32,
    pub material_diffuse: [f32; 3],
    pub specular_coefficient: f32,
    pub material_specular: [f32; 3],
    pub shininess: f32,
    pub view_position: [f32; 3],
    pub _padding: f32,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            projection: identity,
            view: identity,
            model: identity,
            normal_matrix: pad_matrix3(Matrix3::identity()),
            light_position: [0.0; 3],
            light_intensity: 1.0,
            light_diffuse: [1.0; 3],
            attenuation_constant: 1.0,
            light_specular: [1.0; 3],
            attenuation_linear: 0.0,
            ambient_color: [1.0; 3],
            attenuation_quadratic: 0.0,
            material_ambient: [0.1; 3],
            ambient_intensity: 0.0,
            material_diffuse: [1.0; 3],
            specular_coefficient: 0.5,
            material_specular: [1.0; 3],
            shininess: 32.0,
            view_position: [0.0; 3],
            _padding: 0.0,
        }
    }
}

/// Uniform values set on one program, plus the unit its diffuse sampler reads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UniformState {
    pub uniforms: DrawUniforms,
    pub diffuse_map_unit: u32,
}

impl UniformState {
    /// Stores `value` under `name`; returns false for names or shapes the program lacks
    pub fn apply(&mut self, name: &str, value: UniformValue) -> bool {
        use UniformValue::*;

        let u = &mut self.uniforms;
        match (name, value) {
            ("u_projection", Mat4(m)) => u.projection = (OPENGL_TO_WGPU_MATRIX * m).into(),
            ("u_view", Mat4(m)) => u.view = m.into(),
            ("u_model", Mat4(m)) => {
                u.model = m.into();
                u.normal_matrix = pad_matrix3(normal_matrix(&m));
            }
            ("u_normalMatrix", Mat3(m)) => u.normal_matrix = pad_matrix3(m),
            ("u_viewPosition", Vec3(v)) => u.view_position = v.into(),

            ("u_light.position", Vec3(v)) => u.light_position = v.into(),
            ("u_light.intensity", Float(f)) => u.light_intensity = f,
            ("u_light.diffuseColor", Vec3(v)) => u.light_diffuse = v.into(),
            ("u_light.specularColor", Vec3(v)) => u.light_specular = v.into(),
            ("u_light.attenuation.constant", Float(f)) => u.attenuation_constant = f,
            ("u_light.attenuation.linear", Float(f)) => u.attenuation_linear = f,
            ("u_light.attenuation.quadratic", Float(f)) => u.attenuation_quadratic = f,

            ("u_ambientColor", Vec3(v)) => u.ambient_color = v.into(),
            ("u_ambientIntensity", Float(f)) => u.ambient_intensity = f,

            ("u_material.ambientColor", Vec3(v)) => u.material_ambient = v.into(),
            ("u_material.diffuseColor", Vec3(v)) => u.material_diffuse = v.into(),
            ("u_material.specularColor", Vec3(v)) => u.material_specular = v.into(),
            ("u_material.specularCoefficient", Float(f)) => u.specular_coefficient = f,
            ("u_material.shininess", Float(f)) => u.shininess = f,
            ("u_material.diffuseMap", Sampler(unit)) => self.diffuse_map_unit = unit,

            _ => return false,
        }
        true
    }
}

/// Inverse-transpose of the upper 3×3 of `model`
///
/// Falls back to the plain 3×3 when it is singular, e.g. a zero scale axis.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(
        model.x.truncate(),
        model.y.truncate(),
        model.z.truncate(),
    );
    upper.invert().map(|m| m.transpose()).unwrap_or(upper)
}

fn pad_matrix3(m: Matrix3<f32>) -> [[f32; 4]; 3] {
    let col = |c: Vector3<f32>| [c.x, c.y, c.z, 0.0];
    [col(m.x), col(m.y), col(m.z)]
}
