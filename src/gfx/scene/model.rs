//! A mesh, its diffuse texture, a local transform and a material
//!
//! Every model owns its mesh and texture outright; two models built from the
//! same files each fetch and upload their own copy.

use cgmath::{ElementWise, InnerSpace, Matrix4, Rad, Vector3, Zero};

use super::{collision::Footprint, mesh::Mesh, vertex::Vertex};
use crate::{
    assets::{AssetLoader, LoadState},
    error::Result,
    gfx::{
        camera::camera_utils::{clamp_pitch, to_radians},
        rendering::context::RenderContext,
        resources::{material::Material, shader_program::ShaderProgram, texture::Texture2D},
    },
};

/// Texture unit every model binds its diffuse map to
pub const DIFFUSE_UNIT: u32 = 0;

pub struct Model {
    name: String,
    mesh: Mesh,
    texture: Texture2D,
    position: Vector3<f32>,
    roll: f32,
    pitch: f32,
    yaw: f32,
    scale: Vector3<f32>,
    pub material: Material,
    solid: bool,
    floor: bool,
}

impl Model {
    /// Creates the model and starts fetching its mesh and texture
    ///
    /// Returns immediately; the model draws nothing until the mesh arrives
    /// and samples a white fallback until the texture does.
    pub fn new(
        ctx: &mut dyn RenderContext,
        loader: &AssetLoader,
        name: &str,
        mesh_path: &str,
        texture_path: Option<&str>,
    ) -> Self {
        let mut mesh = Mesh::new(name);
        mesh.load_obj(loader, mesh_path);

        let mut texture = Texture2D::new(ctx, name, Texture2D::WHITE);
        if let Some(path) = texture_path {
            texture.load_texture(loader, path);
        }

        Self::from_parts(name, mesh, texture)
    }

    pub fn from_parts(name: &str, mesh: Mesh, texture: Texture2D) -> Self {
        Self {
            name: name.to_string(),
            mesh,
            texture,
            position: Vector3::zero(),
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            scale: Vector3::new(1.0, 1.0, 1.0),
            material: Material::default(),
            solid: false,
            floor: false,
        }
    }

    /// Textured quad with world-space `corners` listed counter-clockwise
    /// from the bottom-left, drawn as two triangles
    pub fn quad(
        ctx: &mut dyn RenderContext,
        loader: &AssetLoader,
        name: &str,
        corners: [Vector3<f32>; 4],
        texture_path: Option<&str>,
        fallback: [u8; 4],
    ) -> Self {
        const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        const INDICES: [usize; 6] = [0, 2, 3, 0, 1, 2];

        let normal = (corners[1] - corners[0])
            .cross(corners[3] - corners[0])
            .normalize();
        let vertices = INDICES
            .iter()
            .map(|&i| Vertex::new(corners[i].into(), normal.into(), UVS[i]))
            .collect();

        let mesh = Mesh::from_vertices(ctx, name, vertices);
        let mut texture = Texture2D::new(ctx, name, fallback);
        if let Some(path) = texture_path {
            texture.load_texture(loader, path);
        }
        Self::from_parts(name, mesh, texture)
    }

    pub fn move_by(&mut self, displacement: Vector3<f32>) {
        self.position += displacement;
    }

    /// Adds degrees to each angle; pitch stays clear of the poles
    pub fn rotate(&mut self, roll_deg: f32, pitch_deg: f32, yaw_deg: f32) {
        self.roll += to_radians(roll_deg);
        self.pitch = clamp_pitch(self.pitch + to_radians(pitch_deg));
        self.yaw += to_radians(yaw_deg);
    }

    /// Multiplies every scale axis by `factor`
    pub fn scale_uniform(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Multiplies each scale axis by the matching component of `factors`
    pub fn scale_non_uniform(&mut self, factors: Vector3<f32>) {
        self.scale = self.scale.mul_element_wise(factors);
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    /// Resets the selected parts of the transform to identity
    pub fn reset_transformations(&mut self, translation: bool, rotation: bool, scale: bool) {
        if translation {
            self.position = Vector3::zero();
        }
        if rotation {
            self.roll = 0.0;
            self.pitch = 0.0;
            self.yaw = 0.0;
        }
        if scale {
            self.scale = Vector3::new(1.0, 1.0, 1.0);
        }
    }

    /// `translate · rotateY(yaw) · rotateX(pitch) · rotateZ(roll) · scale`
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_angle_x(Rad(self.pitch))
            * Matrix4::from_angle_z(Rad(self.roll))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Pushes material and transform, binds the texture, then draws the mesh
    ///
    /// Leaves the texture unit and vertex array bound for whatever draws next.
    pub fn draw(&self, ctx: &mut dyn RenderContext, program: &ShaderProgram) {
        self.material.apply(ctx, program);

        program.set_uniform_sampler(ctx, "u_material.diffuseMap", DIFFUSE_UNIT);
        self.texture.bind(ctx, DIFFUSE_UNIT);

        program.set_uniform_matrix4fv(ctx, "u_model", self.model_matrix());
        self.mesh.draw(ctx);
    }

    /// Ground-plane rectangle used for camera collision
    pub fn footprint(&self) -> Footprint {
        Footprint::from_box(&self.mesh.bounding_box(), self.position, self.scale)
    }

    /// Applies any finished mesh or texture fetch without blocking
    ///
    /// Both are polled even when the first fails; the first error is returned.
    pub fn poll(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let mesh = self.mesh.poll(ctx);
        let texture = self.texture.poll(ctx);
        mesh.and(texture)
    }

    /// Blocks until both fetches finish
    pub fn wait_for_loads(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let mesh = self.mesh.finish_loading(ctx);
        let texture = self.texture.finish_loading(ctx);
        mesh.and(texture)
    }

    /// Mesh is uploaded and the texture, if one was requested, has arrived
    pub fn is_loaded(&self) -> bool {
        self.mesh.is_loaded()
            && matches!(self.texture.load_state(), LoadState::Idle | LoadState::Loaded)
    }

    pub fn is_loading(&self) -> bool {
        self.mesh.is_loading() || self.texture.is_loading()
    }

    pub fn destroy(&mut self, ctx: &mut dyn RenderContext) {
        self.mesh.destroy(ctx);
        self.texture.destroy(ctx);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Current roll in radians
    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Whether the camera collides with this model
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    /// Whether this model's footprint bounds camera movement
    pub fn is_floor(&self) -> bool {
        self.floor
    }

    pub fn set_floor(&mut self, floor: bool) {
        self.floor = floor;
    }
}
