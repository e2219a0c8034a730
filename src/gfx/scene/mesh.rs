//! GPU-resident triangle mesh built from OBJ text or hand-authored vertices
//!
//! A mesh starts empty. Once its source text arrives and parses, the vertices
//! are uploaded to a vertex array; until then [`Mesh::draw`] does nothing.

use cgmath::{Vector3, Zero};
use log::{debug, info, warn};

use super::{
    bounding_box::BoundingBox,
    obj::{centroid, parse_obj, ObjData},
    vertex::{as_floats, Vertex},
};
use crate::{
    assets::{AssetLoader, LoadState, PendingAsset},
    error::Result,
    gfx::rendering::context::{RenderContext, VertexArrayId},
};

pub struct Mesh {
    label: String,
    vertices: Vec<Vertex>,
    bounding_box: BoundingBox,
    centroid: Vector3<f32>,
    vertex_array: Option<VertexArrayId>,
    pending: Option<PendingAsset<String>>,
    state: LoadState,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new("mesh")
    }
}

impl Mesh {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            vertices: Vec::new(),
            bounding_box: BoundingBox::default(),
            centroid: Vector3::zero(),
            vertex_array: None,
            pending: None,
            state: LoadState::Idle,
        }
    }

    /// Uploads hand-authored vertices in draw order
    pub fn from_vertices(ctx: &mut dyn RenderContext, label: &str, vertices: Vec<Vertex>) -> Self {
        let positions: Vec<Vector3<f32>> = vertices.iter().map(|v| v.position.into()).collect();
        let mut mesh = Self::new(label);
        mesh.bounding_box = BoundingBox::from_positions(&positions);
        mesh.centroid = centroid(&positions);
        mesh.vertices = vertices;
        mesh.upload(ctx);
        mesh.state = LoadState::Loaded;
        mesh
    }

    /// Starts fetching OBJ text from `path`; returns immediately
    pub fn load_obj(&mut self, loader: &AssetLoader, path: &str) {
        self.pending = Some(loader.request_text(path));
        self.state = LoadState::Pending;
    }

    /// Parses `text` and uploads it, replacing any previous geometry
    pub fn load_obj_from_str(&mut self, ctx: &mut dyn RenderContext, text: &str) -> Result<()> {
        self.apply(ctx, Ok(text.to_string()))
    }

    /// Uploads a finished fetch, if any, without blocking
    ///
    /// A failed fetch or parse is returned once and leaves the mesh empty.
    pub fn poll(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        match pending.poll_ready() {
            Some(result) => {
                self.pending = None;
                self.apply(ctx, result)
            }
            None => Ok(()),
        }
    }

    /// Blocks until the in-flight fetch completes and uploads it
    pub fn finish_loading(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        match self.pending.take() {
            Some(pending) => {
                let result = pending.wait();
                self.apply(ctx, result)
            }
            None => Ok(()),
        }
    }

    fn apply(&mut self, ctx: &mut dyn RenderContext, text: Result<String>) -> Result<()> {
        let parsed = text.and_then(|text| parse_obj(&text));
        match parsed {
            Ok(data) => {
                self.set_geometry(data);
                self.upload(ctx);
                self.state = LoadState::Loaded;
                info!(
                    "Loaded mesh '{}' ({} vertices)",
                    self.label,
                    self.vertices.len()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Mesh '{}' left unloaded", self.label);
                self.set_geometry(ObjData::default());
                self.release(ctx);
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    fn set_geometry(&mut self, data: ObjData) {
        self.vertices = data.vertices;
        self.bounding_box = data.bounding_box;
        self.centroid = data.centroid;
    }

    fn upload(&mut self, ctx: &mut dyn RenderContext) {
        self.release(ctx);
        self.vertex_array = Some(ctx.create_vertex_array(&self.label, &self.vertices));
    }

    fn release(&mut self, ctx: &mut dyn RenderContext) {
        if let Some(old) = self.vertex_array.take() {
            debug!("Releasing previous vertex array of '{}'", self.label);
            ctx.delete_vertex_array(old);
        }
    }

    /// Binds the vertex array and draws every vertex; no-op until loaded
    pub fn draw(&self, ctx: &mut dyn RenderContext) {
        let Some(vertex_array) = self.vertex_array else {
            return;
        };
        if self.vertices.is_empty() {
            return;
        }
        ctx.bind_vertex_array(vertex_array);
        ctx.draw_arrays(0, self.vertices.len() as u32);
    }

    /// Releases the vertex array and abandons any fetch in flight
    pub fn destroy(&mut self, ctx: &mut dyn RenderContext) {
        self.pending = None;
        if let Some(id) = self.vertex_array.take() {
            ctx.delete_vertex_array(id);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Interleaved `[px, py, pz, nx, ny, nz, u, v]` per vertex
    pub fn vertex_data(&self) -> &[f32] {
        as_floats(&self.vertices)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn centroid(&self) -> Vector3<f32> {
        self.centroid
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_pending()
    }
}
