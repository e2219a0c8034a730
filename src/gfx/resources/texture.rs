//! Single 2D diffuse texture with a solid-colour fallback
//!
//! The GPU texture exists from construction, filled with the fallback colour.
//! [`Texture2D::load_texture`] only starts the fetch; a later
//! [`Texture2D::poll`] replaces the contents once the image has decoded.
//! Draws issued in between sample the fallback.

use image::RgbaImage;
use log::{info, warn};

use crate::{
    assets::{AssetLoader, LoadState, PendingAsset},
    error::Result,
    gfx::rendering::context::{RenderContext, TextureId, TextureImage},
};

pub struct Texture2D {
    label: String,
    id: Option<TextureId>,
    pending: Option<PendingAsset<RgbaImage>>,
    state: LoadState,
}

impl Texture2D {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];

    pub fn new(ctx: &mut dyn RenderContext, label: &str, fallback: [u8; 4]) -> Self {
        let id = ctx.create_texture(label, &TextureImage::solid(fallback));
        Self {
            label: label.to_string(),
            id: Some(id),
            pending: None,
            state: LoadState::Idle,
        }
    }

    /// Starts fetching `path`; returns immediately
    pub fn load_texture(&mut self, loader: &AssetLoader, path: &str) {
        self.pending = Some(loader.request_image(path));
        self.state = LoadState::Pending;
    }

    /// Applies a finished fetch, if any, without blocking
    ///
    /// A failed fetch is returned once and leaves the fallback in place.
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

    /// Blocks until the in-flight fetch completes and applies it
    pub fn finish_loading(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        match self.pending.take() {
            Some(pending) => {
                let result = pending.wait();
                self.apply(ctx, result)
            }
            None => Ok(()),
        }
    }

    fn apply(&mut self, ctx: &mut dyn RenderContext, result: Result<RgbaImage>) -> Result<()> {
        match result {
            Ok(image) => {
                if let Some(id) = self.id {
                    let (w, h) = image.dimensions();
                    ctx.update_texture(id, &TextureImage::from_rgba(image, true));
                    info!("Loaded texture '{}' ({}x{})", self.label, w, h);
                }
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!("Texture '{}' keeps its fallback colour", self.label);
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    pub fn bind(&self, ctx: &mut dyn RenderContext, unit: u32) {
        if let Some(id) = self.id {
            ctx.bind_texture(unit, id);
        }
    }

    /// Releases the GPU texture and abandons any fetch in flight
    pub fn destroy(&mut self, ctx: &mut dyn RenderContext) {
        self.pending = None;
        if let Some(id) = self.id.take() {
            ctx.delete_texture(id);
        }
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
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
