//! # Asset Retrieval
//!
//! Mesh text and texture images are fetched off the render thread. Each request
//! runs on its own worker thread and hands back a [`PendingAsset`], which can be
//! polled once per frame without blocking, awaited as a future, or waited on
//! synchronously when a caller needs the scene fully loaded.
//!
//! Dropping a [`PendingAsset`] abandons the request. A worker that finishes
//! after its receiver is gone discards the result.

use std::{
    collections::HashMap,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::channel::oneshot;
use image::RgbaImage;
use log::{debug, warn};

use crate::error::{RenderError, Result};

/// Where asset bytes come from
pub trait AssetSource: Send + Sync {
    /// Reads the raw bytes stored under `path`
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>>;

    /// Reads `path` as UTF-8 text
    fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| RenderError::asset_load(path, e))
    }

    /// Reads and decodes `path` as an RGBA image, bottom row first
    fn fetch_image(&self, path: &str) -> Result<RgbaImage> {
        let bytes = self.fetch_bytes(path)?;
        decode_image(path, &bytes)
    }
}

/// Decodes an encoded image and flips it so the first row is the bottom of the picture.
///
/// Texture coordinates authored for the scene put `v = 0` at the bottom edge.
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<RgbaImage> {
    let mut image = image::load_from_memory(bytes)
        .map_err(|e| RenderError::asset_load(path, e))?
        .to_rgba8();
    image::imageops::flip_vertical_in_place(&mut image);
    Ok(image)
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileSystemSource {
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.root.join(path);
        std::fs::read(&full_path).map_err(|e| RenderError::asset_load(path, e))
    }
}

/// Serves assets from memory
///
/// Useful for embedded content and for tests that must not touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, path: &str, text: &str) -> Self {
        self.insert(path, text.as_bytes().to_vec());
        self
    }

    pub fn with_bytes(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.entries.insert(path.to_string(), bytes);
    }
}

impl AssetSource for MemorySource {
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::asset_load(path, "no such asset"))
    }
}

/// Progress of an asynchronously loaded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been requested
    #[default]
    Idle,
    /// A request is in flight
    Pending,
    /// The resource holds loaded data
    Loaded,
    /// The last request failed; the resource keeps its empty or fallback contents
    Failed,
}

impl LoadState {
    pub fn is_pending(self) -> bool {
        self == LoadState::Pending
    }
}

/// Spawns asset fetches against a shared [`AssetSource`]
#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
}

impl AssetLoader {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_shared(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }

    /// Starts fetching `path` as text
    pub fn request_text(&self, path: &str) -> PendingAsset<String> {
        self.spawn(path, |source, path| source.fetch_text(path))
    }

    /// Starts fetching and decoding `path` as an image
    pub fn request_image(&self, path: &str) -> PendingAsset<RgbaImage> {
        self.spawn(path, |source, path| source.fetch_image(path))
    }

    fn spawn<T, F>(&self, path: &str, fetch: F) -> PendingAsset<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AssetSource, &str) -> Result<T> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let source = Arc::clone(&self.source);
        let owned_path = path.to_string();

        let spawned = std::thread::Builder::new()
            .name(format!("asset: {}", path))
            .spawn(move || {
                let result = fetch(source.as_ref(), &owned_path);
                if sender.send(result).is_err() {
                    debug!("Discarding late asset '{}'", owned_path);
                }
            });

        // A failed spawn drops the sender, which the receiver reports as a load error.
        if let Err(e) = spawned {
            warn!("Could not start loader thread for '{}': {}", path, e);
        }

        PendingAsset {
            path: path.to_string(),
            receiver,
        }
    }
}

/// An in-flight asset request
pub struct PendingAsset<T> {
    path: String,
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> PendingAsset<T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the result if the fetch has finished, without blocking
    ///
    /// Must not be called again after it has returned `Some`.
    pub fn poll_ready(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(self.abandoned())),
        }
    }

    /// Blocks the calling thread until the fetch finishes
    pub fn wait(self) -> Result<T> {
        pollster::block_on(self)
    }

    fn abandoned(&self) -> RenderError {
        RenderError::asset_load(self.path.clone(), "loader stopped before completing")
    }
}

impl<T> Future for PendingAsset<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(this.abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_images {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// Encodes a PNG whose top row is `top` and remaining rows are `rest`
    pub fn two_tone_png(width: u32, height: u32, top: [u8; 4], rest: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |_, y| {
            if y == 0 {
                Rgba(top)
            } else {
                Rgba(rest)
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_text_round_trip() {
        let loader = AssetLoader::new(MemorySource::new().with_text("a.obj", "v 0 0 0\n"));
        let text = loader.request_text("a.obj").wait().unwrap();
        assert_eq!(text, "v 0 0 0\n");
    }

    #[test]
    fn test_missing_asset_reports_path() {
        let loader = AssetLoader::new(MemorySource::new());
        let err = loader.request_text("missing.obj").wait().unwrap_err();
        match err {
            RenderError::AssetLoad { path, .. } => assert_eq!(path, "missing.obj"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_poll_ready_eventually_yields() {
        let loader = AssetLoader::new(MemorySource::new().with_text("x", "hello"));
        let mut pending = loader.request_text("x");
        let result = loop {
            if let Some(result) = pending.poll_ready() {
                break result;
            }
            std::thread::yield_now();
        };
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn test_images_are_flipped_on_decode() {
        let png = test_images::two_tone_png(2, 3, [255, 0, 0, 255], [0, 0, 255, 255]);
        let loader = AssetLoader::new(MemorySource::new().with_bytes("t.png", png));
        let image = loader.request_image("t.png").wait().unwrap();

        assert_eq!(image.dimensions(), (2, 3));
        // The authored top row ends up last.
        assert_eq!(image.get_pixel(0, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_undecodable_image_is_asset_error() {
        let loader = AssetLoader::new(MemorySource::new().with_text("bad.png", "not an image"));
        let err = loader.request_image("bad.png").wait().unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }

    #[test]
    fn test_dropping_pending_request_is_harmless() {
        let loader = AssetLoader::new(MemorySource::new().with_text("x", "late"));
        drop(loader.request_text("x"));
        // The worker finishes against a closed channel without panicking.
        let again = loader.request_text("x").wait().unwrap();
        assert_eq!(again, "late");
    }

    #[test]
    fn test_file_system_source_reads_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("stellar-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("mesh.obj"), "v 1 2 3\n").unwrap();

        let source = FileSystemSource::new(&dir);
        assert_eq!(source.fetch_text("mesh.obj").unwrap(), "v 1 2 3\n");
        assert!(source.fetch_text("absent.obj").is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
