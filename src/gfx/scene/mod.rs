//! # Scene Module
//!
//! Geometry, models and the scene that draws them.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns the models, shader program and camera; runs the frame
//! - [`Model`] - Mesh plus texture, transform and material
//! - [`Mesh`] - Vertex data parsed from OBJ text and its GPU vertex array
//! - [`Footprint`] - Ground-plane rectangle used to block camera movement
//!
//! ## Usage
//!
//! ```no_run
//! use stellar::assets::{AssetLoader, FileSystemSource};
//! use stellar::config::SceneConfig;
//! use stellar::gfx::scene::Scene;
//!
//! let config = SceneConfig::default();
//! let loader = AssetLoader::new(FileSystemSource::new(&config.assets_root));
//! let scene = Scene::new(config, loader);
//! // scene.start(&mut ctx)?; then scene.draw_frame(&mut ctx) once per frame
//! ```

pub mod bounding_box;
pub mod collision;
pub mod mesh;
pub mod model;
pub mod obj;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use bounding_box::BoundingBox;
pub use collision::Footprint;
pub use mesh::Mesh;
pub use model::Model;
pub use obj::{parse_obj, triangulate, ObjData};
pub use scene::Scene;
pub use vertex::Vertex;
