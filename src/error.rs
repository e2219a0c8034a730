//! Error types shared across the renderer
//!
//! Every failure the renderer can surface falls into one of a small set of
//! classes. Context, shader and surface errors are fatal to the scene that
//! triggered them; asset and mesh errors only affect the asset being loaded.

use thiserror::Error;

/// Errors produced while creating, loading or rendering a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// No compatible adapter, device, surface or event loop
    #[error("could not create render context: {0}")]
    ContextCreation(String),

    /// A shader stage failed validation
    #[error("problem compiling {stage} shader: {message}")]
    ShaderCompile {
        stage: ShaderStage,
        message: String,
    },

    /// Both stages compiled but could not be linked into a pipeline
    #[error("problem linking shader program: {0}")]
    ShaderLink(String),

    /// Text or image data could not be retrieved or decoded
    #[error("failed to load asset '{path}': {reason}")]
    AssetLoad { path: String, reason: String },

    /// Mesh text parsed into inconsistent or invalid geometry
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    /// Scene configuration could not be read or parsed
    #[error("invalid scene configuration: {0}")]
    Config(String),

    /// The presentation surface could not provide a frame
    #[error("surface error: {0}")]
    Surface(String),
}

impl RenderError {
    pub fn asset_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the scene can keep rendering after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AssetLoad { .. } | Self::MalformedMesh(_))
    }
}

/// Shader pipeline stage, used in compile diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
