//! Crate-level error types.

use std::{fmt, sync::Arc};

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the splash crate.
///
/// Cheap to clone: non-`Clone` sources are shared behind an [`Arc`], so a
/// failed load can be both kept in the app state and handed to the caller.
#[derive(Debug, Clone)]
pub enum SplashError {
    /// GPU context initialization failure.
    Gpu(Arc<RenderContextError>),
    /// Failed to fetch or parse the splash model.
    AssetLoad(String),
    /// The loaded model contains no mesh-bearing node.
    NoMesh(String),
    /// WGSL composition (`#import` resolution or validation) failed.
    Shader(String),
    /// A vertex or instance attribute required downstream is absent.
    MissingAttribute(&'static str),
    /// Generic I/O failure.
    Io(Arc<std::io::Error>),
    /// Failed to spawn the background load thread.
    ThreadSpawn(Arc<std::io::Error>),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for SplashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::AssetLoad(msg) => write!(f, "asset load error: {msg}"),
            Self::NoMesh(path) => {
                write!(f, "model '{path}' contains no mesh")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::MissingAttribute(name) => {
                write!(f, "geometry is missing attribute '{name}'")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for SplashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e.as_ref()),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<RenderContextError> for SplashError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(Arc::new(e))
    }
}

impl From<std::io::Error> for SplashError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl From<gltf::Error> for SplashError {
    fn from(e: gltf::Error) -> Self {
        Self::AssetLoad(e.to_string())
    }
}
