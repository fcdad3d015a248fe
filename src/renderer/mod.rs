//! GPU side of the splash: pipeline construction, dirty-buffer upload and
//! the instanced draw.

pub(crate) mod pipeline_util;
mod splash_pass;

pub use splash_pass::{
    interleave_vertices, mesh_indices, take_dirty_streams, SplashRenderer, SplashUniforms,
    SplashVertex,
};
