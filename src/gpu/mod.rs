//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, CPU-mirrored buffers,
//! texture upload, and shader composition.

/// CPU-mirrored GPU buffers with growth on overflow.
pub mod buffer;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Sampled textures and depth targets.
pub mod texture;
