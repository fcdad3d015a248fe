//! CPU mirror of the splash shader's per-instance vertex transform.
//!
//! `assets/shaders/splash.wgsl` is the source of truth on the GPU; these
//! functions reproduce its vertex math so [`Splash::bounds`](crate::splash::Splash::bounds)
//! encloses exactly what the shader draws.

use glam::{Mat3, Vec3};

/// The shader's Y-rotation matrix, built column by column exactly as the
/// WGSL `rotation_y` helper does.
#[must_use]
pub fn rotation_y(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::from_cols(
        Vec3::new(c, 0.0, -s),
        Vec3::Y,
        Vec3::new(s, 0.0, c),
    )
}

/// Object-space position of `vertex` for one instance, before the model
/// matrix.
///
/// Shrinks, scales, rotates and then offsets. The shader multiplies the
/// position as a row vector (`pos * rot`), which is the transpose here.
#[must_use]
pub fn instance_position(
    vertex: Vec3,
    offset: Vec3,
    scale: Vec3,
    rotation: f32,
    shrink: f32,
) -> Vec3 {
    let pos = vertex * shrink * scale;
    rotation_y(rotation).transpose() * pos + offset
}
