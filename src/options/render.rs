use serde::{Deserialize, Serialize};

/// Shader and scene-placement parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderOptions {
    /// Uniform shrink applied to the source mesh before instance scaling.
    pub vertex_shrink: f32,
    /// Fragments whose noise-adjusted fade falls below this are discarded.
    pub discard_epsilon: f32,
    /// Rotation about X (radians) of the group holding the instanced mesh.
    pub group_tilt_x: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            vertex_shrink: 0.005,
            discard_epsilon: 0.0001,
            group_tilt_x: -std::f32::consts::PI / 1.8,
        }
    }
}
