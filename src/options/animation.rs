use serde::{Deserialize, Serialize};

/// Per-frame grow/fade/reset tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationOptions {
    /// Number of instances in the pool. Fixed for the lifetime of a splash.
    pub particle_count: usize,
    /// Per-axis scale multiplier applied every frame.
    pub growth: [f32; 3],
    /// Fading starts once `scale.y` exceeds this multiple of the initial Y
    /// scale.
    pub fade_threshold: f32,
    /// Amount added to `broken` per fading frame.
    pub fade_step: f32,
    /// Half-open range for the reseeded X/Z scale.
    pub reseed_scale_xz: [f32; 2],
    /// Half-open range for the reseeded Y scale.
    pub reseed_scale_y: [f32; 2],
    /// Upper bound (exclusive) of the reseeded `broken` value.
    pub reseed_broken_max: f32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            particle_count: 2,
            growth: [1.03, 1.04, 1.03],
            fade_threshold: 3.0,
            fade_step: 0.025,
            reseed_scale_xz: [0.125, 0.25],
            reseed_scale_y: [0.5, 1.0],
            reseed_broken_max: 0.1,
        }
    }
}
