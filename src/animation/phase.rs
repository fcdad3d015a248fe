//! Per-instance animation phases.

/// Where an instance is in its grow/fade/reset loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstancePhase {
    /// `broken` left `(0, 1)`; the instance is reseeded this tick.
    Resetting,
    /// Scaling up; `broken` is untouched.
    Growing,
    /// Scale passed the threshold; `broken` advances toward 1.
    Fading,
}

impl InstancePhase {
    /// Phase implied by an instance's attribute values.
    ///
    /// `threshold` is the multiple of the initial Y scale past which the
    /// instance fades. NaN `broken` values count as out of range.
    #[must_use]
    pub fn classify(broken: f32, scale_y: f32, initial_y: f32, threshold: f32) -> Self {
        if needs_reseed(broken) {
            Self::Resetting
        } else if scale_y > initial_y * threshold {
            Self::Fading
        } else {
            Self::Growing
        }
    }
}

/// `true` when `broken` is outside the open interval `(0, 1)`.
#[must_use]
pub fn needs_reseed(broken: f32) -> bool {
    !(broken > 0.0 && broken < 1.0)
}
