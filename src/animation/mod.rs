//! Procedural grow/fade/reset animation of the splash instance pool.

mod animator;
mod phase;
mod slots;

pub use animator::{FrameSummary, SplashAnimator};
pub use phase::{needs_reseed, InstancePhase};
pub use slots::{
    SplashAttributes, BROKEN, OPACITY, ROTATION, SCALES, SPLASH_ATTRIBUTE_SPECS,
};
