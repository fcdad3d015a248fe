//! Per-frame grow/fade/reset update of the splash instance pool.
//!
//! Each instance runs the same loop independently:
//!
//! 1. **Reset**: if `broken` is outside `(0, 1)` the instance gets a fresh
//!    random scale (remembered as its initial scale), rotation and a small
//!    `broken` value.
//! 2. **Grow**: the scale is multiplied by the growth factor. This also
//!    happens on the tick an instance was reset.
//! 3. **Fade**: once the grown Y scale exceeds `fade_threshold` times the
//!    initial Y scale, `broken` advances by `fade_step` until it reaches 1,
//!    which triggers the next reset.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{
    phase::{needs_reseed, InstancePhase},
    slots::SplashAttributes,
};
use crate::{geometry::InstancedGeometry, options::AnimationOptions};

/// Counts of the phases taken during one [`SplashAnimator::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Instances reseeded this tick.
    pub reseeded: usize,
    /// Instances that only grew.
    pub growing: usize,
    /// Instances whose `broken` advanced.
    pub fading: usize,
}

impl FrameSummary {
    fn record(&mut self, phase: InstancePhase) {
        match phase {
            InstancePhase::Resetting => self.reseeded += 1,
            InstancePhase::Growing => self.growing += 1,
            InstancePhase::Fading => self.fading += 1,
        }
    }
}

/// Drives the instance pool of one splash.
///
/// Owns the initial-scale cache; the attribute data itself lives in the
/// [`InstancedGeometry`] so it can be uploaded without copying.
#[derive(Debug, Clone)]
pub struct SplashAnimator {
    options: AnimationOptions,
    growth: Vec3,
    initial_scales: Vec<Vec3>,
}

impl SplashAnimator {
    /// Animator for a pool of `count` instances.
    #[must_use]
    pub fn new(options: &AnimationOptions, count: usize) -> Self {
        Self {
            options: options.clone(),
            growth: Vec3::from_array(options.growth),
            initial_scales: vec![Vec3::ZERO; count],
        }
    }

    /// Number of instances in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.initial_scales.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.initial_scales.is_empty()
    }

    /// Scale instance `i` was given at its last reseed.
    #[must_use]
    pub fn initial_scale(&self, i: usize) -> Vec3 {
        self.initial_scales[i]
    }

    /// Advance every instance by one tick and flag the touched buffers for
    /// upload.
    pub fn update(
        &mut self,
        geometry: &mut InstancedGeometry,
        slots: &SplashAttributes,
        rng: &mut impl Rng,
    ) -> FrameSummary {
        let count = self.len().min(geometry.instance_count());
        let mut summary = FrameSummary::default();
        for i in 0..count {
            summary.record(self.step(geometry, slots, i, rng));
        }

        for slot in slots.animated() {
            geometry.attribute_at_mut(slot).mark_dirty();
        }
        summary
    }

    fn step(
        &mut self,
        geometry: &mut InstancedGeometry,
        slots: &SplashAttributes,
        i: usize,
        rng: &mut impl Rng,
    ) -> InstancePhase {
        let reset = needs_reseed(geometry.attribute_at(slots.broken).get_x(i));
        if reset {
            self.reseed(geometry, slots, i, rng);
        }

        let scales = geometry.attribute_at_mut(slots.scales);
        let grown = scales.get_xyz(i) * self.growth;
        scales.set_xyz(i, grown);

        // Validated options keep the threshold above one frame of growth, so
        // a freshly reseeded instance cannot fade on its reset tick.
        let broken = geometry.attribute_at_mut(slots.broken);
        let value = broken.get_x(i);
        let phase = if reset {
            InstancePhase::Resetting
        } else {
            InstancePhase::classify(
                value,
                grown.y,
                self.initial_scales[i].y,
                self.options.fade_threshold,
            )
        };
        if phase == InstancePhase::Fading {
            broken.set_x(i, value + self.options.fade_step);
        }
        phase
    }

    fn reseed(
        &mut self,
        geometry: &mut InstancedGeometry,
        slots: &SplashAttributes,
        i: usize,
        rng: &mut impl Rng,
    ) {
        let [xz_lo, xz_hi] = self.options.reseed_scale_xz;
        let [y_lo, y_hi] = self.options.reseed_scale_y;
        let xz = rng.random_range(xz_lo..xz_hi);
        let initial = Vec3::new(xz, rng.random_range(y_lo..y_hi), xz);
        let rotation = rng.random_range(0.0..TAU);
        let broken = rng.random_range(0.0..self.options.reseed_broken_max);

        self.initial_scales[i] = initial;
        geometry.attribute_at_mut(slots.scales).set_xyz(i, initial);
        geometry.attribute_at_mut(slots.rotation).set_x(i, rotation);
        geometry.attribute_at_mut(slots.broken).set_x(i, broken);
        log::debug!("reseeded splash instance {i}: scale {initial}, broken {broken:.3}");
    }
}
