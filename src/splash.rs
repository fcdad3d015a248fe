//! The instanced splash render object and its material.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

use crate::{
    animation::{FrameSummary, SplashAnimator, SplashAttributes, SPLASH_ATTRIBUTE_SPECS},
    assets::{load_texture, TextureImage, TextureLoader, WrapMode},
    error::SplashError,
    geometry::{build_instanced_geometry, BaseGeometry, InstancedGeometry},
    options::{AnimationOptions, AssetOptions},
    shading::instance_position,
};

/// Uniform and texture state of the splash shader.
///
/// Blending is additive, depth writes are off and both faces are drawn;
/// those are fixed properties of the pipeline, not of this struct.
#[derive(Debug, Clone)]
pub struct SplashMaterial {
    /// Seconds since the host clock's origin, as of the last frame.
    pub time: f32,
    /// Circular sprite, clamped at the edges.
    pub sprite: Arc<TextureImage>,
    /// Tileable noise map, repeat-wrapped on both axes.
    pub noise: Arc<TextureImage>,
}

impl SplashMaterial {
    /// Material over already-loaded textures.
    #[must_use]
    pub fn new(sprite: Arc<TextureImage>, noise: Arc<TextureImage>) -> Self {
        Self {
            time: 0.0,
            sprite,
            noise,
        }
    }

    /// Load the sprite and noise textures named in `assets`.
    ///
    /// Never fails: an unreadable image is replaced by a white placeholder.
    #[must_use]
    pub fn load(loader: &dyn TextureLoader, assets: &AssetOptions) -> Self {
        Self::new(
            load_texture(loader, &assets.sprite_path, WrapMode::ClampToEdge),
            load_texture(loader, &assets.noise_path, WrapMode::Repeat),
        )
    }
}

/// An instanced mesh: shared source geometry, per-instance attributes,
/// the animator that drives them, and the material they render with.
#[derive(Debug, Clone)]
pub struct Splash {
    geometry: InstancedGeometry,
    slots: SplashAttributes,
    animator: SplashAnimator,
    material: SplashMaterial,
}

impl Splash {
    /// Build the instanced geometry over `source` and resolve its slots.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::MissingAttribute`] if the built geometry lacks
    /// a splash attribute (only possible if the attribute specs change).
    pub fn new(
        source: &Arc<BaseGeometry>,
        material: SplashMaterial,
        options: &AnimationOptions,
    ) -> Result<Self, SplashError> {
        let count = options.particle_count;
        let geometry = build_instanced_geometry(source, &SPLASH_ATTRIBUTE_SPECS, count);
        let slots = SplashAttributes::resolve(&geometry)?;
        Ok(Self {
            geometry,
            slots,
            animator: SplashAnimator::new(options, count),
            material,
        })
    }

    /// Number of instances drawn.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.geometry.instance_count()
    }

    /// Instanced geometry.
    #[must_use]
    pub fn geometry(&self) -> &InstancedGeometry {
        &self.geometry
    }

    /// Mutable geometry, for the upload step to clear dirty flags.
    pub fn geometry_mut(&mut self) -> &mut InstancedGeometry {
        &mut self.geometry
    }

    /// Resolved attribute slots.
    #[must_use]
    pub fn slots(&self) -> &SplashAttributes {
        &self.slots
    }

    /// Object-space bounds of every instance, before the group transform.
    ///
    /// Each instance transforms the corners of the source mesh's bounding
    /// box the way the vertex shader does, so the result encloses everything
    /// drawn. `None` for a mesh without positions or an empty pool.
    #[must_use]
    pub fn bounds(&self, shrink: f32) -> Option<(Vec3, Vec3)> {
        let (lo, hi) = self.geometry.base().bounds()?;
        let corners: [Vec3; 8] = std::array::from_fn(|c| {
            Vec3::new(
                if c & 1 == 0 { lo.x } else { hi.x },
                if c & 2 == 0 { lo.y } else { hi.y },
                if c & 4 == 0 { lo.z } else { hi.z },
            )
        });

        let offsets = self.geometry.attribute_at(self.slots.positions);
        let scales = self.geometry.attribute_at(self.slots.scales);
        let rotations = self.geometry.attribute_at(self.slots.rotation);
        (0..self.instance_count())
            .flat_map(|i| {
                let (offset, scale, rotation) =
                    (offsets.get_xyz(i), scales.get_xyz(i), rotations.get_x(i));
                corners.map(|corner| instance_position(corner, offset, scale, rotation, shrink))
            })
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }

    /// Shader material.
    #[must_use]
    pub fn material(&self) -> &SplashMaterial {
        &self.material
    }

    /// Animate one frame and advance the shader clock to `timestamp_ms`.
    pub fn tick(&mut self, timestamp_ms: f64, rng: &mut impl Rng) -> FrameSummary {
        let summary = self.animator.update(&mut self.geometry, &self.slots, rng);
        self.material.time = (timestamp_ms / 1000.0) as f32;
        summary
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn blank_material() -> SplashMaterial {
        SplashMaterial::new(
            Arc::new(TextureImage::placeholder("sprite", WrapMode::ClampToEdge)),
            Arc::new(TextureImage::placeholder("noise", WrapMode::Repeat)),
        )
    }

    #[test]
    fn default_splash_exposes_expected_attributes() {
        let splash = Splash::new(
            &Arc::new(BaseGeometry::default()),
            blank_material(),
            &AnimationOptions::default(),
        )
        .unwrap();
        assert_eq!(splash.instance_count(), 2);

        let expected = [
            ("positions", 3),
            ("broken", 1),
            ("opacity", 1),
            ("scales", 3),
            ("rotation", 1),
        ];
        for (name, item_size) in expected {
            let attr = splash.geometry().attribute(name).unwrap();
            assert_eq!(attr.item_size(), item_size, "{name}");
            assert_eq!(attr.as_slice().len(), 2 * item_size, "{name}");
        }
    }

    #[test]
    fn tick_sets_time_in_seconds() {
        let mut splash = Splash::new(
            &Arc::new(BaseGeometry::default()),
            blank_material(),
            &AnimationOptions::default(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let summary = splash.tick(2500.0, &mut rng);
        assert_eq!(summary.reseeded, 2);
        assert!((splash.material().time - 2.5).abs() < 1e-6);
    }

    fn unit_cube() -> Arc<BaseGeometry> {
        Arc::new(BaseGeometry {
            positions: Some(vec![[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]]),
            ..BaseGeometry::default()
        })
    }

    #[test]
    fn bounds_follow_instance_scale_and_offset() {
        let mut splash =
            Splash::new(&unit_cube(), blank_material(), &AnimationOptions::default()).unwrap();
        let slots = *splash.slots();
        let geometry = splash.geometry_mut();
        geometry.attribute_at_mut(slots.scales).set_xyz(0, Vec3::new(2.0, 4.0, 2.0));
        geometry.attribute_at_mut(slots.scales).set_xyz(1, Vec3::ONE);
        geometry.attribute_at_mut(slots.positions).set_xyz(1, Vec3::new(10.0, 0.0, 0.0));

        let (lo, hi) = splash.bounds(0.5).unwrap();
        assert!((lo - Vec3::new(-1.0, -2.0, -1.0)).length() < 1e-5, "{lo}");
        assert!((hi - Vec3::new(10.5, 2.0, 1.0)).length() < 1e-5, "{hi}");
    }

    #[test]
    fn bounds_grow_as_the_pool_animates() {
        let mut splash =
            Splash::new(&unit_cube(), blank_material(), &AnimationOptions::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let _ = splash.tick(0.0, &mut rng);
        let (lo0, hi0) = splash.bounds(1.0).unwrap();
        for _ in 0..10 {
            let _ = splash.tick(16.0, &mut rng);
        }
        let (lo1, hi1) = splash.bounds(1.0).unwrap();
        assert!((hi1 - lo1).y > (hi0 - lo0).y);
    }

    #[test]
    fn meshless_splash_has_no_bounds() {
        let splash = Splash::new(
            &Arc::new(BaseGeometry::default()),
            blank_material(),
            &AnimationOptions::default(),
        )
        .unwrap();
        assert!(splash.bounds(1.0).is_none());
    }

    #[test]
    fn material_load_marks_noise_repeat() {
        struct Missing;
        impl TextureLoader for Missing {
            fn load_image(&self, path: &str) -> Result<image::RgbaImage, SplashError> {
                Err(SplashError::AssetLoad(path.to_owned()))
            }
        }
        let material = SplashMaterial::load(&Missing, &AssetOptions::default());
        assert_eq!(material.noise.wrap, WrapMode::Repeat);
        assert_eq!(material.sprite.wrap, WrapMode::ClampToEdge);
        assert_eq!(material.time, 0.0);
    }
}
