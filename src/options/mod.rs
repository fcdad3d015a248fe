//! Effect tunables with TOML preset support.
//!
//! Every constant the splash effect depends on (pool size, growth rates,
//! fade step, reseed ranges, shader shrink and discard epsilon, asset paths)
//! lives here. With no preset file the defaults reproduce the stock effect.

mod animation;
mod assets;
mod render;

use std::path::Path;

pub use animation::AnimationOptions;
pub use assets::AssetOptions;
pub use render::RenderOptions;
use serde::{Deserialize, Serialize};

use crate::error::SplashError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[animation]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SplashOptions {
    /// Grow/fade/reset parameters.
    pub animation: AnimationOptions,
    /// Shader and placement parameters.
    pub render: RenderOptions,
    /// Asset paths and RNG seed.
    pub assets: AssetOptions,
}

impl SplashOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::Io`] if the file cannot be read and
    /// [`SplashError::OptionsParse`] if it is malformed or fails
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self, SplashError> {
        let content = std::fs::read_to_string(path).map_err(SplashError::from)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| SplashError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::OptionsParse`] on serialization failure and
    /// [`SplashError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SplashError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SplashError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SplashError::from)?;
        }
        std::fs::write(path, content).map_err(SplashError::from)
    }

    /// Reject parameter sets the animator cannot sample from, or under which
    /// an instance would never reach its fade threshold and so never reset.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::OptionsParse`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SplashError> {
        let anim = &self.animation;
        let ranges = [
            ("animation.reseed_scale_xz", anim.reseed_scale_xz),
            ("animation.reseed_scale_y", anim.reseed_scale_y),
        ];
        for (name, [lo, hi]) in ranges {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
                return Err(invalid(format!(
                    "{name} must be a non-empty positive range, got [{lo}, {hi})"
                )));
            }
        }
        if !(anim.reseed_broken_max > 0.0 && anim.reseed_broken_max <= 1.0) {
            return Err(invalid(format!(
                "animation.reseed_broken_max must be in (0, 1], got {}",
                anim.reseed_broken_max
            )));
        }
        if !(anim.fade_step.is_finite() && anim.fade_step > 0.0) {
            return Err(invalid(format!(
                "animation.fade_step must be finite and positive, got {}",
                anim.fade_step
            )));
        }
        if !anim.growth.iter().all(|g| g.is_finite() && *g > 0.0) {
            return Err(invalid(format!(
                "animation.growth components must be finite and positive, got {:?}",
                anim.growth
            )));
        }
        let growth_y = anim.growth[1];
        if growth_y <= 1.0 {
            return Err(invalid(format!(
                "animation.growth[1] must exceed 1 so instances reach the fade threshold, got {growth_y}"
            )));
        }
        // Above one frame of growth, so a reseeded instance never fades on
        // the tick it was reset.
        if !(anim.fade_threshold.is_finite() && anim.fade_threshold > growth_y) {
            return Err(invalid(format!(
                "animation.fade_threshold must be finite and above growth[1] ({growth_y}), got {}",
                anim.fade_threshold
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> SplashError {
    SplashError::OptionsParse(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = SplashOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: SplashOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[animation]
particle_count = 16
";
        let opts: SplashOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.animation.particle_count, 16);
        // Everything else should be default
        assert_eq!(opts.animation.fade_step, 0.025);
        assert_eq!(opts.animation.growth, [1.03, 1.04, 1.03]);
        assert_eq!(opts.render.discard_epsilon, 0.0001);
        assert_eq!(opts.assets.seed, None);
    }

    #[test]
    fn seed_survives_round_trip() {
        let mut opts = SplashOptions::default();
        opts.assets.seed = Some(7);
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: SplashOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.assets.seed, Some(7));
    }

    #[test]
    fn defaults_validate() {
        assert!(SplashOptions::default().validate().is_ok());
    }

    #[test]
    fn empty_reseed_range_is_rejected() {
        let mut opts = SplashOptions::default();
        opts.animation.reseed_scale_y = [1.0, 1.0];
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("reseed_scale_y"));
    }

    fn rejection(edit: impl FnOnce(&mut AnimationOptions)) -> String {
        let mut opts = SplashOptions::default();
        edit(&mut opts.animation);
        opts.validate().unwrap_err().to_string()
    }

    #[test]
    fn unreachable_fade_threshold_is_rejected() {
        assert!(rejection(|a| a.fade_threshold = f32::NAN).contains("fade_threshold"));
        assert!(rejection(|a| a.fade_threshold = 0.0).contains("fade_threshold"));
        assert!(rejection(|a| a.fade_threshold = -3.0).contains("fade_threshold"));
        assert!(rejection(|a| a.fade_threshold = f32::INFINITY).contains("fade_threshold"));
        // Within one frame of growth.
        assert!(rejection(|a| a.fade_threshold = 1.02).contains("fade_threshold"));
    }

    #[test]
    fn non_growing_y_is_rejected() {
        assert!(rejection(|a| a.growth = [1.03, 1.0, 1.03]).contains("growth[1]"));
        assert!(rejection(|a| a.growth = [1.03, 0.5, 1.03]).contains("growth[1]"));
    }

    #[test]
    fn non_finite_or_negative_growth_is_rejected() {
        assert!(rejection(|a| a.growth = [f32::NAN, 1.04, 1.03]).contains("growth"));
        assert!(rejection(|a| a.growth = [1.03, f32::INFINITY, 1.03]).contains("growth"));
        assert!(rejection(|a| a.growth = [1.03, 1.04, 0.0]).contains("growth"));
    }

    #[test]
    fn non_positive_reseed_range_is_rejected() {
        assert!(rejection(|a| a.reseed_scale_y = [0.0, 1.0]).contains("reseed_scale_y"));
        assert!(rejection(|a| a.reseed_scale_xz = [-0.25, 0.25]).contains("reseed_scale_xz"));
    }

    #[test]
    fn non_finite_fade_step_is_rejected() {
        assert!(rejection(|a| a.fade_step = f32::INFINITY).contains("fade_step"));
        assert!(rejection(|a| a.fade_step = f32::NAN).contains("fade_step"));
    }

    #[test]
    fn rejected_preset_fails_to_load() {
        let dir = std::env::temp_dir()
            .join(format!("splash-bad-preset-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preset.toml");
        std::fs::write(&path, "[animation]\nfade_threshold = nan\n").unwrap();
        let err = SplashOptions::load(&path).unwrap_err();
        assert!(matches!(err, SplashError::OptionsParse(_)));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("splash-options-{}", std::process::id()));
        let path = dir.join("preset.toml");
        let mut opts = SplashOptions::default();
        opts.animation.fade_step = 0.05;
        opts.save(&path).unwrap();
        let loaded = SplashOptions::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(dir);
    }
}
