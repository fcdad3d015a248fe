use std::path::Path;

use serde::{Deserialize, Serialize};

/// Asset locations and the random seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetOptions {
    /// glTF/GLB model whose first mesh becomes the instanced geometry.
    pub model_path: String,
    /// Circular sprite sampled for the base color.
    pub sprite_path: String,
    /// Tileable noise map; its green channel drives the discard threshold.
    pub noise_path: String,
    /// Fixed RNG seed. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            model_path: "assets/models/dome.glb".to_owned(),
            sprite_path: "assets/textures/circle.png".to_owned(),
            noise_path: "assets/textures/noise.jpg".to_owned(),
            seed: None,
        }
    }
}

impl AssetOptions {
    /// Configured asset paths that do not name an existing file, in
    /// model, sprite, noise order.
    #[must_use]
    pub fn missing_files(&self) -> Vec<&str> {
        [&self.model_path, &self.sprite_path, &self.noise_path]
            .into_iter()
            .map(String::as_str)
            .filter(|path| !Path::new(path).is_file())
            .collect()
    }
}
