use std::sync::Arc;

use crate::error::SplashError;

/// How a texture is addressed outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Clamp coordinates to the edge texels.
    ClampToEdge,
    /// Tile the texture.
    Repeat,
}

impl WrapMode {
    /// Matching wgpu sampler address mode.
    #[must_use]
    pub fn address_mode(self) -> wgpu::AddressMode {
        match self {
            Self::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            Self::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Decoded RGBA8 texture plus its addressing mode.
#[derive(Debug, Clone)]
pub struct TextureImage {
    /// Debug label (usually the source path).
    pub label: String,
    /// Pixel data.
    pub image: image::RgbaImage,
    /// Addressing mode the sampler should use.
    pub wrap: WrapMode,
}

impl TextureImage {
    /// Single opaque white texel, used when an image fails to load.
    #[must_use]
    pub fn placeholder(label: &str, wrap: WrapMode) -> Self {
        Self {
            label: label.to_owned(),
            image: image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255])),
            wrap,
        }
    }

    /// Width and height in texels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Synchronous image source.
pub trait TextureLoader {
    /// Decode the image at `path` to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::AssetLoad`] when the image cannot be read or
    /// decoded.
    fn load_image(&self, path: &str) -> Result<image::RgbaImage, SplashError>;
}

/// Reads PNG/JPEG files from disk with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextureLoader;

impl TextureLoader for FileTextureLoader {
    fn load_image(&self, path: &str) -> Result<image::RgbaImage, SplashError> {
        image::open(path)
            .map(|img| img.to_rgba8())
            .map_err(|e| SplashError::AssetLoad(format!("{path}: {e}")))
    }
}

/// Load `path` through `loader`, falling back to a white placeholder.
///
/// Texture failures never abort the effect: the sprite simply renders
/// white and the noise map stops discarding.
pub fn load_texture(
    loader: &dyn TextureLoader,
    path: &str,
    wrap: WrapMode,
) -> Arc<TextureImage> {
    let texture = match loader.load_image(path) {
        Ok(image) => TextureImage {
            label: path.to_owned(),
            image,
            wrap,
        },
        Err(e) => {
            log::warn!("texture load failed, using placeholder: {e}");
            TextureImage::placeholder(path, wrap)
        }
    };
    Arc::new(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Checker;

    impl TextureLoader for Checker {
        fn load_image(&self, _path: &str) -> Result<image::RgbaImage, SplashError> {
            Ok(image::RgbaImage::from_fn(2, 2, |x, y| {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                image::Rgba([v, v, v, 255])
            }))
        }
    }

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let texture = load_texture(&FileTextureLoader, "nope/noise.jpg", WrapMode::Repeat);
        assert_eq!(texture.dimensions(), (1, 1));
        assert_eq!(texture.wrap, WrapMode::Repeat);
        assert_eq!(texture.image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn loaded_image_keeps_pixels_and_wrap() {
        let repeat = load_texture(&Checker, "checker", WrapMode::Repeat);
        assert_eq!(repeat.dimensions(), (2, 2));
        assert_eq!(repeat.wrap, WrapMode::Repeat);
        assert_eq!(repeat.label, "checker");
        assert_eq!(repeat.image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(repeat.image.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn wrap_modes_map_to_wgpu() {
        assert_eq!(WrapMode::Repeat.address_mode(), wgpu::AddressMode::Repeat);
        assert_eq!(WrapMode::ClampToEdge.address_mode(), wgpu::AddressMode::ClampToEdge);
    }
}
