use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::SplashError;

/// Source of the splash material shader.
pub const SPLASH_SHADER: &str = include_str!("../../assets/shaders/splash.wgsl");
/// File path reported in composition errors for [`SPLASH_SHADER`].
pub const SPLASH_SHADER_PATH: &str = "splash.wgsl";

/// Wraps `naga_oil::compose::Composer` to provide shader composition with `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming shaders use
/// `#import splash::module_name::item` to pull in shared code. The composer produces
/// `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

const SHARED_MODULES: &[ModuleDef] = &[ModuleDef {
    source: include_str!("../../assets/shaders/modules/transform.wgsl"),
    file_path: "modules/transform.wgsl",
}];

fn compose_error(file_path: &str, e: &ComposerError) -> SplashError {
    SplashError::Shader(format!("'{file_path}': {e}"))
}

impl ShaderComposer {
    /// Build a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, SplashError> {
        let mut composer = Composer::default();

        // Dependency order: modules importing others come after them.
        for m in SHARED_MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| compose_error(m.file_path, &e))?;
        }

        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import` directives)
    /// into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::Shader`] if imports cannot be resolved or the
    /// composed module fails validation.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, SplashError> {
        let naga_module = self.compose_naga(source, file_path)?;
        log::debug!("composed shader '{file_path}'");

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without creating a wgpu shader module.
    /// Useful for testing shader composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Same as [`compose`](Self::compose).
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, SplashError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| compose_error(file_path, &e))
    }
}
