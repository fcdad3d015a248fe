//! Asset loading: the splash model, its textures, and the background load
//! handle.
//!
//! Loaders are traits so a host can route requests through its own asset
//! pipeline; [`GltfLoader`] and [`FileTextureLoader`] read from disk.

mod gltf_loader;
mod model;
mod pending;
mod texture;

pub use gltf_loader::GltfLoader;
pub use model::{ModelLoader, ModelNode, ModelScene};
pub use pending::PendingLoad;
pub use texture::{
    load_texture, FileTextureLoader, TextureImage, TextureLoader, WrapMode,
};
