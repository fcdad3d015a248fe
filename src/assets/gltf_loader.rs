use std::sync::Arc;

use super::model::{ModelLoader, ModelNode, ModelScene};
use crate::{error::SplashError, geometry::BaseGeometry};

/// Reads `.gltf` / `.glb` files from disk with the `gltf` crate.
///
/// Only the first primitive of each mesh is kept. Indices are widened to
/// `u32`; a non-indexed primitive gets a sequential index buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfLoader;

impl ModelLoader for GltfLoader {
    fn load_model(&self, path: &str) -> Result<ModelScene, SplashError> {
        let (document, buffers, _images) = gltf::import(path)?;
        let Some(scene) = document
            .default_scene()
            .or_else(|| document.scenes().next())
        else {
            return Ok(ModelScene::default());
        };

        let roots = scene
            .nodes()
            .map(|node| convert_node(&node, &buffers))
            .collect();
        Ok(ModelScene { roots })
    }
}

fn convert_node(node: &gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> ModelNode {
    ModelNode {
        name: node.name().map(str::to_owned),
        mesh: node
            .mesh()
            .and_then(|mesh| read_first_primitive(&mesh, buffers))
            .map(Arc::new),
        children: node
            .children()
            .map(|child| convert_node(&child, buffers))
            .collect(),
    }
}

fn read_first_primitive(
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<BaseGeometry> {
    let primitive = mesh.primitives().next()?;
    let reader = primitive.reader(|buf| buffers.get(buf.index()).map(|d| &d.0[..]));

    let positions: Option<Vec<[f32; 3]>> = reader.read_positions().map(Iterator::collect);
    let normals = reader.read_normals().map(Iterator::collect);
    let uvs = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect());
    let indices = reader
        .read_indices()
        .map(|r| r.into_u32().collect())
        .or_else(|| {
            positions
                .as_ref()
                .map(|p: &Vec<[f32; 3]>| (0..p.len() as u32).collect())
        });

    Some(BaseGeometry {
        positions,
        normals,
        uvs,
        indices,
    })
}
