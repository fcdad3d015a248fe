use std::sync::Arc;

use crate::{error::SplashError, geometry::BaseGeometry};

/// Loads a 3D model into a [`ModelScene`].
///
/// Called from the background load thread, hence `Send + Sync`.
pub trait ModelLoader: Send + Sync {
    /// Fetch and parse the model at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::AssetLoad`] (or an I/O variant) when the
    /// model cannot be read or parsed.
    fn load_model(&self, path: &str) -> Result<ModelScene, SplashError>;
}

/// One node of a loaded model's scene graph.
#[derive(Debug, Clone, Default)]
pub struct ModelNode {
    /// Node name, if the file provides one.
    pub name: Option<String>,
    /// Mesh geometry carried by this node.
    pub mesh: Option<Arc<BaseGeometry>>,
    /// Child nodes in file order.
    pub children: Vec<ModelNode>,
}

/// The node forest of a loaded model.
#[derive(Debug, Clone, Default)]
pub struct ModelScene {
    /// Top-level nodes of the scene.
    pub roots: Vec<ModelNode>,
}

impl ModelScene {
    /// First mesh-bearing node in depth-first pre-order.
    #[must_use]
    pub fn first_mesh(&self) -> Option<&ModelNode> {
        self.roots.iter().find_map(first_mesh_in)
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(node: &ModelNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}

fn first_mesh_in(node: &ModelNode) -> Option<&ModelNode> {
    if node.mesh.is_some() {
        return Some(node);
    }
    node.children.iter().find_map(first_mesh_in)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_node(name: &str, vertices: usize) -> ModelNode {
        ModelNode {
            name: Some(name.to_owned()),
            mesh: Some(Arc::new(BaseGeometry {
                positions: Some(vec![[0.0; 3]; vertices]),
                ..Default::default()
            })),
            children: Vec::new(),
        }
    }

    fn group(name: &str, children: Vec<ModelNode>) -> ModelNode {
        ModelNode {
            name: Some(name.to_owned()),
            mesh: None,
            children,
        }
    }

    #[test]
    fn first_mesh_is_depth_first() {
        let scene = ModelScene {
            roots: vec![
                group("root", vec![group("empty", vec![mesh_node("deep", 3)]), mesh_node("shallow", 6)]),
                mesh_node("second_root", 9),
            ],
        };
        let found = scene.first_mesh().unwrap();
        assert_eq!(found.name.as_deref(), Some("deep"));
        assert_eq!(scene.node_count(), 5);
    }

    #[test]
    fn meshless_scene_has_no_first_mesh() {
        let scene = ModelScene {
            roots: vec![group("a", vec![group("b", Vec::new())])],
        };
        assert!(scene.first_mesh().is_none());
    }
}
