use glam::Mat4;

use super::{group::Group, GroupId, SceneHost};

/// Minimal scene root: a flat list of top-level groups.
///
/// Stands in for a host engine's low-priority scene when the effect runs
/// on its own (viewer, tests).
#[derive(Debug, Default)]
pub struct SceneGraph {
    groups: Vec<(GroupId, Group)>,
    next_id: u64,
}

impl SceneGraph {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the scene has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl SceneHost for SceneGraph {
    fn add_group(&mut self, group: Group) -> GroupId {
        let id = GroupId(self.next_id);
        self.next_id += 1;
        self.groups.push((id, group));
        id
    }

    fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let index = self.groups.iter().position(|(gid, _)| *gid == id)?;
        Some(self.groups.remove(index).1)
    }

    fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups
            .iter()
            .find_map(|(gid, g)| (*gid == id).then_some(g))
    }

    fn update_matrix_world(&mut self) {
        for (_, group) in &mut self.groups {
            group.update_world(Mat4::IDENTITY);
        }
    }
}
