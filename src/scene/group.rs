use glam::{Mat4, Quat, Vec3};

/// A transform node in the host scene.
///
/// Groups carry no geometry of their own; renderables read the world
/// matrix of the group they are attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Name used for lookups.
    pub name: String,
    /// Local translation relative to the parent.
    pub translation: Vec3,
    /// Local rotation relative to the parent.
    pub rotation: Quat,
    /// Child groups.
    pub children: Vec<Group>,
    world_matrix: Mat4,
}

impl Group {
    /// Identity-transformed group with no children.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            children: Vec::new(),
            world_matrix: Mat4::IDENTITY,
        }
    }

    /// Builder: set the local rotation about X, in radians.
    #[must_use]
    pub fn with_rotation_x(mut self, angle: f32) -> Self {
        self.rotation = Quat::from_rotation_x(angle);
        self
    }

    /// Builder: append a child group.
    #[must_use]
    pub fn with_child(mut self, child: Group) -> Self {
        self.children.push(child);
        self
    }

    /// Local transform.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// World transform as of the last
    /// [`update_matrix_world`](super::SceneHost::update_matrix_world).
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// This group or the first descendant (pre-order) named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Group> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub(crate) fn update_world(&mut self, parent: Mat4) {
        self.world_matrix = parent * self.local_matrix();
        let world = self.world_matrix;
        for child in &mut self.children {
            child.update_world(world);
        }
    }
}
