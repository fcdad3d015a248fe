//! Host scene interface and a minimal in-process implementation.
//!
//! The splash attaches exactly one top-level group to the host and reads
//! back the world matrix of its orientation child when rendering.

mod graph;
mod group;

pub use graph::SceneGraph;
pub use group::Group;

/// Handle to a top-level group added to a [`SceneHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

/// The scene-graph operations the splash needs from its host.
pub trait SceneHost {
    /// Attach a top-level group.
    fn add_group(&mut self, group: Group) -> GroupId;

    /// Detach a top-level group, returning it if it was present.
    fn remove_group(&mut self, id: GroupId) -> Option<Group>;

    /// Look up a top-level group.
    fn group(&self, id: GroupId) -> Option<&Group>;

    /// Recompute world matrices after groups were added or moved.
    fn update_matrix_world(&mut self);
}
