use std::sync::Arc;

use glam::Vec3;

use super::BaseGeometry;

/// Name of the per-instance offset attribute every instanced geometry gets.
pub const POSITIONS_ATTRIBUTE: &str = "positions";

/// Name and component count of one extra per-instance attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name as seen by the shader.
    pub name: &'static str,
    /// Floats per instance (1 for scalars, 3 for vectors).
    pub item_size: usize,
}

impl AttributeSpec {
    /// Spec with the given name and component count.
    #[must_use]
    pub const fn new(name: &'static str, item_size: usize) -> Self {
        Self { name, item_size }
    }
}

/// A flat `f32` buffer with one `item_size`-wide record per instance.
///
/// Writers set the dirty flag; the upload step clears it once the data has
/// reached the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceAttribute {
    name: &'static str,
    item_size: usize,
    data: Vec<f32>,
    dirty: bool,
}

impl InstanceAttribute {
    /// Zero-filled attribute for `count` instances.
    #[must_use]
    pub fn zeroed(name: &'static str, item_size: usize, count: usize) -> Self {
        Self {
            name,
            item_size,
            data: vec![0.0; count * item_size],
            dirty: false,
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Floats per instance.
    #[must_use]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of instance records.
    #[must_use]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.data.len() / self.item_size
        }
    }

    /// The raw backing array.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The backing array as bytes, ready for `queue.write_buffer`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// First component of record `i`.
    #[must_use]
    pub fn get_x(&self, i: usize) -> f32 {
        self.data[i * self.item_size]
    }

    /// Overwrite the first component of record `i`.
    pub fn set_x(&mut self, i: usize, x: f32) {
        self.data[i * self.item_size] = x;
    }

    /// Record `i` as a vector. Requires `item_size >= 3`.
    #[must_use]
    pub fn get_xyz(&self, i: usize) -> Vec3 {
        let base = i * self.item_size;
        Vec3::from_slice(&self.data[base..base + 3])
    }

    /// Overwrite record `i` from a vector. Requires `item_size >= 3`.
    pub fn set_xyz(&mut self, i: usize, v: Vec3) {
        let base = i * self.item_size;
        v.write_to_slice(&mut self.data[base..base + 3]);
    }

    /// Flag the buffer for re-upload.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the CPU copy changed since the last upload.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

/// Source geometry extended with per-instance attributes.
#[derive(Debug, Clone)]
pub struct InstancedGeometry {
    base: Arc<BaseGeometry>,
    attributes: Vec<InstanceAttribute>,
    instance_count: usize,
}

impl InstancedGeometry {
    /// Shared per-vertex data.
    #[must_use]
    pub fn base(&self) -> &Arc<BaseGeometry> {
        &self.base
    }

    /// Number of instances every attribute is sized for.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    /// All instance attributes, `positions` first, then in spec order.
    #[must_use]
    pub fn attributes(&self) -> &[InstanceAttribute] {
        &self.attributes
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&InstanceAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Slot of the named attribute in [`attributes`](Self::attributes).
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Attribute at a slot previously returned by
    /// [`attribute_index`](Self::attribute_index).
    #[must_use]
    pub fn attribute_at(&self, slot: usize) -> &InstanceAttribute {
        &self.attributes[slot]
    }

    /// Mutable attribute at a resolved slot.
    pub fn attribute_at_mut(&mut self, slot: usize) -> &mut InstanceAttribute {
        &mut self.attributes[slot]
    }
}

/// Extend `source` with zeroed per-instance attributes for `count`
/// instances.
///
/// The result shares `source`'s vertex streams and index buffer. It always
/// carries a 3-wide `positions` attribute followed by one attribute per
/// entry of `specs`. No validation is done on `source`: a missing vertex
/// stream stays missing.
#[must_use]
pub fn build_instanced_geometry(
    source: &Arc<BaseGeometry>,
    specs: &[AttributeSpec],
    count: usize,
) -> InstancedGeometry {
    let mut attributes = Vec::with_capacity(specs.len() + 1);
    attributes.push(InstanceAttribute::zeroed(POSITIONS_ATTRIBUTE, 3, count));
    attributes.extend(
        specs
            .iter()
            .map(|spec| InstanceAttribute::zeroed(spec.name, spec.item_size, count)),
    );

    InstancedGeometry {
        base: Arc::clone(source),
        attributes,
        instance_count: count,
    }
}
