//! Typed slots for the splash instance attributes.

use crate::{
    error::SplashError,
    geometry::{AttributeSpec, InstancedGeometry, POSITIONS_ATTRIBUTE},
};

/// Per-instance fade scalar; `<= 0` or `>= 1` triggers a reseed.
pub const BROKEN: AttributeSpec = AttributeSpec::new("broken", 1);
/// Per-instance opacity. Allocated but not animated or uploaded.
pub const OPACITY: AttributeSpec = AttributeSpec::new("opacity", 1);
/// Per-instance, per-axis scale.
pub const SCALES: AttributeSpec = AttributeSpec::new("scales", 3);
/// Per-instance rotation about Y, in radians.
pub const ROTATION: AttributeSpec = AttributeSpec::new("rotation", 1);

/// Extra attributes the splash requests on top of `positions`, in
/// allocation order.
pub const SPLASH_ATTRIBUTE_SPECS: [AttributeSpec; 4] =
    [BROKEN, OPACITY, SCALES, ROTATION];

/// Slots of the five splash attributes inside an [`InstancedGeometry`].
///
/// Resolved once after the geometry is built so the frame loop indexes
/// attributes directly instead of searching by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashAttributes {
    /// Slot of `positions` (vec3).
    pub positions: usize,
    /// Slot of `scales` (vec3).
    pub scales: usize,
    /// Slot of `rotation` (f32).
    pub rotation: usize,
    /// Slot of `broken` (f32).
    pub broken: usize,
    /// Slot of `opacity` (f32).
    pub opacity: usize,
}

impl SplashAttributes {
    /// Resolve every splash attribute in `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::MissingAttribute`] if an attribute is absent
    /// or has an unexpected item size.
    pub fn resolve(geometry: &InstancedGeometry) -> Result<Self, SplashError> {
        let slot = |spec: AttributeSpec| -> Result<usize, SplashError> {
            geometry
                .attribute_index(spec.name)
                .filter(|&i| geometry.attribute_at(i).item_size() == spec.item_size)
                .ok_or(SplashError::MissingAttribute(spec.name))
        };
        Ok(Self {
            positions: slot(AttributeSpec::new(POSITIONS_ATTRIBUTE, 3))?,
            scales: slot(SCALES)?,
            rotation: slot(ROTATION)?,
            broken: slot(BROKEN)?,
            opacity: slot(OPACITY)?,
        })
    }

    /// Slots rewritten on every frame, in upload order.
    #[must_use]
    pub fn animated(&self) -> [usize; 4] {
        [self.positions, self.scales, self.rotation, self.broken]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::geometry::{build_instanced_geometry, BaseGeometry};

    #[test]
    fn resolves_all_slots() {
        let geometry = build_instanced_geometry(
            &Arc::new(BaseGeometry::default()),
            &SPLASH_ATTRIBUTE_SPECS,
            2,
        );
        let slots = SplashAttributes::resolve(&geometry).unwrap();
        assert_eq!(geometry.attribute_at(slots.positions).name(), "positions");
        assert_eq!(geometry.attribute_at(slots.scales).name(), "scales");
        assert_eq!(geometry.attribute_at(slots.rotation).name(), "rotation");
        assert_eq!(geometry.attribute_at(slots.broken).name(), "broken");
        assert_eq!(geometry.attribute_at(slots.opacity).name(), "opacity");
    }

    #[test]
    fn missing_attribute_is_named() {
        let geometry = build_instanced_geometry(
            &Arc::new(BaseGeometry::default()),
            &[BROKEN, OPACITY, ROTATION],
            2,
        );
        let err = SplashAttributes::resolve(&geometry).unwrap_err();
        assert!(matches!(err, SplashError::MissingAttribute("scales")));
    }

    #[test]
    fn wrong_item_size_is_rejected() {
        let geometry = build_instanced_geometry(
            &Arc::new(BaseGeometry::default()),
            &[BROKEN, OPACITY, AttributeSpec::new("scales", 1), ROTATION],
            2,
        );
        assert!(SplashAttributes::resolve(&geometry).is_err());
    }
}
