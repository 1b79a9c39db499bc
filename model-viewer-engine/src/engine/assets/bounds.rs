use bevy::prelude::*;
use bevy::render::primitives::Aabb;

/// World-space axis-aligned bounds of a model subtree.
///
/// Only valid for the exact subtree state at computation time; any mutation
/// of the subtree (scale, added children, variant switch) invalidates it, so
/// callers recompute before relying on it again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted bounds ready to accumulate points.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Accumulate a mesh-local AABB transformed into world space.
    pub fn include_aabb(&mut self, aabb: &Aabb, transform: &GlobalTransform) {
        for corner in aabb_corners(aabb) {
            self.include_point(transform.transform_point(corner));
        }
    }

    pub fn union(&self, other: &ModelBounds) -> ModelBounds {
        ModelBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Centre point for camera targeting.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest axis extent. Framing on this rather than depth alone keeps
    /// flat or tall models fully visible.
    pub fn max_extent(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// True when nothing was accumulated or the box has no volume along
    /// any axis worth framing.
    pub fn is_degenerate(&self) -> bool {
        let extent = self.max_extent();
        !self.min.cmple(self.max).all() || !extent.is_finite() || extent <= 0.0
    }
}

/// Compute world-space bounds over every mesh node under `root`.
/// Returns `None` until at least one mesh volume is available, which can
/// take a few frames while the scene instance spawns.
pub fn compute_subtree_bounds(
    root: Entity,
    children: &Query<&Children>,
    volumes: &Query<(&Aabb, &GlobalTransform), With<Mesh3d>>,
) -> Option<ModelBounds> {
    let mut bounds = ModelBounds::empty();
    let mut found = false;
    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        if let Ok((aabb, transform)) = volumes.get(entity) {
            bounds.include_aabb(aabb, transform);
            found = true;
        }
    }
    found.then_some(bounds)
}

/// Eight corners of a mesh-local AABB.
fn aabb_corners(aabb: &Aabb) -> [Vec3; 8] {
    let min = Vec3::from(aabb.min());
    let max = Vec3::from(aabb.max());
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_points() {
        let mut bounds = ModelBounds::empty();
        bounds.include_point(Vec3::new(-1.0, 2.0, 0.5));
        bounds.include_point(Vec3::new(3.0, -2.0, 0.0));
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 0.5));
        assert_eq!(bounds.center(), Vec3::new(1.0, 0.0, 0.25));
        assert_eq!(bounds.size(), Vec3::new(4.0, 4.0, 0.5));
        assert_eq!(bounds.max_extent(), 4.0);
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = ModelBounds::from_min_max(Vec3::splat(-1.0), Vec3::ZERO);
        let b = ModelBounds::from_min_max(Vec3::ZERO, Vec3::splat(2.0));
        let union = a.union(&b);
        assert_eq!(union.min, Vec3::splat(-1.0));
        assert_eq!(union.max, Vec3::splat(2.0));
    }

    #[test]
    fn empty_and_flat_boxes_are_degenerate() {
        assert!(ModelBounds::empty().is_degenerate());
        let point = ModelBounds::from_min_max(Vec3::ONE, Vec3::ONE);
        assert!(point.is_degenerate());
        let cube = ModelBounds::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(!cube.is_degenerate());
        // A plane still has a largest extent worth framing.
        let plane = ModelBounds::from_min_max(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        assert!(!plane.is_degenerate());
    }

    #[test]
    fn world_transform_applies_to_local_aabb() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transform = GlobalTransform::from(Transform::from_xyz(10.0, 0.0, 0.0));
        let mut bounds = ModelBounds::empty();
        bounds.include_aabb(&aabb, &transform);
        assert_eq!(bounds.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn scaled_transform_grows_bounds() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transform = GlobalTransform::from(Transform::from_scale(Vec3::splat(2.0)));
        let mut bounds = ModelBounds::empty();
        bounds.include_aabb(&aabb, &transform);
        assert_eq!(bounds.size(), Vec3::splat(4.0));
    }
}
