//! Static level geometry for the reference motor.
//!
//! Brushes are parry3d shapes placed in world space. The motor asks three
//! things of the world: does a capsule overlap anything, push a capsule out
//! of whatever it overlaps, and where does a ray hit.

use ascend_motion::CapsuleDimensions;
use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Ray};
use parry3d::shape::SharedShape;

/// Penetration shallower than this is treated as resting contact.
const PENETRATION_SLOP: f32 = 0.001;

/// Push-out passes per resolve.
const RESOLVE_ITERATIONS: usize = 4;

/// A piece of collision geometry in the world.
#[derive(Clone)]
pub struct CollisionBrush {
    pub id: u32,
    pub shape: SharedShape,
    pub transform: Isometry<Real>,
}

/// Where a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// Surface normal at the hit, pointing away from the surface.
    pub normal: Vec3,
    pub brush: u32,
}

/// All static geometry of a level.
#[derive(Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        self.brushes.push(CollisionBrush {
            id,
            shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            transform: Isometry::translation(center.x, center.y, center.z),
        });
        id
    }

    /// Add a box spanning `min` to `max`.
    pub fn add_box_min_max(&mut self, min: Vec3, max: Vec3) -> u32 {
        self.add_box((min + max) * 0.5, (max - min) * 0.5)
    }

    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Check if a capsule standing at `feet` overlaps any brush.
    pub fn capsule_overlaps(&self, feet: Vec3, capsule: CapsuleDimensions) -> bool {
        let shape = capsule_shape(capsule);
        let transform = capsule_transform(feet, capsule);

        self.brushes.iter().any(|brush| {
            matches!(
                contact(&transform, shape.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0),
                Ok(Some(c)) if -c.dist > PENETRATION_SLOP
            )
        })
    }

    /// Push a capsule standing at `feet` out of solid geometry.
    ///
    /// Returns the corrected feet position.
    pub fn resolve_penetration(&self, feet: Vec3, capsule: CapsuleDimensions) -> Vec3 {
        let shape = capsule_shape(capsule);
        let mut position = feet;

        for _ in 0..RESOLVE_ITERATIONS {
            let transform = capsule_transform(position, capsule);
            let mut correction = Vec3::ZERO;

            for brush in &self.brushes {
                if let Ok(Some(c)) = contact(
                    &transform,
                    shape.as_ref(),
                    &brush.transform,
                    brush.shape.as_ref(),
                    0.0,
                ) {
                    // Negative dist means penetration; normal2 points out of the brush
                    let depth = -c.dist;
                    if depth > PENETRATION_SLOP {
                        let normal = Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z);
                        correction += normal * depth;
                    }
                }
            }

            if correction.length_squared() < 1e-12 {
                break;
            }
            position += correction;
        }

        position
    }

    /// Cast a ray and return the closest hit within `max_distance`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() < 0.5 {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<RayHit> = None;
        for brush in &self.brushes {
            let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, max_distance, true) else {
                continue;
            };
            if closest.map_or(false, |c| toi >= c.distance) {
                continue;
            }

            closest = Some(RayHit {
                distance: toi,
                point: origin + dir * toi,
                normal: hit_normal(&ray, toi, brush).unwrap_or(-dir),
                brush: brush.id,
            });
        }
        closest
    }
}

/// Surface normal where `ray` meets `brush` at `toi`.
fn hit_normal(ray: &Ray, toi: f32, brush: &CollisionBrush) -> Option<Vec3> {
    brush
        .shape
        .cast_ray_and_get_normal(&brush.transform, ray, toi + 0.01, true)
        .map(|hit| Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z))
}

/// Parry capsule for a character capsule; the segment runs along Y.
fn capsule_shape(capsule: CapsuleDimensions) -> SharedShape {
    SharedShape::capsule_y(capsule.half_segment(), capsule.radius)
}

fn capsule_transform(feet: Vec3, capsule: CapsuleDimensions) -> Isometry<Real> {
    Isometry::translation(feet.x, feet.y + capsule.y_offset, feet.z)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor with its top at y=0
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));

        // Wall at x=10
        world.add_box(Vec3::new(10.0, 2.5, 0.0), Vec3::new(0.5, 2.5, 10.0));

        world
    }

    #[test]
    fn test_raycast_hit() {
        let world = create_test_world();
        let hit = world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0);

        let hit = hit.expect("should hit the wall");
        assert!((hit.point.x - 9.5).abs() < 0.01);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-3);
    }

    #[test]
    fn test_raycast_miss() {
        let world = create_test_world();
        assert!(world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_X, 100.0).is_none());
        assert!(world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, 100.0).is_none());
    }

    #[test]
    fn test_raycast_down_finds_floor() {
        let world = create_test_world();
        let hit = world
            .raycast(Vec3::new(3.0, 0.5, 3.0), Vec3::NEG_Y, 1.0)
            .expect("floor below");
        assert!((hit.distance - 0.5).abs() < 1e-3);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_standing_capsule_does_not_overlap_floor() {
        let world = create_test_world();
        let capsule = CapsuleDimensions::default();
        assert!(!world.capsule_overlaps(Vec3::ZERO, capsule));
        assert!(world.capsule_overlaps(Vec3::new(0.0, -0.3, 0.0), capsule));
    }

    #[test]
    fn test_resolve_penetration_pushes_out_of_wall() {
        let world = create_test_world();
        let capsule = CapsuleDimensions::default();

        // Capsule surface 0.2 past the wall face at x=9.5
        let resolved = world.resolve_penetration(Vec3::new(9.3, 0.5, 0.0), capsule);
        assert!(resolved.x <= 9.1 + 1e-3);
        assert!(!world.capsule_overlaps(resolved, capsule));
    }

    #[test]
    fn test_resolve_penetration_pushes_up_from_floor() {
        let world = create_test_world();
        let capsule = CapsuleDimensions::default();

        let resolved = world.resolve_penetration(Vec3::new(0.0, -0.2, 0.0), capsule);
        assert!((resolved.y).abs() < 0.01);
    }
}
