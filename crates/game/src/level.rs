//! Levels: collision geometry, ladders and spawn points.

use std::rc::Rc;

use ascend_motion::{Ladder, LadderSet};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionWorld;

/// A level the character can move through.
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Static collision geometry.
    pub collision: Rc<CollisionWorld>,

    /// Climbable ladders.
    pub ladders: Rc<LadderSet>,

    /// Player spawn points.
    pub spawn_points: Vec<SpawnPoint>,
}

/// A place the character can start from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Feet position in world space.
    pub position: Vec3,

    /// Initial facing (yaw in radians, 0 faces -Z).
    pub facing: f32,
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self::from_parts(id, name, CollisionWorld::new(), LadderSet::default(), Vec::new())
    }

    pub fn from_parts(
        id: &str,
        name: &str,
        collision: CollisionWorld,
        ladders: LadderSet,
        spawn_points: Vec<SpawnPoint>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: Rc::new(collision),
            ladders: Rc::new(ladders),
            spawn_points,
        }
    }

    /// A floor, a tower with a ladder up its front face and a low crouch
    /// tunnel.
    ///
    /// ```text
    ///        z=-4.5 ┌──────┐
    ///               │tower │  top at y=4
    ///        z=-1.5 └──╫───┘  ladder at x=0, climber faces -Z
    ///                  ●      spawn (0, 0, 3)
    ///                             ▭ tunnel at x=6, ceiling from y=1.2
    /// ```
    pub fn test_arena() -> Self {
        let mut collision = CollisionWorld::new();

        // Floor
        collision.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));

        // Tower
        collision.add_box(Vec3::new(0.0, 2.0, -3.0), Vec3::new(2.0, 2.0, 1.5));

        // Tunnel ceiling, open on all sides
        collision.add_box(Vec3::new(6.0, 1.6, 0.0), Vec3::new(1.5, 0.4, 1.5));

        let mut ladders = LadderSet::default();
        ladders.add(Ladder::new(1, Vec3::new(0.0, 0.0, -1.5), 4.0, Vec3::NEG_Z));

        let spawn_points = vec![
            SpawnPoint {
                position: Vec3::new(0.0, 0.0, 3.0),
                facing: 0.0,
            },
            SpawnPoint {
                position: Vec3::new(6.0, 0.0, 0.0),
                facing: std::f32::consts::FRAC_PI_2,
            },
        ];

        Self::from_parts("test_arena", "Test Arena", collision, ladders, spawn_points)
    }

    /// Get a spawn point by index.
    pub fn spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawn_points.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_creation() {
        let level = Level::new("test", "Test Level");
        assert_eq!(level.id, "test");
        assert_eq!(level.collision.brush_count(), 0);
        assert!(level.ladders.is_empty());
        assert!(level.spawn(0).is_none());
    }

    #[test]
    fn test_test_arena() {
        let level = Level::test_arena();
        assert_eq!(level.collision.brush_count(), 3);
        assert_eq!(level.ladders.len(), 1);
        assert_eq!(level.spawn_points.len(), 2);
    }

    #[test]
    fn test_ladder_sits_on_tower_face() {
        let level = Level::test_arena();
        let ladder = level.ladders.get(1).expect("tower ladder");

        // Just in front of the face is open; just behind it is solid
        let capsule = ascend_motion::CapsuleDimensions::default();
        assert!(!level.collision.capsule_overlaps(Vec3::new(0.0, 0.0, -1.0), capsule));
        assert!(level.collision.capsule_overlaps(Vec3::new(0.0, 0.0, -1.6), capsule));
        assert!((ladder.top.y - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_spawns_start_on_the_floor() {
        let level = Level::test_arena();
        for spawn in &level.spawn_points {
            let hit = level
                .collision
                .raycast(spawn.position + Vec3::Y * 0.5, Vec3::NEG_Y, 1.0)
                .expect("floor below spawn");
            assert!((hit.point.y - 0.0).abs() < 1e-3);
        }
    }
}
