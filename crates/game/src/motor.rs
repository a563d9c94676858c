//! Reference kinematic motor over a [`CollisionWorld`].
//!
//! One step: callbacks pick rotation and velocity, the capsule moves, then
//! penetration recovery and ground probing correct the result. This is a
//! discrete mover (no sweeps); steps must stay short relative to the
//! capsule radius.

use std::rc::Rc;

use ascend_motion::{CapsuleDimensions, KinematicMotor, MotorCallbacks};
use glam::{Quat, Vec3};

use crate::collision::CollisionWorld;

/// How far above the feet the ground ray starts.
const GROUND_RAY_LIFT: f32 = 0.5;

/// How far below the feet ground is still snapped to.
const GROUND_SNAP_DISTANCE: f32 = 0.1;

/// Minimum up component of a walkable ground normal (about 45 degrees).
const MIN_STABLE_NORMAL_Y: f32 = 0.7;

/// Rising faster than this skips ground probing.
const MAX_GROUND_RISE_SPEED: f32 = 0.1;

/// Shrink applied to overlap tests so resting contact does not count.
const OVERLAP_SKIN: f32 = 0.02;
const OVERLAP_LIFT: f32 = 0.05;

/// Result of the last ground check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundStatus {
    pub stable: bool,
    pub found_any: bool,
    pub normal: Vec3,
}

impl Default for GroundStatus {
    fn default() -> Self {
        Self {
            stable: false,
            found_any: false,
            normal: Vec3::Y,
        }
    }
}

pub struct SimpleMotor {
    world: Rc<CollisionWorld>,

    position: Vec3,
    transient_position: Vec3,
    rotation: Quat,
    transient_rotation: Quat,
    velocity: Vec3,
    capsule: CapsuleDimensions,

    ground: GroundStatus,
    must_unground: bool,
    collisions_solving: bool,
    ground_solving: bool,
}

impl SimpleMotor {
    pub fn new(world: Rc<CollisionWorld>, position: Vec3) -> Self {
        Self {
            world,
            position,
            transient_position: position,
            rotation: Quat::IDENTITY,
            transient_rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            capsule: CapsuleDimensions::default(),
            ground: GroundStatus::default(),
            must_unground: false,
            collisions_solving: true,
            ground_solving: true,
        }
    }

    /// Teleport, keeping velocity.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.transient_position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.transient_rotation = rotation;
    }

    pub fn ground(&self) -> GroundStatus {
        self.ground
    }

    pub fn is_collisions_solving(&self) -> bool {
        self.collisions_solving
    }

    pub fn is_ground_solving(&self) -> bool {
        self.ground_solving
    }

    /// Advance the character by one step, calling into `callbacks` at the
    /// four callback points.
    pub fn step(&mut self, callbacks: &mut dyn MotorCallbacks, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.transient_position = self.position;
        self.transient_rotation = self.rotation;

        callbacks.before_update(self, dt);

        let mut rotation = self.transient_rotation;
        callbacks.update_rotation(self, &mut rotation, dt);
        self.transient_rotation = rotation.normalize();

        let mut velocity = self.velocity;
        callbacks.update_velocity(self, &mut velocity, dt);
        self.velocity = velocity;

        self.move_capsule(dt);
        self.detect_ground();

        self.position = self.transient_position;
        self.rotation = self.transient_rotation;

        callbacks.after_update(self, dt);
        self.must_unground = false;
    }

    fn move_capsule(&mut self, dt: f32) {
        let target = self.transient_position + self.velocity * dt;
        if !self.collisions_solving {
            self.transient_position = target;
            return;
        }

        let resolved = self.world.resolve_penetration(target, self.capsule);
        let push = resolved - target;
        if push.length_squared() > 1e-12 {
            // Drop the part of the velocity driving into the surface
            let normal = push.normalize();
            let into = self.velocity.dot(normal);
            if into < 0.0 {
                self.velocity -= normal * into;
            }
        }
        self.transient_position = resolved;
    }

    fn detect_ground(&mut self) {
        self.ground = GroundStatus::default();
        if !self.ground_solving || self.must_unground {
            return;
        }

        let up = self.up();
        if self.velocity.dot(up) > MAX_GROUND_RISE_SPEED {
            return;
        }

        let origin = self.transient_position + up * GROUND_RAY_LIFT;
        let Some(hit) = self
            .world
            .raycast(origin, -up, GROUND_RAY_LIFT + GROUND_SNAP_DISTANCE)
        else {
            return;
        };

        self.ground.found_any = true;
        self.ground.normal = hit.normal;
        if hit.normal.dot(up) < MIN_STABLE_NORMAL_Y {
            return;
        }

        self.ground.stable = true;
        self.transient_position = origin - up * hit.distance;

        let vertical = self.velocity.dot(up);
        if vertical < 0.0 {
            self.velocity -= up * vertical;
        }
    }
}

impl KinematicMotor for SimpleMotor {
    fn is_stable_on_ground(&self) -> bool {
        self.ground.stable && !self.must_unground
    }

    fn found_any_ground(&self) -> bool {
        self.ground.found_any
    }

    fn ground_normal(&self) -> Vec3 {
        self.ground.normal
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn transient_position(&self) -> Vec3 {
        self.transient_position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn transient_rotation(&self) -> Quat {
        self.transient_rotation
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    fn set_capsule(&mut self, capsule: CapsuleDimensions) {
        self.capsule = capsule;
    }

    fn character_collisions_overlap(&self) -> bool {
        let skinned = CapsuleDimensions {
            radius: (self.capsule.radius - OVERLAP_SKIN).max(0.01),
            ..self.capsule
        };
        let feet = self.transient_position + self.up() * OVERLAP_LIFT;
        self.world.capsule_overlaps(feet, skinned)
    }

    fn force_unground(&mut self) {
        self.must_unground = true;
    }

    fn must_unground(&self) -> bool {
        self.must_unground
    }

    fn set_movement_collisions_solving(&mut self, enabled: bool) {
        self.collisions_solving = enabled;
    }

    fn set_ground_solving(&mut self, enabled: bool) {
        self.ground_solving = enabled;
    }

    fn is_transform_valid(&self) -> bool {
        self.transient_position.is_finite() && self.transient_rotation.is_finite()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Callbacks that hold a fixed velocity.
    struct Drive {
        velocity: Vec3,
        unground: bool,
    }

    impl Drive {
        fn new(velocity: Vec3) -> Self {
            Self {
                velocity,
                unground: false,
            }
        }
    }

    impl MotorCallbacks for Drive {
        fn before_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {}

        fn update_rotation(&mut self, _motor: &mut dyn KinematicMotor, _rotation: &mut Quat, _dt: f32) {}

        fn update_velocity(&mut self, motor: &mut dyn KinematicMotor, velocity: &mut Vec3, _dt: f32) {
            *velocity = self.velocity;
            if self.unground {
                motor.force_unground();
            }
        }

        fn after_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {}
    }

    fn create_world() -> Rc<CollisionWorld> {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));
        world.add_box(Vec3::new(0.0, 2.0, -3.0), Vec3::new(2.0, 2.0, 1.5));
        Rc::new(world)
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_snaps_to_ground() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::new(0.0, 0.05, 3.0));
        motor.step(&mut Drive::new(Vec3::ZERO), DT);

        assert!(motor.is_stable_on_ground());
        assert!(motor.position().y.abs() < 1e-3);
    }

    #[test]
    fn test_airborne_above_snap_distance() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::new(0.0, 2.0, 3.0));
        motor.step(&mut Drive::new(Vec3::ZERO), DT);

        assert!(!motor.is_stable_on_ground());
        assert!(!motor.found_any_ground());
        assert!((motor.position().y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_stops_movement() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::new(0.0, 0.0, 0.0));
        let mut drive = Drive::new(Vec3::new(0.0, 0.0, -5.0));
        for _ in 0..120 {
            motor.step(&mut drive, DT);
        }

        // Front face at z=-1.5, capsule radius 0.4
        assert!((motor.position().z - -1.1).abs() < 0.02);
        assert!(motor.is_stable_on_ground());
    }

    #[test]
    fn test_disabled_collisions_pass_through() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::new(0.0, 0.0, 0.0));
        motor.set_movement_collisions_solving(false);
        motor.set_ground_solving(false);

        let mut drive = Drive::new(Vec3::new(0.0, 0.0, -5.0));
        for _ in 0..30 {
            motor.step(&mut drive, DT);
        }
        assert!(motor.position().z < -2.0);
        assert!(!motor.found_any_ground());
    }

    #[test]
    fn test_force_unground_skips_ground_check() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::ZERO);
        let mut drive = Drive::new(Vec3::ZERO);
        drive.unground = true;
        motor.step(&mut drive, DT);

        assert!(!motor.is_stable_on_ground());
        assert!(!motor.must_unground(), "cleared after the step");
    }

    #[test]
    fn test_overlap_ignores_resting_contact() {
        let mut motor = SimpleMotor::new(create_world(), Vec3::ZERO);
        assert!(!motor.character_collisions_overlap());

        // Inside the tower
        motor.set_position(Vec3::new(0.0, 0.0, -3.0));
        assert!(motor.character_collisions_overlap());
    }
}
