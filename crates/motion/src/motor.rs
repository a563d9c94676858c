//! Kinematic motor contract and the callback adapter.
//!
//! The motor owns the physics step (sweeps, penetration recovery, ground
//! probing). It calls back into a [`MotorCallbacks`] implementation at four
//! fixed points per step; [`CharacterMotor`] forwards those to the
//! [`AbilityStack`] and publishes the post-step grounded flag and velocity
//! into [`CharacterState`].

use std::rc::Rc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::ability::{AbilityStack, StepReport};
use crate::state::CharacterState;

/// Character capsule shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleDimensions {
    pub radius: f32,
    /// Total height including both caps.
    pub height: f32,
    /// Height of the capsule center above the character's feet.
    pub y_offset: f32,
}

impl Default for CapsuleDimensions {
    fn default() -> Self {
        Self {
            radius: 0.4,
            height: 1.8,
            y_offset: 0.9,
        }
    }
}

impl CapsuleDimensions {
    /// Capsule of `height` resting on the feet.
    pub fn with_height(self, height: f32) -> Self {
        let height = height.max(self.radius * 2.0);
        Self {
            radius: self.radius,
            height,
            y_offset: height * 0.5,
        }
    }

    /// Half-length of the cylindrical section.
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// What abilities may query and command on the motor.
pub trait KinematicMotor {
    /// World up axis for this character.
    fn up(&self) -> Vec3 {
        Vec3::Y
    }

    /// Standing on walkable ground after the last ground check.
    fn is_stable_on_ground(&self) -> bool;

    /// Touching any ground, walkable or not.
    fn found_any_ground(&self) -> bool;

    fn ground_normal(&self) -> Vec3;

    fn velocity(&self) -> Vec3;

    fn position(&self) -> Vec3;

    /// Position being solved this step.
    fn transient_position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    /// Rotation being solved this step.
    fn transient_rotation(&self) -> Quat;

    fn capsule(&self) -> CapsuleDimensions;

    fn set_capsule(&mut self, capsule: CapsuleDimensions);

    /// True if the current capsule at the transient position overlaps
    /// level geometry.
    fn character_collisions_overlap(&self) -> bool;

    /// Skip ground snapping for the current step.
    fn force_unground(&mut self);

    /// True if `force_unground` was called this step.
    fn must_unground(&self) -> bool;

    fn set_movement_collisions_solving(&mut self, enabled: bool);

    fn set_ground_solving(&mut self, enabled: bool);

    /// False when the motor's transform is not usable this step.
    fn is_transform_valid(&self) -> bool {
        true
    }

    /// Reorient `direction` along a surface, keeping its heading.
    fn direction_tangent_to_surface(&self, direction: Vec3, surface_normal: Vec3) -> Vec3 {
        let right = direction.cross(self.up());
        surface_normal.cross(right).normalize_or_zero()
    }

    /// Velocity that moves from `from` to `to` in exactly `dt`.
    fn velocity_for_move_position(&self, from: Vec3, to: Vec3, dt: f32) -> Vec3 {
        if dt <= 0.0 {
            return Vec3::ZERO;
        }
        (to - from) / dt
    }
}

/// The four callback points of a motor step, in call order.
pub trait MotorCallbacks {
    fn before_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32);

    fn update_rotation(&mut self, motor: &mut dyn KinematicMotor, rotation: &mut Quat, dt: f32);

    fn update_velocity(&mut self, motor: &mut dyn KinematicMotor, velocity: &mut Vec3, dt: f32);

    fn after_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32);
}

/// Adapter between a motor and an ability stack.
pub struct CharacterMotor {
    stack: AbilityStack,
    state: Rc<CharacterState>,
}

impl CharacterMotor {
    pub fn new(stack: AbilityStack, state: Rc<CharacterState>) -> Self {
        Self { stack, state }
    }

    pub fn stack(&self) -> &AbilityStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut AbilityStack {
        &mut self.stack
    }

    pub fn state(&self) -> &Rc<CharacterState> {
        &self.state
    }

    /// Which abilities claimed the last step.
    pub fn last_report(&self) -> StepReport {
        self.stack.report()
    }
}

impl MotorCallbacks for CharacterMotor {
    fn before_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32) {
        self.stack.before_update(motor, dt);
    }

    fn update_rotation(&mut self, motor: &mut dyn KinematicMotor, rotation: &mut Quat, dt: f32) {
        self.stack.update_rotation(motor, rotation, dt);
    }

    fn update_velocity(&mut self, motor: &mut dyn KinematicMotor, velocity: &mut Vec3, dt: f32) {
        self.stack.update_velocity(motor, velocity, dt);
    }

    fn after_update(&mut self, motor: &mut dyn KinematicMotor, dt: f32) {
        self.stack.after_update(motor, dt);

        self.state.set_grounded(motor.is_stable_on_ground());
        self.state.set_velocity(motor.velocity());
    }
}
