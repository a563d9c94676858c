//! Movement abilities.
//!
//! An ability is a stateful unit that may adjust or replace the velocity and
//! rotation the motor is about to integrate. Abilities run in priority order
//! (highest first) inside an [`AbilityStack`]; returning `true` from an
//! update claims the step and hides it from every lower-priority ability.
//!
//! | Ability        | Priority | Claims                              |
//! |----------------|----------|-------------------------------------|
//! | Ladder climb   | 50       | velocity, while attached            |
//! | Jump           | 30       | never                               |
//! | Ground move    | 10       | never                               |
//! | Body rotation  | 10       | rotation                            |
//! | Sprint         | 5        | never                               |
//! | Crouch         | 3        | never                               |
//! | Gravity        | 0        | never                               |

mod body_rotation;
mod crouch;
mod gravity;
mod ground_move;
mod jump;
mod ladder_climb;
mod sprint;
mod stack;

use std::any::Any;

use glam::{Quat, Vec3};

use crate::context::CharacterContext;
use crate::motor::KinematicMotor;

pub use body_rotation::BodyRotationAbility;
pub use crouch::CrouchAbility;
pub use gravity::GravityAbility;
pub use ground_move::GroundMoveAbility;
pub use jump::{JumpAbility, JumpTimers};
pub use ladder_climb::{ClimbState, LadderClimbAbility};
pub use sprint::SprintAbility;
pub use stack::{AbilityStack, StepReport};

/// Standard gravity (meters/second²), applied along the motor's down axis.
pub const WORLD_GRAVITY: f32 = 9.81;

/// A unit of locomotion behavior driven by the motor callbacks.
pub trait MovementAbility: Any {
    /// Stable identifier for logs, reports and enable/disable by name.
    fn name(&self) -> &'static str;

    /// Higher runs earlier.
    fn priority(&self) -> i32;

    fn before_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {}

    /// Adjust `rotation`. Return `true` to claim the rotation exclusively.
    fn update_rotation(
        &mut self,
        _motor: &mut dyn KinematicMotor,
        _rotation: &mut Quat,
        _dt: f32,
    ) -> bool {
        false
    }

    /// Adjust `velocity`. Return `true` to claim the velocity exclusively.
    fn update_velocity(
        &mut self,
        _motor: &mut dyn KinematicMotor,
        _velocity: &mut Vec3,
        _dt: f32,
    ) -> bool {
        false
    }

    /// Runs for every enabled ability after integration.
    fn after_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {}

    /// Called when the ability is disabled or leaves the stack while
    /// enabled. Release any motor modes taken over here.
    fn on_disabled(&mut self, _motor: &mut dyn KinematicMotor) {}

    fn as_any(&self) -> &dyn Any;
}

/// The stack of every reference ability, bound to `ctx`.
pub fn reference_stack(ctx: &CharacterContext) -> AbilityStack {
    let mut stack = AbilityStack::new();
    stack.add(Box::new(GravityAbility::new(ctx)));
    stack.add(Box::new(GroundMoveAbility::new(ctx)));
    stack.add(Box::new(BodyRotationAbility::new(ctx)));
    stack.add(Box::new(SprintAbility::new(ctx)));
    stack.add(Box::new(CrouchAbility::new(ctx)));
    stack.add(Box::new(JumpAbility::new(ctx)));
    stack.add(Box::new(LadderClimbAbility::new(ctx)));
    stack
}
