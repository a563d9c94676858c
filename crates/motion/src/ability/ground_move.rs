//! Walking on the ground and steering in the air.

use std::any::Any;
use std::rc::Rc;

use glam::Vec3;

use super::MovementAbility;
use crate::action::{MoveAction, SharedActions};
use crate::config::ConfigValue;
use crate::context::CharacterContext;
use crate::math;
use crate::motor::KinematicMotor;
use crate::state::CharacterState;

/// Squared input length below which the character is considered idle.
const MOVE_DEADZONE_SQ: f32 = 0.01;

pub struct GroundMoveAbility {
    actions: SharedActions,
    state: Rc<CharacterState>,
    walk_speed: ConfigValue,
    acceleration: ConfigValue,
    deceleration: ConfigValue,
    air_acceleration: ConfigValue,
    air_control: ConfigValue,
}

/// Tunables read for one step.
struct Tuning {
    walk_speed: f32,
    acceleration: f32,
    deceleration: f32,
    air_acceleration: f32,
    air_control: f32,
}

impl GroundMoveAbility {
    pub const PRIORITY: i32 = 10;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            state: Rc::clone(&ctx.state),
            walk_speed: ctx.config.observe("movement.walk_speed"),
            acceleration: ctx.config.observe("movement.acceleration"),
            deceleration: ctx.config.observe("movement.deceleration"),
            air_acceleration: ctx.config.observe("movement.air_acceleration"),
            air_control: ctx.config.observe("movement.air_control"),
        }
    }

    fn tuning(&self) -> Option<Tuning> {
        Some(Tuning {
            walk_speed: self.walk_speed.get()?,
            acceleration: self.acceleration.get()?,
            deceleration: self.deceleration.get()?,
            air_acceleration: self.air_acceleration.get()?,
            air_control: self.air_control.get()?,
        })
    }

    /// World-space move direction from the move action, length at most 1.
    fn wish_direction(&self, motor: &dyn KinematicMotor) -> Vec3 {
        match self.actions.borrow().try_get::<MoveAction>() {
            Some(m) => {
                let local = math::local_move_direction(m.direction);
                (motor.transient_rotation() * local).clamp_length_max(1.0)
            }
            None => Vec3::ZERO,
        }
    }

    fn grounded_velocity(
        motor: &dyn KinematicMotor,
        velocity: &mut Vec3,
        wish: Vec3,
        tuning: &Tuning,
        dt: f32,
    ) {
        let normal = motor.ground_normal();
        let on_ground = math::project_on_plane(*velocity, normal);
        let speed = on_ground.length();

        if wish.length_squared() > MOVE_DEADZONE_SQ {
            let direction = motor.direction_tangent_to_surface(wish.normalize(), normal);
            let new_speed = math::move_towards(speed, tuning.walk_speed, tuning.acceleration * dt);
            *velocity = direction * new_speed;
        } else if speed > 0.01 {
            let new_speed = math::move_towards(speed, 0.0, tuning.deceleration * dt);
            *velocity = on_ground / speed * new_speed;
        } else {
            *velocity = Vec3::ZERO;
        }
    }

    fn airborne_velocity(
        motor: &dyn KinematicMotor,
        velocity: &mut Vec3,
        wish: Vec3,
        tuning: &Tuning,
        dt: f32,
    ) {
        let up = motor.up();
        let target = wish * (tuning.walk_speed * tuning.air_control);
        let horizontal = math::project_on_plane(*velocity, up);
        let horizontal =
            math::move_towards_vec3(horizontal, target, tuning.air_acceleration * dt);
        *velocity = horizontal + math::project(*velocity, up);
    }
}

impl MovementAbility for GroundMoveAbility {
    fn name(&self) -> &'static str {
        "ground_move"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn update_velocity(
        &mut self,
        motor: &mut dyn KinematicMotor,
        velocity: &mut Vec3,
        dt: f32,
    ) -> bool {
        let Some(tuning) = self.tuning() else {
            return false;
        };

        let wish = self.wish_direction(motor);
        self.state.set_moving(wish.length_squared() > MOVE_DEADZONE_SQ);

        if motor.is_stable_on_ground() && !motor.must_unground() {
            Self::grounded_velocity(motor, velocity, wish, &tuning, dt);
        } else {
            Self::airborne_velocity(motor, velocity, wish, &tuning, dt);
        }
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
