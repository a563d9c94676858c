//! Sprinting on the ground.

use std::any::Any;
use std::rc::Rc;

use glam::Vec3;

use super::MovementAbility;
use crate::action::{SharedActions, SprintAction};
use crate::config::ConfigValue;
use crate::context::CharacterContext;
use crate::math;
use crate::motor::KinematicMotor;
use crate::state::CharacterState;

pub struct SprintAbility {
    actions: SharedActions,
    state: Rc<CharacterState>,
    speed: ConfigValue,
    acceleration: ConfigValue,
}

impl SprintAbility {
    pub const PRIORITY: i32 = 5;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            state: Rc::clone(&ctx.state),
            speed: ctx.config.observe("sprint.speed"),
            acceleration: ctx.config.observe("sprint.acceleration"),
        }
    }
}

impl MovementAbility for SprintAbility {
    fn name(&self) -> &'static str {
        "sprint"
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
        let (Some(speed), Some(acceleration)) = (self.speed.get(), self.acceleration.get()) else {
            return false;
        };

        let wants_sprint = self.actions.borrow().has::<SprintAction>();
        let grounded = motor.is_stable_on_ground();
        self.state.set_sprinting(wants_sprint && grounded);

        if !wants_sprint || !grounded {
            return false;
        }

        let up = motor.up();
        let horizontal = math::project_on_plane(*velocity, up);
        let current = horizontal.length();
        if current < 0.01 {
            return false;
        }

        let target = math::move_towards(current, speed, acceleration * dt);
        *velocity = horizontal / current * target + math::project(*velocity, up);
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::testing;
    use crate::motor::mock::MockMotor;

    #[test]
    fn test_sprint_raises_speed() {
        let ctx = testing::context();
        let mut sprint = SprintAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(SprintAction {});

        let mut velocity = Vec3::new(0.0, 0.0, -5.0);
        sprint.update_velocity(&mut motor, &mut velocity, 0.1);

        // 5 + 15 * 0.1
        assert!((velocity.z + 6.5).abs() < 1e-4);
        assert!(ctx.state.is_sprinting());
    }

    #[test]
    fn test_standing_still_does_not_sprint() {
        let ctx = testing::context();
        let mut sprint = SprintAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(SprintAction {});

        let mut velocity = Vec3::ZERO;
        sprint.update_velocity(&mut motor, &mut velocity, 0.1);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_airborne_clears_sprinting() {
        let ctx = testing::context();
        let mut sprint = SprintAbility::new(&ctx);
        let mut motor = MockMotor {
            grounded: false,
            ..Default::default()
        };
        ctx.actions.borrow_mut().set(SprintAction {});
        ctx.state.set_sprinting(true);

        let mut velocity = Vec3::new(0.0, 0.0, -5.0);
        sprint.update_velocity(&mut motor, &mut velocity, 0.1);
        assert!(!ctx.state.is_sprinting());
        assert_eq!(velocity.z, -5.0);
    }
}
