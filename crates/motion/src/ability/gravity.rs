//! Gravity while airborne.

use std::any::Any;

use glam::Vec3;

use super::{MovementAbility, WORLD_GRAVITY};
use crate::config::ConfigValue;
use crate::context::CharacterContext;
use crate::motor::KinematicMotor;

pub struct GravityAbility {
    multiplier: ConfigValue,
    fall_multiplier: ConfigValue,
    max_fall_speed: ConfigValue,
}

impl GravityAbility {
    pub const PRIORITY: i32 = 0;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            multiplier: ctx.config.observe("gravity.multiplier"),
            fall_multiplier: ctx.config.observe("gravity.fall_multiplier"),
            max_fall_speed: ctx.config.observe("gravity.max_fall_speed"),
        }
    }
}

impl MovementAbility for GravityAbility {
    fn name(&self) -> &'static str {
        "gravity"
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
        let (Some(multiplier), Some(fall_multiplier), Some(max_fall_speed)) = (
            self.multiplier.get(),
            self.fall_multiplier.get(),
            self.max_fall_speed.get(),
        ) else {
            return false;
        };

        if motor.is_stable_on_ground() {
            return false;
        }

        let up = motor.up();
        let scale = if velocity.dot(up) < 0.0 {
            fall_multiplier
        } else {
            multiplier
        };
        *velocity += -up * WORLD_GRAVITY * scale * dt;

        // Terminal velocity
        let vertical = velocity.dot(up);
        if vertical < -max_fall_speed {
            *velocity += up * (-max_fall_speed - vertical);
        }

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
    fn test_no_gravity_on_ground() {
        let mut gravity = GravityAbility::new(&testing::context());
        let mut motor = MockMotor::default();
        let mut velocity = Vec3::new(1.0, 0.0, 0.0);

        assert!(!gravity.update_velocity(&mut motor, &mut velocity, 0.1));
        assert_eq!(velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rising_and_falling_multipliers() {
        let mut gravity = GravityAbility::new(&testing::context());
        let mut motor = MockMotor {
            grounded: false,
            ..Default::default()
        };

        let mut rising = Vec3::new(0.0, 5.0, 0.0);
        gravity.update_velocity(&mut motor, &mut rising, 0.1);
        assert!((rising.y - (5.0 - 9.81 * 2.0 * 0.1)).abs() < 1e-4);

        let mut falling = Vec3::new(0.0, -1.0, 0.0);
        gravity.update_velocity(&mut motor, &mut falling, 0.1);
        assert!((falling.y - (-1.0 - 9.81 * 2.5 * 0.1)).abs() < 1e-4);
    }

    #[test]
    fn test_terminal_velocity() {
        let mut gravity = GravityAbility::new(&testing::context());
        let mut motor = MockMotor {
            grounded: false,
            ..Default::default()
        };
        let mut velocity = Vec3::new(2.0, -19.9, 0.0);

        gravity.update_velocity(&mut motor, &mut velocity, 0.1);
        assert!((velocity.y + 20.0).abs() < 1e-4);
        assert_eq!(velocity.x, 2.0);
    }

    #[test]
    fn test_unready_config_is_noop() {
        let mut gravity = GravityAbility::new(&testing::unready_context());
        let mut motor = MockMotor {
            grounded: false,
            ..Default::default()
        };
        let mut velocity = Vec3::ZERO;

        assert!(!gravity.update_velocity(&mut motor, &mut velocity, 0.1));
        assert_eq!(velocity, Vec3::ZERO);
    }
}
