//! Crouching: a shorter capsule and a lower speed cap.
//!
//! Standing back up happens after the motor step, and only if the standing
//! capsule fits at the solved position; otherwise the character stays
//! crouched and tries again next step.

use std::any::Any;
use std::rc::Rc;

use glam::Vec3;

use super::MovementAbility;
use crate::action::{CrouchAction, SharedActions};
use crate::config::ConfigValue;
use crate::context::CharacterContext;
use crate::math;
use crate::motor::{CapsuleDimensions, KinematicMotor};
use crate::state::CharacterState;

pub struct CrouchAbility {
    actions: SharedActions,
    state: Rc<CharacterState>,
    speed: ConfigValue,
    deceleration: ConfigValue,
    height_ratio: ConfigValue,
    /// Capsule recorded from the motor on first use.
    standing: Option<CapsuleDimensions>,
    crouching: bool,
}

impl CrouchAbility {
    pub const PRIORITY: i32 = 3;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            state: Rc::clone(&ctx.state),
            speed: ctx.config.observe("crouch.speed"),
            deceleration: ctx.config.observe("crouch.deceleration"),
            height_ratio: ctx.config.observe("crouch.height_ratio"),
            standing: None,
            crouching: false,
        }
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    fn crouched_capsule(standing: CapsuleDimensions, ratio: f32) -> CapsuleDimensions {
        standing.with_height(standing.height * ratio)
    }

    fn try_stand(&mut self, motor: &mut dyn KinematicMotor, ratio: f32) {
        let Some(standing) = self.standing else {
            return;
        };

        motor.set_capsule(standing);
        if motor.character_collisions_overlap() {
            motor.set_capsule(Self::crouched_capsule(standing, ratio));
            log::trace!("stand up blocked");
        } else {
            self.crouching = false;
            log::debug!("stood up");
        }
    }
}

impl MovementAbility for CrouchAbility {
    fn name(&self) -> &'static str {
        "crouch"
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
        let (Some(speed), Some(deceleration), Some(ratio)) = (
            self.speed.get(),
            self.deceleration.get(),
            self.height_ratio.get(),
        ) else {
            return false;
        };
        if !motor.is_transform_valid() {
            return false;
        }

        let standing = *self.standing.get_or_insert_with(|| motor.capsule());

        if self.actions.borrow().has::<CrouchAction>() && !self.crouching {
            self.crouching = true;
            motor.set_capsule(Self::crouched_capsule(standing, ratio));
            log::debug!("crouched");
        }

        if self.crouching && motor.is_stable_on_ground() {
            let up = motor.up();
            let horizontal = math::project_on_plane(*velocity, up);
            let current = horizontal.length();
            if current > speed {
                let target = math::move_towards(current, speed, deceleration * dt);
                *velocity = horizontal / current * target + math::project(*velocity, up);
            }
        }

        self.state.set_crouching(self.crouching);
        false
    }

    fn after_update(&mut self, motor: &mut dyn KinematicMotor, _dt: f32) {
        let Some(ratio) = self.height_ratio.get() else {
            return;
        };
        if !motor.is_transform_valid() {
            return;
        }

        if self.crouching && !self.actions.borrow().has::<CrouchAction>() {
            self.try_stand(motor, ratio);
            self.state.set_crouching(self.crouching);
        }
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
    fn test_crouch_shrinks_capsule() {
        let ctx = testing::context();
        let mut crouch = CrouchAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(CrouchAction {});

        let mut velocity = Vec3::ZERO;
        crouch.update_velocity(&mut motor, &mut velocity, 0.1);

        assert!(ctx.state.is_crouching());
        assert!((motor.capsule.height - 0.9).abs() < 1e-5);
        assert!((motor.capsule.y_offset - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_crouch_caps_speed() {
        let ctx = testing::context();
        let mut crouch = CrouchAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(CrouchAction {});

        let mut velocity = Vec3::new(5.0, 0.0, 0.0);
        crouch.update_velocity(&mut motor, &mut velocity, 0.1);
        // 5 - 20 * 0.1
        assert!((velocity.x - 3.0).abs() < 1e-4);

        crouch.update_velocity(&mut motor, &mut velocity, 0.1);
        assert!((velocity.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_stand_up_when_released() {
        let ctx = testing::context();
        let mut crouch = CrouchAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(CrouchAction {});
        let mut velocity = Vec3::ZERO;
        crouch.update_velocity(&mut motor, &mut velocity, 0.1);

        ctx.actions.borrow_mut().clear();
        crouch.after_update(&mut motor, 0.1);

        assert!(!ctx.state.is_crouching());
        assert_eq!(motor.capsule, CapsuleDimensions::default());
    }

    #[test]
    fn test_cannot_stand_under_ceiling() {
        let ctx = testing::context();
        let mut crouch = CrouchAbility::new(&ctx);
        let mut motor = MockMotor {
            blocked_above: 1.2,
            ..Default::default()
        };
        ctx.actions.borrow_mut().set(CrouchAction {});
        let mut velocity = Vec3::ZERO;
        crouch.update_velocity(&mut motor, &mut velocity, 0.1);

        ctx.actions.borrow_mut().clear();
        crouch.after_update(&mut motor, 0.1);
        assert!(ctx.state.is_crouching());
        assert!((motor.capsule.height - 0.9).abs() < 1e-5);

        // Ceiling gone: stands on the next attempt
        motor.blocked_above = f32::INFINITY;
        crouch.after_update(&mut motor, 0.1);
        assert!(!ctx.state.is_crouching());
    }

    #[test]
    fn test_invalid_transform_is_noop() {
        let ctx = testing::context();
        let mut crouch = CrouchAbility::new(&ctx);
        let mut motor = MockMotor {
            transform_valid: false,
            ..Default::default()
        };
        ctx.actions.borrow_mut().set(CrouchAction {});

        let mut velocity = Vec3::ZERO;
        crouch.update_velocity(&mut motor, &mut velocity, 0.1);
        assert!(!crouch.is_crouching());
        assert_eq!(motor.capsule, CapsuleDimensions::default());
    }
}
