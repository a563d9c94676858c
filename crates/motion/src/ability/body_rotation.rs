//! Yaw-only body rotation from look input.

use std::any::Any;
use std::rc::Rc;

use glam::{Quat, Vec3};

use super::MovementAbility;
use crate::action::{LookAction, SharedActions};
use crate::context::CharacterContext;
use crate::math;
use crate::motor::KinematicMotor;

pub struct BodyRotationAbility {
    actions: SharedActions,
    yaw: f32,
}

impl BodyRotationAbility {
    pub const PRIORITY: i32 = 10;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            yaw: 0.0,
        }
    }

    /// Body yaw after the last rotation pass (radians).
    pub fn yaw(&self) -> f32 {
        self.yaw
    }
}

impl MovementAbility for BodyRotationAbility {
    fn name(&self) -> &'static str {
        "body_rotation"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn update_rotation(
        &mut self,
        _motor: &mut dyn KinematicMotor,
        rotation: &mut Quat,
        _dt: f32,
    ) -> bool {
        // Start from the incoming heading so yaw stays in sync when a
        // higher-priority ability turned the body.
        let mut yaw = math::yaw_of(*rotation * Vec3::NEG_Z);
        if let Some(look) = self.actions.borrow().try_get::<LookAction>() {
            yaw += look.delta.x;
        }

        self.yaw = math::wrap_angle(yaw);
        *rotation = math::yaw_rotation(self.yaw);
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
