//! Jumping with input buffering and coyote time.
//!
//! A jump request stays valid for `jump.buffer_time` seconds, so pressing
//! jump just before landing still jumps. Leaving the ground without jumping
//! keeps the jump available for `jump.coyote_time` seconds. Jumping never
//! claims the step: gravity and air control still apply in the same step.

use std::any::Any;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::MovementAbility;
use crate::action::{JumpAction, SharedActions};
use crate::config::ConfigValue;
use crate::context::CharacterContext;
use crate::math;
use crate::motor::KinematicMotor;
use crate::state::CharacterState;

/// Buffer and coyote timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpTimers {
    /// Seconds since the jump action was last present.
    since_requested: f32,

    /// Seconds since the character was last stably grounded.
    since_grounded: f32,

    /// A jump happened and the character has not landed since.
    consumed: bool,
}

impl Default for JumpTimers {
    fn default() -> Self {
        Self {
            since_requested: f32::MAX,
            since_grounded: f32::MAX,
            consumed: false,
        }
    }
}

impl JumpTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timers by one step.
    ///
    /// # Arguments
    ///
    /// * `requested` - Whether the jump action is present this step
    /// * `grounded` - Whether the character is stably grounded
    /// * `buffer_time` - How long a request stays valid (seconds)
    /// * `coyote_time` - How long after leaving the ground a jump is allowed (seconds)
    /// * `dt` - Step duration in seconds
    ///
    /// # Returns
    ///
    /// Whether a jump should be executed this step. A returned jump is
    /// already marked consumed.
    pub fn update(
        &mut self,
        requested: bool,
        grounded: bool,
        buffer_time: f32,
        coyote_time: f32,
        dt: f32,
    ) -> bool {
        if requested {
            self.since_requested = 0.0;
        }

        self.since_requested += dt;
        self.since_grounded += dt;

        if grounded {
            self.since_grounded = 0.0;
            self.consumed = false;
        }

        let should_jump = !self.consumed
            && self.since_requested <= buffer_time
            && self.since_grounded <= coyote_time;

        if should_jump {
            self.consumed = true;
        }
        should_jump
    }

    /// Forget any pending request and grounded history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

pub struct JumpAbility {
    actions: SharedActions,
    state: Rc<CharacterState>,
    force: ConfigValue,
    coyote_time: ConfigValue,
    buffer_time: ConfigValue,
    timers: JumpTimers,
}

impl JumpAbility {
    pub const PRIORITY: i32 = 30;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            state: Rc::clone(&ctx.state),
            force: ctx.config.observe("jump.force"),
            coyote_time: ctx.config.observe("jump.coyote_time"),
            buffer_time: ctx.config.observe("jump.buffer_time"),
            timers: JumpTimers::new(),
        }
    }

    pub fn timers(&self) -> &JumpTimers {
        &self.timers
    }

    fn execute(motor: &mut dyn KinematicMotor, velocity: &mut Vec3, force: f32) {
        let up = motor.up();

        // Unstable ground (steep slope) pushes off along its normal
        let direction = if motor.found_any_ground() && !motor.is_stable_on_ground() {
            motor.ground_normal()
        } else {
            up
        };

        motor.force_unground();
        *velocity += direction * force - math::project(*velocity, up);
        log::debug!("jump (force {:.2})", force);
    }
}

impl MovementAbility for JumpAbility {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn before_update(&mut self, _motor: &mut dyn KinematicMotor, _dt: f32) {
        // Ladder time never counts toward coyote or buffered jumps
        if self.state.is_climbing() {
            self.timers.reset();
        }
    }

    fn update_velocity(
        &mut self,
        motor: &mut dyn KinematicMotor,
        velocity: &mut Vec3,
        dt: f32,
    ) -> bool {
        let (Some(force), Some(coyote_time), Some(buffer_time)) = (
            self.force.get(),
            self.coyote_time.get(),
            self.buffer_time.get(),
        ) else {
            return false;
        };

        let requested = self.actions.borrow().has::<JumpAction>();
        let grounded = motor.is_stable_on_ground();

        if self
            .timers
            .update(requested, grounded, buffer_time, coyote_time, dt)
        {
            Self::execute(motor, velocity, force);
        }
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{testing, AbilityStack, GravityAbility};
    use crate::motor::mock::MockMotor;

    const BUFFER: f32 = 0.1;
    const COYOTE: f32 = 0.15;
    const DT: f32 = 1.0 / 60.0;

    fn update(timers: &mut JumpTimers, jump: bool, ground: bool) -> bool {
        timers.update(jump, ground, BUFFER, COYOTE, DT)
    }

    #[test]
    fn test_basic_jump() {
        let mut timers = JumpTimers::new();
        assert!(update(&mut timers, true, true));
        assert!(timers.is_consumed());
    }

    #[test]
    fn test_no_double_jump_in_air() {
        let mut timers = JumpTimers::new();
        assert!(update(&mut timers, true, true));

        // Release, then press again while airborne within coyote time
        update(&mut timers, false, false);
        assert!(!update(&mut timers, true, false));
    }

    #[test]
    fn test_buffered_jump_on_landing() {
        let mut timers = JumpTimers::new();
        for _ in 0..60 {
            update(&mut timers, false, false);
        }

        // Press just before landing
        assert!(!update(&mut timers, true, false));
        assert!(!update(&mut timers, false, false));
        assert!(update(&mut timers, false, true));
    }

    #[test]
    fn test_buffer_expires() {
        let mut timers = JumpTimers::new();
        for _ in 0..60 {
            update(&mut timers, false, false);
        }
        update(&mut timers, true, false);
        for _ in 0..10 {
            update(&mut timers, false, false);
        }
        assert!(!update(&mut timers, false, true));
    }

    #[test]
    fn test_coyote_time() {
        let mut timers = JumpTimers::new();
        update(&mut timers, false, true);

        // Walk off a ledge, jump a few frames later
        for _ in 0..5 {
            update(&mut timers, false, false);
        }
        assert!(update(&mut timers, true, false));
    }

    #[test]
    fn test_coyote_expires() {
        let mut timers = JumpTimers::new();
        update(&mut timers, false, true);
        for _ in 0..20 {
            update(&mut timers, false, false);
        }
        assert!(!update(&mut timers, true, false));
    }

    #[test]
    fn test_held_jump_repeats_on_landing() {
        let mut timers = JumpTimers::new();
        assert!(update(&mut timers, true, true));
        assert!(!update(&mut timers, true, false));
        assert!(update(&mut timers, true, true));
    }

    #[test]
    fn test_jump_replaces_vertical_velocity() {
        let ctx = testing::context();
        let mut jump = JumpAbility::new(&ctx);
        let mut motor = MockMotor::default();
        ctx.actions.borrow_mut().set(JumpAction {});

        let mut velocity = Vec3::new(3.0, -1.0, 0.0);
        assert!(!jump.update_velocity(&mut motor, &mut velocity, DT));

        assert!((velocity.y - 7.0).abs() < 1e-4);
        assert_eq!(velocity.x, 3.0);
        assert!(motor.must_unground);
    }

    #[test]
    fn test_gravity_applies_in_jump_step() {
        let ctx = testing::context();
        let mut stack = AbilityStack::new();
        stack.add(Box::new(GravityAbility::new(&ctx)));
        stack.add(Box::new(JumpAbility::new(&ctx)));
        ctx.actions.borrow_mut().set(JumpAction {});

        let mut motor = MockMotor::default();
        let mut velocity = Vec3::ZERO;
        let claimed = stack.update_velocity(&mut motor, &mut velocity, 0.1);

        assert_eq!(claimed, None);
        // 7 - 9.81 * 2 * 0.1
        assert!((velocity.y - (7.0 - 1.962)).abs() < 1e-3);
    }

    #[test]
    fn test_climbing_resets_timers() {
        let ctx = testing::context();
        let mut jump = JumpAbility::new(&ctx);
        let mut motor = MockMotor::default();

        // Grounded history before grabbing a ladder
        let mut velocity = Vec3::ZERO;
        jump.update_velocity(&mut motor, &mut velocity, DT);

        ctx.state.set_climbing(true);
        jump.before_update(&mut motor, DT);
        ctx.state.set_climbing(false);

        motor.grounded = false;
        ctx.actions.borrow_mut().set(JumpAction {});
        jump.update_velocity(&mut motor, &mut velocity, DT);
        assert!(velocity.y.abs() < 1e-6, "no coyote jump after leaving a ladder");
    }
}
