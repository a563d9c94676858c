//! Ladder climbing.
//!
//! ```text
//!            interact (ladder in range)         timer >= duration
//!   None ─────────────────────────────► Anchoring ─────────────────► Climbing
//!    ▲  ▲                                                          │   │
//!    │  └──────────── at bottom, climbing down ────────────────────┘   │
//!    │                                                                 │ at top, climbing up
//!    └──────────── timer >= duration ─────────── DeAnchoring ◄─────────┘
//!
//!   any attached state ── jump ──► None (pushed away from the wall)
//! ```
//!
//! While attached the ability claims the velocity every step, keeps the
//! motor ungrounded, and turns off collision and ground solving (toggled on
//! the edge of attaching/detaching). Anchoring and de-anchoring interpolate
//! the position over `ladder.anchoring_duration`. Look yaw is held within
//! `ladder.max_look_yaw_deviation` degrees of the ladder facing.

use std::any::Any;
use std::rc::Rc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::MovementAbility;
use crate::action::{InteractAction, JumpAction, LookAction, MoveAction, SharedActions};
use crate::config::{ConfigStore, ConfigValue};
use crate::context::CharacterContext;
use crate::ladder::{Ladder, LadderSet};
use crate::math;
use crate::motor::KinematicMotor;
use crate::state::CharacterState;

/// Ladder attachment phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimbState {
    #[default]
    None,
    Anchoring,
    Climbing,
    DeAnchoring,
}

/// Observed `ladder.*` keys.
struct LadderKeys {
    climb_speed: ConfigValue,
    attach_distance: ConfigValue,
    detach_jump_force: ConfigValue,
    top_exit_offset: ConfigValue,
    max_look_yaw_deviation: ConfigValue,
    detection_radius: ConfigValue,
    anchoring_duration: ConfigValue,
    edge_threshold: ConfigValue,
    snap_strength: ConfigValue,
    top_exit_height_offset: ConfigValue,
}

/// Ladder tunables read for one step.
#[derive(Debug, Clone, Copy)]
struct Tuning {
    climb_speed: f32,
    attach_distance: f32,
    detach_jump_force: f32,
    top_exit_offset: f32,
    max_look_yaw_deviation: f32,
    detection_radius: f32,
    anchoring_duration: f32,
    edge_threshold: f32,
    snap_strength: f32,
    top_exit_height_offset: f32,
}

impl LadderKeys {
    fn observe(config: &ConfigStore) -> Self {
        Self {
            climb_speed: config.observe("ladder.climb_speed"),
            attach_distance: config.observe("ladder.attach_distance"),
            detach_jump_force: config.observe("ladder.detach_jump_force"),
            top_exit_offset: config.observe("ladder.top_exit_offset"),
            max_look_yaw_deviation: config.observe("ladder.max_look_yaw_deviation"),
            detection_radius: config.observe("ladder.detection_radius"),
            anchoring_duration: config.observe("ladder.anchoring_duration"),
            edge_threshold: config.observe("ladder.edge_threshold"),
            snap_strength: config.observe("ladder.snap_strength"),
            top_exit_height_offset: config.observe("ladder.top_exit_height_offset"),
        }
    }

    fn read(&self) -> Option<Tuning> {
        Some(Tuning {
            climb_speed: self.climb_speed.get()?,
            attach_distance: self.attach_distance.get()?,
            detach_jump_force: self.detach_jump_force.get()?,
            top_exit_offset: self.top_exit_offset.get()?,
            max_look_yaw_deviation: self.max_look_yaw_deviation.get()?,
            detection_radius: self.detection_radius.get()?,
            anchoring_duration: self.anchoring_duration.get()?,
            edge_threshold: self.edge_threshold.get()?,
            snap_strength: self.snap_strength.get()?,
            top_exit_height_offset: self.top_exit_height_offset.get()?,
        })
    }
}

/// Timed interpolation between two positions.
#[derive(Debug, Clone, Copy, Default)]
struct Anchor {
    timer: f32,
    start: Vec3,
    target: Vec3,
}

impl Anchor {
    fn new(start: Vec3, target: Vec3) -> Self {
        Self {
            timer: 0.0,
            start,
            target,
        }
    }

    /// Advance and return the velocity toward the interpolated position.
    /// The flag is true once the duration has elapsed.
    fn step(&mut self, motor: &dyn KinematicMotor, duration: f32, dt: f32) -> (Vec3, bool) {
        self.timer += dt;
        let t = (self.timer / duration).clamp(0.0, 1.0);
        let goal = self.start.lerp(self.target, t);
        let velocity = motor.velocity_for_move_position(motor.transient_position(), goal, dt);
        (velocity, self.timer >= duration)
    }
}

pub struct LadderClimbAbility {
    actions: SharedActions,
    state: Rc<CharacterState>,
    ladders: Rc<LadderSet>,
    keys: LadderKeys,

    climb_state: ClimbState,
    ladder: Option<Ladder>,
    anchor: Anchor,
    climb_input: f32,
    wants_jump_off: bool,
    was_active: bool,

    // Previous-step action presence for press detection
    interact_held: bool,
    jump_held: bool,
}

impl LadderClimbAbility {
    pub const PRIORITY: i32 = 50;

    pub fn new(ctx: &CharacterContext) -> Self {
        Self {
            actions: Rc::clone(&ctx.actions),
            state: Rc::clone(&ctx.state),
            ladders: Rc::clone(&ctx.ladders),
            keys: LadderKeys::observe(&ctx.config),
            climb_state: ClimbState::None,
            ladder: None,
            anchor: Anchor::default(),
            climb_input: 0.0,
            wants_jump_off: false,
            was_active: false,
            interact_held: false,
            jump_held: false,
        }
    }

    pub fn state(&self) -> ClimbState {
        self.climb_state
    }

    pub fn is_climbing(&self) -> bool {
        self.climb_state != ClimbState::None
    }

    pub fn current_ladder(&self) -> Option<&Ladder> {
        self.ladder.as_ref()
    }

    /// Yaw (radians) a climber should face, if attached.
    pub fn ladder_facing_yaw(&self) -> Option<f32> {
        self.ladder.as_ref().map(Ladder::facing_yaw)
    }

    fn set_state(&mut self, next: ClimbState) {
        if self.climb_state != next {
            log::debug!("ladder: {:?} -> {:?}", self.climb_state, next);
            self.climb_state = next;
        }
        self.state.set_climbing(next != ClimbState::None);
    }

    fn detach(&mut self) {
        self.set_state(ClimbState::None);
        self.ladder = None;
        self.climb_input = 0.0;
        self.wants_jump_off = false;
    }

    fn try_attach(&mut self, position: Vec3, tuning: &Tuning) {
        let Some(ladder) = self.ladders.nearest(position, tuning.detection_radius).copied() else {
            log::trace!("interact: no ladder within {:.2}m", tuning.detection_radius);
            return;
        };

        let target = ladder.closest_point(position) - ladder.forward * tuning.attach_distance;
        log::debug!("attaching to ladder {}", ladder.id);

        self.ladder = Some(ladder);
        self.climb_input = 0.0;
        self.anchor = Anchor::new(position, target);
        self.set_state(ClimbState::Anchoring);
    }

    /// Turn collision and ground solving off on attach and back on after
    /// detach.
    fn sync_motor_modes(&mut self, motor: &mut dyn KinematicMotor, active: bool) {
        if active && !self.was_active {
            motor.set_movement_collisions_solving(false);
            motor.set_ground_solving(false);
        } else if !active && self.was_active {
            motor.set_movement_collisions_solving(true);
            motor.set_ground_solving(true);
        }
        self.was_active = active;
    }

    fn update_climbing(
        &mut self,
        motor: &dyn KinematicMotor,
        ladder: &Ladder,
        tuning: &Tuning,
        dt: f32,
    ) -> Vec3 {
        let position = motor.transient_position();

        if ladder.is_at_top(position, tuning.edge_threshold) && self.climb_input > 0.0 {
            let mut exit = ladder.top + ladder.forward * tuning.top_exit_offset;
            exit.y = ladder.top.y + tuning.top_exit_height_offset;
            self.anchor = Anchor::new(position, exit);
            self.set_state(ClimbState::DeAnchoring);
            return Vec3::ZERO;
        }

        if ladder.is_at_bottom(position, tuning.edge_threshold) && self.climb_input < 0.0 {
            self.detach();
            return Vec3::ZERO;
        }

        let climb = ladder.up * (self.climb_input * tuning.climb_speed);

        // Pull back onto the ladder line, horizontally only
        let target = ladder.closest_point(position) - ladder.forward * tuning.attach_distance;
        let mut to_target = target - position;
        to_target.y = 0.0;
        let snap = if dt > 0.0 {
            to_target / dt * tuning.snap_strength
        } else {
            Vec3::ZERO
        };

        climb + snap
    }
}

impl MovementAbility for LadderClimbAbility {
    fn name(&self) -> &'static str {
        "ladder_climb"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn before_update(&mut self, motor: &mut dyn KinematicMotor, _dt: f32) {
        let (interact, jump, climb_input) = {
            let actions = self.actions.borrow();
            (
                actions.has::<InteractAction>(),
                actions.has::<JumpAction>(),
                actions.try_get::<MoveAction>().map_or(0.0, |m| m.direction.y),
            )
        };
        let interact_pressed = interact && !self.interact_held;
        let jump_pressed = jump && !self.jump_held;
        self.interact_held = interact;
        self.jump_held = jump;

        let Some(tuning) = self.keys.read() else {
            return;
        };
        if !motor.is_transform_valid() {
            return;
        }

        if self.climb_state == ClimbState::None {
            if interact_pressed {
                self.try_attach(motor.transient_position(), &tuning);
            }
        } else {
            if jump_pressed {
                self.wants_jump_off = true;
            }
            self.climb_input = climb_input.clamp(-1.0, 1.0);
        }
    }

    fn update_rotation(
        &mut self,
        _motor: &mut dyn KinematicMotor,
        rotation: &mut Quat,
        _dt: f32,
    ) -> bool {
        if self.climb_state == ClimbState::None {
            return false;
        }
        let (Some(ladder), Some(tuning)) = (self.ladder, self.keys.read()) else {
            return false;
        };

        let mut yaw = math::yaw_of(*rotation * Vec3::NEG_Z);
        if let Some(look) = self.actions.borrow().try_get::<LookAction>() {
            yaw += look.delta.x;
        }

        let facing = ladder.facing_yaw();
        let limit = tuning.max_look_yaw_deviation.to_radians();
        let offset = math::wrap_angle(yaw - facing).clamp(-limit, limit);
        *rotation = math::yaw_rotation(facing + offset);
        true
    }

    fn update_velocity(
        &mut self,
        motor: &mut dyn KinematicMotor,
        velocity: &mut Vec3,
        dt: f32,
    ) -> bool {
        let Some(tuning) = self.keys.read() else {
            return false;
        };
        if !motor.is_transform_valid() {
            return false;
        }

        let active = self.climb_state != ClimbState::None;
        self.sync_motor_modes(motor, active);
        if !active {
            return false;
        }

        let Some(ladder) = self.ladder else {
            log::warn!("ladder state {:?} without a ladder; resetting", self.climb_state);
            self.detach();
            return false;
        };

        if self.wants_jump_off {
            let direction = (-ladder.forward + ladder.up).normalize_or_zero();
            *velocity = direction * tuning.detach_jump_force;
            log::debug!("jumped off ladder {}", ladder.id);
            self.detach();
            motor.force_unground();
            return true;
        }

        let current = self.climb_state;
        *velocity = match current {
            ClimbState::Anchoring => {
                let (v, done) = self.anchor.step(motor, tuning.anchoring_duration, dt);
                if done {
                    self.set_state(ClimbState::Climbing);
                }
                v
            }
            ClimbState::Climbing => self.update_climbing(motor, &ladder, &tuning, dt),
            ClimbState::DeAnchoring => {
                let (v, done) = self.anchor.step(motor, tuning.anchoring_duration, dt);
                if done {
                    self.detach();
                }
                v
            }
            ClimbState::None => *velocity,
        };

        motor.force_unground();
        true
    }

    fn on_disabled(&mut self, motor: &mut dyn KinematicMotor) {
        if self.climb_state != ClimbState::None {
            log::debug!("ladder ability disabled while {:?}", self.climb_state);
        }
        self.detach();
        self.sync_motor_modes(motor, false);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
