//! A playable character: input sampling, action resolution and the motor
//! step wired together in tick order.

use std::rc::Rc;

use ascend_motion::ability::{reference_stack, LadderClimbAbility, MovementAbility};
use ascend_motion::state::StateSnapshot;
use ascend_motion::{
    ActionResolver, CharacterContext, CharacterMotor, ClimbState, ConfigStore, IntentBuffer,
    KinematicMotor,
};
use glam::{Quat, Vec3};
use serde::Serialize;

use crate::input::{InputSampler, PlayerInput};
use crate::level::{Level, SpawnPoint};
use crate::motor::SimpleMotor;
use crate::view::{CameraHeight, CameraPitch};

/// Serializable summary of one character after a tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CharacterSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub eye_height: f32,
    pub climb_state: ClimbState,
    pub state: StateSnapshot,
}

pub struct Character {
    ctx: CharacterContext,
    intents: IntentBuffer,
    sampler: InputSampler,
    resolver: ActionResolver,
    adapter: CharacterMotor,
    motor: SimpleMotor,
    camera: CameraPitch,
    eye: CameraHeight,
}

impl Character {
    /// Create a character at `spawn` in `level` with the reference rules
    /// and abilities.
    pub fn spawn(level: &Level, spawn: SpawnPoint, config: Rc<ConfigStore>) -> Self {
        let ctx = CharacterContext::new(config).with_ladders(Rc::clone(&level.ladders));
        let resolver = ActionResolver::reference(&ctx);
        Self::with_resolver(level, spawn, ctx, resolver)
    }

    /// Create a character with a custom rule set bound to `ctx`.
    pub fn with_resolver(
        level: &Level,
        spawn: SpawnPoint,
        ctx: CharacterContext,
        resolver: ActionResolver,
    ) -> Self {
        let adapter = CharacterMotor::new(reference_stack(&ctx), Rc::clone(&ctx.state));

        let mut motor = SimpleMotor::new(Rc::clone(&level.collision), spawn.position);
        motor.set_rotation(ascend_motion::math::yaw_rotation(spawn.facing));

        log::debug!(
            "spawned at {:?} facing {:.2} in '{}'",
            spawn.position,
            spawn.facing,
            level.id
        );

        Self {
            sampler: InputSampler::new(&ctx.config),
            camera: CameraPitch::new(&ctx.config),
            eye: CameraHeight::new(&ctx.config),
            intents: IntentBuffer::new(),
            resolver,
            adapter,
            motor,
            ctx,
        }
    }

    /// Run one frame: sample input, resolve actions, step the motor.
    pub fn tick(&mut self, input: &PlayerInput, dt: f32) {
        self.sampler.sample(input, &mut self.intents);

        {
            let mut actions = self.ctx.actions.borrow_mut();
            self.resolver.resolve(&self.intents, &mut actions);
            self.camera.update(&actions);
        }

        self.motor.step(&mut self.adapter, dt);
        self.eye.update(self.motor.capsule(), dt);
    }

    /// Stop reading input; every held intent is dropped.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.sampler.set_enabled(enabled, &mut self.intents);
    }

    /// Enable or disable an ability by name. A disabled ability releases
    /// whatever motor modes it had taken over.
    pub fn set_ability_enabled(&mut self, name: &str, enabled: bool) -> bool {
        self.adapter
            .stack_mut()
            .set_enabled(name, enabled, &mut self.motor)
    }

    pub fn remove_ability(&mut self, name: &str) -> Option<Box<dyn MovementAbility>> {
        self.adapter.stack_mut().remove(name, &mut self.motor)
    }

    pub fn context(&self) -> &CharacterContext {
        &self.ctx
    }

    pub fn intents(&self) -> &IntentBuffer {
        &self.intents
    }

    pub fn adapter(&self) -> &CharacterMotor {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut CharacterMotor {
        &mut self.adapter
    }

    pub fn motor(&self) -> &SimpleMotor {
        &self.motor
    }

    pub fn position(&self) -> Vec3 {
        self.motor.position()
    }

    pub fn velocity(&self) -> Vec3 {
        self.motor.velocity()
    }

    pub fn rotation(&self) -> Quat {
        self.motor.rotation()
    }

    /// Body yaw in radians (0 faces -Z).
    pub fn yaw(&self) -> f32 {
        ascend_motion::math::yaw_of(self.motor.rotation() * Vec3::NEG_Z)
    }

    pub fn pitch(&self) -> f32 {
        self.camera.pitch()
    }

    /// Eye height above the feet.
    pub fn eye_height(&self) -> f32 {
        self.eye.height()
    }

    pub fn climb_state(&self) -> ClimbState {
        self.adapter
            .stack()
            .find::<LadderClimbAbility>()
            .map(LadderClimbAbility::state)
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            position: self.position(),
            velocity: self.velocity(),
            yaw: self.yaw(),
            pitch: self.pitch(),
            eye_height: self.eye_height(),
            climb_state: self.climb_state(),
            state: self.ctx.state.snapshot(),
        }
    }
}
