//! Player input handling.
//!
//! Raw per-frame device state is written into the character's
//! [`IntentBuffer`] with hold semantics: a held key keeps its intent present,
//! a released key removes it.

use ascend_motion::buffer::SlotKind;
use ascend_motion::intent::{
    AttackIntent, CrouchIntent, InteractIntent, JumpIntent, LookIntent, MoveIntent, SprintIntent,
};
use ascend_motion::{ConfigStore, ConfigValue, Intent, IntentBuffer};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Mouse pixels to radians at sensitivity 1.
const PIXELS_TO_RADIANS: f32 = 0.001;

/// Raw player input for a single frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Mouse delta this frame (pixels, +x right, +y down).
    pub mouse_delta: (f32, f32),

    /// Action buttons pressed.
    pub actions: ActionInput,

    /// Frame number this input was generated.
    pub frame: u32,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    pub fire: bool,
    pub jump: bool,
    pub crouch: bool,
    pub sprint: bool,
    pub interact: bool,
}

impl PlayerInput {
    /// Planar move axes: x = right, y = forward, diagonals normalized.
    pub fn move_axes(&self) -> Vec2 {
        let mut axes = Vec2::ZERO;
        if self.movement.forward {
            axes.y += 1.0;
        }
        if self.movement.backward {
            axes.y -= 1.0;
        }
        if self.movement.right {
            axes.x += 1.0;
        }
        if self.movement.left {
            axes.x -= 1.0;
        }

        // Normalize diagonal movement
        if axes.length_squared() > 1.0 {
            axes = axes.normalize();
        }
        axes
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward
            || self.movement.backward
            || self.movement.left
            || self.movement.right
    }
}

/// Writes device state into an intent buffer.
pub struct InputSampler {
    horizontal_sensitivity: ConfigValue,
    vertical_sensitivity: ConfigValue,
    enabled: bool,
}

impl InputSampler {
    pub fn new(config: &ConfigStore) -> Self {
        Self {
            horizontal_sensitivity: config.observe("look.horizontal_sensitivity"),
            vertical_sensitivity: config.observe("look.vertical_sensitivity"),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable sampling. Disabling clears every intent so no key
    /// stays stuck while input is ignored.
    pub fn set_enabled(&mut self, enabled: bool, intents: &mut IntentBuffer) {
        self.enabled = enabled;
        if !enabled {
            intents.clear();
        }
    }

    /// Sample one frame of input into `intents`.
    pub fn sample(&self, input: &PlayerInput, intents: &mut IntentBuffer) {
        if !self.enabled {
            return;
        }

        let axes = input.move_axes();
        if axes != Vec2::ZERO {
            intents.set(MoveIntent { direction: axes });
        } else {
            intents.remove::<MoveIntent>();
        }

        match self.look_delta(input.mouse_delta) {
            Some(delta) if delta != Vec2::ZERO => intents.set(LookIntent { delta }),
            _ => intents.remove::<LookIntent>(),
        }

        hold::<JumpIntent>(intents, input.actions.jump);
        hold::<SprintIntent>(intents, input.actions.sprint);
        hold::<CrouchIntent>(intents, input.actions.crouch);
        hold::<InteractIntent>(intents, input.actions.interact);
        hold::<AttackIntent>(intents, input.actions.fire);
    }

    /// Mouse pixels to a look delta in radians (x = yaw right, y = pitch down).
    fn look_delta(&self, (dx, dy): (f32, f32)) -> Option<Vec2> {
        let horizontal = self.horizontal_sensitivity.get()?;
        let vertical = self.vertical_sensitivity.get()?;
        Some(Vec2::new(
            dx * horizontal * PIXELS_TO_RADIANS,
            dy * vertical * PIXELS_TO_RADIANS,
        ))
    }
}

/// Present while held, absent otherwise.
fn hold<T: SlotKind<Intent>>(intents: &mut IntentBuffer, held: bool) {
    if held {
        intents.set(T::default());
    } else {
        intents.remove::<T>();
    }
}
