//! Camera pitch and eye height.
//!
//! Yaw belongs to the body (see the body rotation ability); pitch only
//! tilts the camera and never affects movement. The eye sits a fixed
//! distance below the top of the capsule and eases toward it when the
//! capsule changes height.

use ascend_motion::action::LookAction;
use ascend_motion::math;
use ascend_motion::{ActionBuffer, CapsuleDimensions, ConfigStore, ConfigValue};

pub struct CameraPitch {
    /// Radians, positive looks up.
    pitch: f32,
    min_pitch: ConfigValue,
    max_pitch: ConfigValue,
}

impl CameraPitch {
    pub fn new(config: &ConfigStore) -> Self {
        Self {
            pitch: 0.0,
            min_pitch: config.observe("look.min_pitch"),
            max_pitch: config.observe("look.max_pitch"),
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Apply this tick's look action, clamped to the configured limits.
    pub fn update(&mut self, actions: &ActionBuffer) {
        let (Some(min), Some(max)) = (self.min_pitch.get(), self.max_pitch.get()) else {
            return;
        };
        let Some(look) = actions.try_get::<LookAction>() else {
            return;
        };

        let (low, high) = (min.min(max).to_radians(), min.max(max).to_radians());
        self.pitch = (self.pitch - look.delta.y).clamp(low, high);
    }
}

/// Eye height above the feet, following crouch and stand.
pub struct CameraHeight {
    current: Option<f32>,
    offset_from_top: ConfigValue,
    speed: ConfigValue,
}

impl CameraHeight {
    pub fn new(config: &ConfigStore) -> Self {
        Self {
            current: None,
            offset_from_top: config.observe("look.eye_offset_from_top"),
            speed: config.observe("look.eye_height_speed"),
        }
    }

    /// Meters above the feet. Zero until the first update with a ready config.
    pub fn height(&self) -> f32 {
        self.current.unwrap_or_default()
    }

    /// Move toward `capsule.height - offset_from_top`. The first update
    /// snaps.
    pub fn update(&mut self, capsule: CapsuleDimensions, dt: f32) {
        let (Some(offset), Some(speed)) = (self.offset_from_top.get(), self.speed.get()) else {
            return;
        };
        let target = (capsule.height - offset).max(0.0);
        self.current = Some(match self.current {
            Some(current) => math::move_towards(current, target, speed * dt),
            None => target,
        });
    }
}
