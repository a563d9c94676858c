//! Locomotion tunables.
//!
//! Tunables are grouped into sections (`movement`, `gravity`, `jump`,
//! `sprint`, `crouch`, `ladder`, `look`) and flattened into dotted keys such
//! as `ladder.climb_speed`. A [`ConfigStore`] holds the live values; each
//! ability observes the keys it needs at construction and reads them fresh
//! every step, so runtime overrides take effect on the next frame.
//!
//! An observed key reads `None` until a value is registered for it. Abilities
//! treat that as "not ready" and no-op.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or editing configuration.
///
/// These only occur at configuration time; the per-frame pipeline never
/// sees them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown config key: '{0}'")]
    UnknownKey(String),

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: f32 },
}

/// A named group of tunables.
pub trait ConfigSection {
    /// Section prefix for dotted keys.
    const KEY: &'static str;

    /// `(field, value)` pairs for every tunable in the section.
    fn entries(&self) -> Vec<(&'static str, f32)>;
}

// ============================================================================
// Sections
// ============================================================================

/// Walking and air control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSection {
    /// Target ground speed (meters/second).
    pub walk_speed: f32,
    /// Ground acceleration toward walk speed (meters/second²).
    pub acceleration: f32,
    /// Ground deceleration to rest (meters/second²).
    pub deceleration: f32,
    /// Horizontal acceleration while airborne (meters/second²).
    pub air_acceleration: f32,
    /// Fraction of walk speed reachable in the air.
    pub air_control: f32,
}

impl Default for MovementSection {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            acceleration: 10.0,
            deceleration: 10.0,
            air_acceleration: 5.0,
            air_control: 0.3,
        }
    }
}

impl ConfigSection for MovementSection {
    const KEY: &'static str = "movement";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("walk_speed", self.walk_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("air_acceleration", self.air_acceleration),
            ("air_control", self.air_control),
        ]
    }
}

/// Gravity scaling while airborne.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySection {
    /// Gravity multiplier while rising.
    pub multiplier: f32,
    /// Gravity multiplier while falling.
    pub fall_multiplier: f32,
    /// Terminal downward speed (meters/second).
    pub max_fall_speed: f32,
}

impl Default for GravitySection {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            fall_multiplier: 2.5,
            max_fall_speed: 20.0,
        }
    }
}

impl ConfigSection for GravitySection {
    const KEY: &'static str = "gravity";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("multiplier", self.multiplier),
            ("fall_multiplier", self.fall_multiplier),
            ("max_fall_speed", self.max_fall_speed),
        ]
    }
}

/// Jump impulse and input forgiveness windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSection {
    /// Vertical launch speed (meters/second).
    pub force: f32,
    /// Grace period after leaving the ground during which a jump still works (seconds).
    pub coyote_time: f32,
    /// How long a jump request stays valid before landing (seconds).
    pub buffer_time: f32,
}

impl Default for JumpSection {
    fn default() -> Self {
        Self {
            force: 7.0,
            coyote_time: 0.15,
            buffer_time: 0.1,
        }
    }
}

impl ConfigSection for JumpSection {
    const KEY: &'static str = "jump";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("force", self.force),
            ("coyote_time", self.coyote_time),
            ("buffer_time", self.buffer_time),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintSection {
    /// Target sprint speed (meters/second).
    pub speed: f32,
    /// Acceleration toward sprint speed (meters/second²).
    pub acceleration: f32,
}

impl Default for SprintSection {
    fn default() -> Self {
        Self {
            speed: 8.0,
            acceleration: 15.0,
        }
    }
}

impl ConfigSection for SprintSection {
    const KEY: &'static str = "sprint";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![("speed", self.speed), ("acceleration", self.acceleration)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchSection {
    /// Maximum crouched ground speed (meters/second).
    pub speed: f32,
    /// Deceleration down to crouch speed (meters/second²).
    pub deceleration: f32,
    /// Crouched capsule height as a fraction of standing height.
    pub height_ratio: f32,
}

impl Default for CrouchSection {
    fn default() -> Self {
        Self {
            speed: 2.5,
            deceleration: 20.0,
            height_ratio: 0.5,
        }
    }
}

impl ConfigSection for CrouchSection {
    const KEY: &'static str = "crouch";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("speed", self.speed),
            ("deceleration", self.deceleration),
            ("height_ratio", self.height_ratio),
        ]
    }
}

/// Ladder attach, climb and exit tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderSection {
    /// Climb speed along the ladder axis (meters/second).
    pub climb_speed: f32,
    /// Distance kept between the character and the ladder line (meters).
    pub attach_distance: f32,
    /// Speed of the jump-off impulse (meters/second).
    pub detach_jump_force: f32,
    /// Forward distance past the top point when exiting (meters).
    pub top_exit_offset: f32,
    /// Allowed look deviation from the ladder facing while climbing (degrees).
    /// The ladder ability clamps body yaw to this range while attached.
    pub max_look_yaw_deviation: f32,
    /// Search radius for ladders when attaching (meters).
    pub detection_radius: f32,
    /// Duration of the anchoring and de-anchoring interpolation (seconds).
    pub anchoring_duration: f32,
    /// Progress margin that counts as the top or bottom edge.
    pub edge_threshold: f32,
    /// Fraction of the off-axis error corrected per step.
    pub snap_strength: f32,
    /// Height above the top point of the exit position (meters).
    pub top_exit_height_offset: f32,
}

impl Default for LadderSection {
    fn default() -> Self {
        Self {
            climb_speed: 3.0,
            attach_distance: 0.5,
            detach_jump_force: 5.0,
            top_exit_offset: 0.5,
            max_look_yaw_deviation: 60.0,
            detection_radius: 1.0,
            anchoring_duration: 0.2,
            edge_threshold: 0.05,
            snap_strength: 0.5,
            top_exit_height_offset: 0.1,
        }
    }
}

impl ConfigSection for LadderSection {
    const KEY: &'static str = "ladder";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("climb_speed", self.climb_speed),
            ("attach_distance", self.attach_distance),
            ("detach_jump_force", self.detach_jump_force),
            ("top_exit_offset", self.top_exit_offset),
            ("max_look_yaw_deviation", self.max_look_yaw_deviation),
            ("detection_radius", self.detection_radius),
            ("anchoring_duration", self.anchoring_duration),
            ("edge_threshold", self.edge_threshold),
            ("snap_strength", self.snap_strength),
            ("top_exit_height_offset", self.top_exit_height_offset),
        ]
    }
}

/// View sensitivity, pitch limits (degrees) and eye placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookSection {
    pub horizontal_sensitivity: f32,
    pub vertical_sensitivity: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Eye distance below the top of the capsule (meters).
    pub eye_offset_from_top: f32,
    /// How fast the eye follows capsule height changes (meters/second).
    pub eye_height_speed: f32,
}

impl Default for LookSection {
    fn default() -> Self {
        Self {
            horizontal_sensitivity: 2.0,
            vertical_sensitivity: 2.0,
            min_pitch: -89.0,
            max_pitch: 89.0,
            eye_offset_from_top: 0.2,
            eye_height_speed: 10.0,
        }
    }
}

impl ConfigSection for LookSection {
    const KEY: &'static str = "look";

    fn entries(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("horizontal_sensitivity", self.horizontal_sensitivity),
            ("vertical_sensitivity", self.vertical_sensitivity),
            ("min_pitch", self.min_pitch),
            ("max_pitch", self.max_pitch),
            ("eye_offset_from_top", self.eye_offset_from_top),
            ("eye_height_speed", self.eye_height_speed),
        ]
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Every locomotion section, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub movement: MovementSection,
    pub gravity: GravitySection,
    pub jump: JumpSection,
    pub sprint: SprintSection,
    pub crouch: CrouchSection,
    pub ladder: LadderSection,
    pub look: LookSection,
}

impl LocomotionConfig {
    /// Create a "fast arcade" config: quicker, floatier, more air control.
    pub fn arcade() -> Self {
        Self {
            movement: MovementSection {
                walk_speed: 7.0,
                acceleration: 15.0,
                air_control: 0.6,
                ..Default::default()
            },
            sprint: SprintSection {
                speed: 11.0,
                acceleration: 20.0,
            },
            jump: JumpSection {
                force: 8.0,
                coyote_time: 0.2,
                buffer_time: 0.15,
            },
            ladder: LadderSection {
                climb_speed: 4.5,
                anchoring_duration: 0.12,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a "tactical" config: slower, heavier, little air control.
    pub fn tactical() -> Self {
        Self {
            movement: MovementSection {
                walk_speed: 3.5,
                acceleration: 8.0,
                deceleration: 14.0,
                air_control: 0.05,
                ..Default::default()
            },
            sprint: SprintSection {
                speed: 5.5,
                acceleration: 10.0,
            },
            crouch: CrouchSection {
                speed: 1.5,
                ..Default::default()
            },
            jump: JumpSection {
                force: 5.5,
                coyote_time: 0.1,
                buffer_time: 0.05,
            },
            ladder: LadderSection {
                climb_speed: 2.0,
                anchoring_duration: 0.3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config. Missing sections and fields take
    /// their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// All tunables as `(dotted key, value)` pairs.
    pub fn entries(&self) -> Vec<(String, f32)> {
        let mut entries = Vec::new();
        push_section(&mut entries, &self.movement);
        push_section(&mut entries, &self.gravity);
        push_section(&mut entries, &self.jump);
        push_section(&mut entries, &self.sprint);
        push_section(&mut entries, &self.crouch);
        push_section(&mut entries, &self.ladder);
        push_section(&mut entries, &self.look);
        entries
    }

    /// Check every value for the ranges the abilities rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in self.entries() {
            validate_entry(&key, value)?;
        }
        Ok(())
    }
}

fn push_section<S: ConfigSection>(entries: &mut Vec<(String, f32)>, section: &S) {
    for (field, value) in section.entries() {
        entries.push((format!("{}.{}", S::KEY, field), value));
    }
}

/// Pitch limits may be negative; durations must be strictly positive;
/// everything else must be finite and non-negative.
fn validate_entry(key: &str, value: f32) -> Result<(), ConfigError> {
    let valid = match key {
        "look.min_pitch" | "look.max_pitch" => value.is_finite(),
        "ladder.anchoring_duration" => value.is_finite() && value > 0.0,
        _ => value.is_finite() && value >= 0.0,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })
    }
}

// ============================================================================
// Live store
// ============================================================================

type Cellref = Rc<Cell<Option<f32>>>;

/// A live handle to one tunable.
///
/// Reads `None` until the key has a value in the store.
#[derive(Debug, Clone)]
pub struct ConfigValue {
    key: Rc<str>,
    cell: Cellref,
}

impl ConfigValue {
    /// Current value, if ready.
    #[inline]
    pub fn get(&self) -> Option<f32> {
        self.cell.get()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Registered base values.
    base: HashMap<String, f32>,
    /// Keys whose live value differs from the base by an explicit `set`.
    overridden: HashSet<String>,
    /// Live cells handed out to observers.
    cells: HashMap<String, Cellref>,
}

impl StoreInner {
    fn cell(&mut self, key: &str) -> Cellref {
        if let Some(cell) = self.cells.get(key) {
            return Rc::clone(cell);
        }
        let cell = Rc::new(Cell::new(self.base.get(key).copied()));
        self.cells.insert(key.to_string(), Rc::clone(&cell));
        cell
    }
}

/// Keyed store of live tunables.
///
/// Single-threaded and shared via `Rc`; values are pushed into observer cells
/// eagerly so readers never look anything up per frame.
#[derive(Debug, Default)]
pub struct ConfigStore {
    inner: RefCell<StoreInner>,
}

impl ConfigStore {
    /// Create an empty store; every observed key stays unready until
    /// [`register`](Self::register) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared store populated from `config`.
    pub fn shared(config: &LocomotionConfig) -> Result<Rc<Self>, ConfigError> {
        let store = Self::new();
        store.register(config)?;
        Ok(Rc::new(store))
    }

    /// Register base values for every key in `config`.
    ///
    /// Keys with an explicit override keep their override.
    pub fn register(&self, config: &LocomotionConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let mut inner = self.inner.borrow_mut();
        for (key, value) in config.entries() {
            if !inner.overridden.contains(&key) {
                inner.cell(&key).set(Some(value));
            }
            inner.base.insert(key, value);
        }
        log::debug!("registered {} config keys", inner.base.len());
        Ok(())
    }

    /// Observe a key. The handle stays valid across later registrations,
    /// overrides and resets.
    pub fn observe(&self, key: &str) -> ConfigValue {
        let cell = self.inner.borrow_mut().cell(key);
        ConfigValue {
            key: Rc::from(key),
            cell,
        }
    }

    /// Current value of a key, if ready.
    pub fn value(&self, key: &str) -> Option<f32> {
        let inner = self.inner.borrow();
        match inner.cells.get(key) {
            Some(cell) => cell.get(),
            None => inner.base.get(key).copied(),
        }
    }

    /// Override a registered key.
    pub fn set(&self, key: &str, value: f32) -> Result<(), ConfigError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.base.contains_key(key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        validate_entry(key, value)?;

        inner.overridden.insert(key.to_string());
        inner.cell(key).set(Some(value));
        log::debug!("config override {} = {}", key, value);
        Ok(())
    }

    /// Drop an override and restore the registered value.
    pub fn reset(&self, key: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.overridden.remove(key) {
            return;
        }
        let base = inner.base.get(key).copied();
        inner.cell(key).set(base);
    }

    /// Drop every override.
    pub fn reset_all(&self) {
        let keys: Vec<String> = self.inner.borrow().overridden.iter().cloned().collect();
        for key in keys {
            self.reset(&key);
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.inner.borrow().base.contains_key(key)
    }

    pub fn is_overridden(&self, key: &str) -> bool {
        self.inner.borrow().overridden.contains(key)
    }

    /// Every registered key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.borrow().base.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LocomotionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.movement.walk_speed > 0.0);
        assert!(config.ladder.anchoring_duration > 0.0);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(LocomotionConfig::arcade().validate().is_ok());
        assert!(LocomotionConfig::tactical().validate().is_ok());
        assert!(LocomotionConfig::arcade().movement.walk_speed > LocomotionConfig::tactical().movement.walk_speed);
    }

    #[test]
    fn test_entries_use_dotted_keys() {
        let entries = LocomotionConfig::default().entries();
        assert!(entries.iter().any(|(k, v)| k == "ladder.climb_speed" && *v == 3.0));
        assert!(entries.iter().any(|(k, _)| k == "look.min_pitch"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = LocomotionConfig::from_json(r#"{ "ladder": { "climb_speed": 4.0 } }"#).unwrap();
        assert_eq!(config.ladder.climb_speed, 4.0);
        assert_eq!(config.ladder.attach_distance, LadderSection::default().attach_distance);
        assert_eq!(config.movement, MovementSection::default());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = LocomotionConfig::from_json(r#"{ "ladder": { "anchoring_duration": 0.0 } }"#);
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));

        let err = LocomotionConfig::from_json("{ not json");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_observe_before_register_is_unready() {
        let store = ConfigStore::new();
        let speed = store.observe("ladder.climb_speed");
        assert!(!speed.is_ready());

        store.register(&LocomotionConfig::default()).unwrap();
        assert_eq!(speed.get(), Some(3.0));
    }

    #[test]
    fn test_override_and_reset() {
        let store = ConfigStore::shared(&LocomotionConfig::default()).unwrap();
        let walk = store.observe("movement.walk_speed");

        store.set("movement.walk_speed", 9.0).unwrap();
        assert_eq!(walk.get(), Some(9.0));
        assert!(store.is_overridden("movement.walk_speed"));

        // Re-registering keeps the override
        store.register(&LocomotionConfig::tactical()).unwrap();
        assert_eq!(walk.get(), Some(9.0));

        store.reset("movement.walk_speed");
        assert_eq!(walk.get(), Some(3.5));

        store.set("movement.walk_speed", 2.0).unwrap();
        store.reset_all();
        assert_eq!(walk.get(), Some(3.5));
    }

    #[test]
    fn test_set_unknown_key_fails() {
        let store = ConfigStore::shared(&LocomotionConfig::default()).unwrap();
        assert!(matches!(
            store.set("ladder.nope", 1.0),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            store.set("sprint.speed", f32::NAN),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(store.has_key("sprint.speed"));
    }
}
