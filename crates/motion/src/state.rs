//! Shared character state.
//!
//! Abilities publish what they are responsible for (the ground move ability
//! owns `MOVING`, the crouch ability owns `CROUCHING`, the motor adapter owns
//! `GROUNDED` and the velocity) and conditions read it back. Every field has
//! exactly one writer; readers are unrestricted.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Flags describing the character's current locomotion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFlags(pub u8);

impl StateFlags {
    /// Stable on walkable ground.
    pub const GROUNDED: u8 = 1 << 0;

    /// Has meaningful movement input.
    pub const MOVING: u8 = 1 << 1;

    /// Capsule is in the crouched shape.
    pub const CROUCHING: u8 = 1 << 2;

    /// Sprinting on the ground.
    pub const SPRINTING: u8 = 1 << 3;

    /// Attached to a ladder (any non-idle climb state).
    pub const CLIMBING: u8 = 1 << 4;

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    #[inline]
    pub fn grounded(self) -> bool {
        self.has(Self::GROUNDED)
    }

    #[inline]
    pub fn moving(self) -> bool {
        self.has(Self::MOVING)
    }

    #[inline]
    pub fn crouching(self) -> bool {
        self.has(Self::CROUCHING)
    }

    #[inline]
    pub fn sprinting(self) -> bool {
        self.has(Self::SPRINTING)
    }

    #[inline]
    pub fn climbing(self) -> bool {
        self.has(Self::CLIMBING)
    }
}

/// Live state for one character, shared via `Rc`.
#[derive(Debug, Default)]
pub struct CharacterState {
    flags: Cell<StateFlags>,
    velocity: Cell<Vec3>,
}

/// Serializable copy of [`CharacterState`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub flags: StateFlags,
    pub velocity: Vec3,
}

impl CharacterState {
    /// Create a shared, zeroed state.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Current flags.
    pub fn flags(&self) -> StateFlags {
        self.flags.get()
    }

    /// Set or clear a single flag.
    pub fn set_flag(&self, flag: u8, value: bool) {
        let mut flags = self.flags.get();
        if flags.has(flag) != value {
            log::trace!("state flag {:#04x} -> {}", flag, value);
        }
        flags.set(flag, value);
        self.flags.set(flags);
    }

    pub fn is_grounded(&self) -> bool {
        self.flags().grounded()
    }

    pub fn is_moving(&self) -> bool {
        self.flags().moving()
    }

    pub fn is_crouching(&self) -> bool {
        self.flags().crouching()
    }

    pub fn is_sprinting(&self) -> bool {
        self.flags().sprinting()
    }

    pub fn is_climbing(&self) -> bool {
        self.flags().climbing()
    }

    pub fn set_grounded(&self, value: bool) {
        self.set_flag(StateFlags::GROUNDED, value);
    }

    pub fn set_moving(&self, value: bool) {
        self.set_flag(StateFlags::MOVING, value);
    }

    pub fn set_crouching(&self, value: bool) {
        self.set_flag(StateFlags::CROUCHING, value);
    }

    pub fn set_sprinting(&self, value: bool) {
        self.set_flag(StateFlags::SPRINTING, value);
    }

    pub fn set_climbing(&self, value: bool) {
        self.set_flag(StateFlags::CLIMBING, value);
    }

    /// Velocity published after the last motor step.
    pub fn velocity(&self) -> Vec3 {
        self.velocity.get()
    }

    pub fn set_velocity(&self, velocity: Vec3) {
        self.velocity.set(velocity);
    }

    /// Copy the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            flags: self.flags(),
            velocity: self.velocity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_flags() {
        let mut flags = StateFlags::default();
        assert!(!flags.grounded());

        flags.set(StateFlags::GROUNDED, true);
        flags.set(StateFlags::CROUCHING, true);
        assert!(flags.grounded());
        assert!(flags.crouching());
        assert!(!flags.sprinting());

        flags.set(StateFlags::GROUNDED, false);
        assert!(!flags.grounded());
        assert!(flags.crouching());
    }

    #[test]
    fn test_shared_state_is_visible_to_all_holders() {
        let state = CharacterState::shared();
        let reader = Rc::clone(&state);

        state.set_sprinting(true);
        state.set_velocity(Vec3::new(1.0, 0.0, 0.0));

        assert!(reader.is_sprinting());
        assert_eq!(reader.snapshot().velocity, Vec3::X);
    }
}
