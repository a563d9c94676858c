//! Player intents: what the player wants this tick.
//!
//! Intents are written by the input layer while sampling devices and read by
//! the [`ActionResolver`](crate::resolver::ActionResolver). They persist until
//! removed (a held key keeps its intent alive), so the resolver never
//! consumes them.

use glam::Vec2;

use crate::buffer::{slot_kinds, SlotBuffer};

slot_kinds! {
    /// A single declared player intention.
    pub enum Intent, kind IntentKind {
        /// Planar movement in local space: x = strafe right, y = forward.
        Move(MoveIntent) { direction: Vec2 },
        /// View rotation delta this tick (radians): x = yaw, y = pitch.
        Look(LookIntent) { delta: Vec2 },
        /// Jump is requested.
        Jump(JumpIntent) {},
        /// Sprint is held.
        Sprint(SprintIntent) {},
        /// Crouch is held.
        Crouch(CrouchIntent) {},
        /// Interact/use is requested.
        Interact(InteractIntent) {},
        /// Primary attack is requested.
        Attack(AttackIntent) {},
    }
}

/// Per-tick storage of intents, one slot per [`IntentKind`].
pub type IntentBuffer = SlotBuffer<Intent>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SlotValue;

    #[test]
    fn test_every_kind_has_a_slot() {
        assert_eq!(Intent::SLOT_COUNT, IntentKind::ALL.len());
        for (index, kind) in IntentKind::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), index);
        }
    }

    #[test]
    fn test_kind_of_value() {
        let intent: Intent = LookIntent { delta: Vec2::new(0.1, 0.0) }.into();
        assert_eq!(intent.kind(), IntentKind::Look);
    }
}
