//! Resolved actions: what will happen this tick.
//!
//! The action buffer is owned by the resolver (single writer) and read by the
//! abilities. It is cleared at the start of every resolution pass, so an
//! action never survives into the next tick unless a rule re-produces it.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::buffer::{slot_kinds, SlotBuffer};

slot_kinds! {
    /// A resolved decision for the current tick.
    pub enum Action, kind ActionKind {
        /// Planar movement in local space: x = strafe right, y = forward.
        Move(MoveAction) { direction: Vec2 },
        /// View rotation delta (radians): x = yaw, y = pitch.
        Look(LookAction) { delta: Vec2 },
        /// Jump, or jump off a ladder while climbing.
        Jump(JumpAction) {},
        /// Sprint while grounded and moving.
        Sprint(SprintAction) {},
        /// Crouch while held.
        Crouch(CrouchAction) {},
        /// Interact; attaches to a nearby ladder.
        Interact(InteractAction) {},
        /// Primary attack.
        Attack(AttackAction) {},
    }
}

/// Per-tick storage of actions, one slot per [`ActionKind`].
pub type ActionBuffer = SlotBuffer<Action>;

/// Action buffer shared between the resolver and the abilities.
pub type SharedActions = Rc<RefCell<ActionBuffer>>;

/// Create a fresh shared action buffer.
pub fn shared_actions() -> SharedActions {
    Rc::new(RefCell::new(ActionBuffer::new()))
}
