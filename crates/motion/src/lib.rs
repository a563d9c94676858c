//! Ascend Motion
//!
//! The per-frame decision pipeline for a first-person character: player
//! intents are resolved into actions through condition-gated rules, and an
//! ordered stack of movement abilities turns those actions into a single
//! velocity and rotation for a kinematic motor step.
//!
//! # Architecture
//!
//! ```text
//! device input ──► IntentBuffer ──► ActionResolver ──► ActionBuffer
//!                                        │                  │
//!                                   Conditions        AbilityStack ──► KinematicMotor
//!                                        ▲                  │
//!                                        └── CharacterState ◄┘
//! ```
//!
//! - **Intents**: what the player wants this tick, one slot per kind
//! - **Actions**: what will happen this tick, rebuilt from scratch every pass
//! - **Abilities**: additive modifiers (gravity, ground move, sprint, crouch)
//!   and mode switches (ladder climbing) that may claim the step exclusively
//!
//! # Design Principles
//!
//! 1. **Never fatal**: missing config, unbound conditions and absent ladders
//!    degrade to a no-op for that frame
//! 2. **Deterministic ordering**: abilities sort by priority, ties by
//!    registration order
//! 3. **Closed kinds**: intents and actions are sum types, not reflection

pub mod ability;
pub mod action;
pub mod buffer;
pub mod condition;
pub mod config;
pub mod context;
pub mod intent;
pub mod ladder;
pub mod math;
pub mod motor;
pub mod resolver;
pub mod resource;
pub mod state;

// Re-export commonly used types
pub use ability::{AbilityStack, ClimbState, MovementAbility};
pub use action::{Action, ActionBuffer, ActionKind, SharedActions};
pub use condition::{Condition, ConditionDef};
pub use config::{ConfigError, ConfigStore, ConfigValue, LocomotionConfig};
pub use context::CharacterContext;
pub use intent::{Intent, IntentBuffer, IntentKind};
pub use ladder::{Ladder, LadderSet};
pub use motor::{CapsuleDimensions, CharacterMotor, KinematicMotor, MotorCallbacks};
pub use resolver::{ActionResolver, ActionRule, RuleDef, RuleKind};
pub use resource::Resource;
pub use state::{CharacterState, StateFlags};
