//! Ascend Game
//!
//! A reference host for the locomotion pipeline in `ascend-motion`:
//!
//! - Device input sampled into intents
//! - Static level geometry with ladders and spawn points
//! - A kinematic capsule motor built on parry3d queries
//! - Camera pitch, kept apart from body yaw, and eye height
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Character                            │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐  │
//! │  │ InputSampler│──►│ActionResolver│──►│ AbilityStack      │  │
//! │  │ (intents)   │   │ (actions)    │   │ via CharacterMotor│  │
//! │  └─────────────┘   └──────────────┘   └─────────┬─────────┘  │
//! │                                                 ▼            │
//! │                                  SimpleMotor ──► CollisionWorld
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod character;
pub mod collision;
pub mod input;
pub mod level;
pub mod motor;
pub mod view;

// Re-export main types
pub use character::{Character, CharacterSnapshot};
pub use collision::{CollisionWorld, RayHit};
pub use input::{InputSampler, PlayerInput};
pub use level::{Level, SpawnPoint};
pub use motor::SimpleMotor;
pub use view::{CameraHeight, CameraPitch};
