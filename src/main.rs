//! Ascend - Headless Harness
//!
//! Drives one character through the test arena with a scripted input
//! sequence (walk to the tower, climb its ladder, step onto the roof) and
//! prints a JSON snapshot after each phase.
//!
//! Usage: `ascend [arcade | tactical | <config.json>]`

use std::error::Error;

use ascend_game::{Character, Level, PlayerInput};
use ascend_motion::{ConfigStore, LocomotionConfig};

const TICK_RATE: f32 = 60.0;

/// One scripted stretch of held input.
struct Phase {
    label: &'static str,
    ticks: u32,
    input: PlayerInput,
}

fn held(forward: bool, interact: bool, jump: bool, crouch: bool) -> PlayerInput {
    let mut input = PlayerInput::default();
    input.movement.forward = forward;
    input.actions.interact = interact;
    input.actions.jump = jump;
    input.actions.crouch = crouch;
    input
}

fn script() -> Vec<Phase> {
    vec![
        Phase {
            label: "approach",
            ticks: 120,
            input: held(true, false, false, false),
        },
        Phase {
            label: "grab",
            ticks: 1,
            input: held(true, true, false, false),
        },
        Phase {
            label: "climb",
            ticks: 110,
            input: held(true, false, false, false),
        },
        Phase {
            label: "settle",
            ticks: 60,
            input: PlayerInput::default(),
        },
        Phase {
            label: "hop",
            ticks: 30,
            input: held(false, false, true, false),
        },
        Phase {
            label: "crouch",
            ticks: 30,
            input: held(false, false, false, true),
        },
    ]
}

fn load_config(arg: Option<String>) -> Result<LocomotionConfig, Box<dyn Error>> {
    let config = match arg.as_deref() {
        None => LocomotionConfig::default(),
        Some("arcade") => LocomotionConfig::arcade(),
        Some("tactical") => LocomotionConfig::tactical(),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            LocomotionConfig::from_json(&text)?
        }
    };
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = load_config(std::env::args().nth(1))?;
    let store = ConfigStore::shared(&config)?;
    log::info!("loaded {} tunables", store.keys().len());

    let level = Level::test_arena();
    let spawn = *level.spawn(0).ok_or("test arena has no spawn point")?;
    let mut character = Character::spawn(&level, spawn, store);

    let dt = 1.0 / TICK_RATE;
    let mut frame = 0u32;
    for phase in script() {
        let mut input = phase.input.clone();
        for _ in 0..phase.ticks {
            input.frame = frame;
            character.tick(&input, dt);
            frame += 1;
        }

        let snapshot = character.snapshot();
        log::info!(
            "{} done at frame {}: {:?}, climb {:?}",
            phase.label,
            frame,
            snapshot.position,
            snapshot.climb_state
        );
        println!(
            "{}",
            serde_json::json!({ "phase": phase.label, "frame": frame, "character": snapshot })
        );
    }

    Ok(())
}
