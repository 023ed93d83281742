//! Lane Hopper headless runner
//!
//! Plays the course with the autopilot at a fixed frame rate and prints the
//! final snapshot as JSON.
//!
//! Usage: `lane-hopper [seed] [ticks] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_hopper::Tuning;
    use lane_hopper::consts::FRAME_DT;
    use lane_hopper::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Lane Hopper (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x1a2e_4097);
    let ticks = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(3600);
    let tuning = match args.next() {
        Some(path) => load_tuning(&path),
        None => Tuning::default(),
    };

    let mut state = GameState::with_tuning(seed, tuning);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    for _ in 0..ticks {
        tick(&mut state, &input, FRAME_DT);
        for event in &state.events {
            match event {
                GameEvent::NewBest { row } if row % 25 == 0 => {
                    log::info!("reached row {} after {:.1}s", row, state.elapsed);
                }
                GameEvent::Died { cause } => {
                    log::info!("died ({:?}) with score {}", cause, state.score());
                }
                _ => {}
            }
        }
        if !state.is_alive() {
            break;
        }
    }

    log::info!(
        "finished after {} ticks, score {}",
        state.time_ticks,
        state.score()
    );
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("failed to serialize snapshot: {}", e),
    }
}

/// Read tuning from disk, falling back to defaults on any problem
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> lane_hopper::Tuning {
    use lane_hopper::Tuning;

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("could not read tuning from {}: {}", path, e);
            return Tuning::default();
        }
    };
    match Tuning::from_json(&text) {
        Ok(tuning) => {
            log::info!("loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("ignoring tuning from {}: {}", path, e);
            Tuning::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts drive the library directly on the web
}
