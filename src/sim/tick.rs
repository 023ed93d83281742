//! Per-frame simulation tick
//!
//! Fixed order every frame: movement request, row window maintenance,
//! row schedulers and occupants, agent hop progress, then hazard
//! resolution for the row the agent rests on.

use super::agent::{Motion, MoveIntent};
use super::autopilot;
use super::hazard::{self, Resolution};
use super::state::{GameEvent, GameState};
use crate::consts::MAX_FRAME_DT;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional hop request (ignored mid-hop or when dead)
    pub intent: MoveIntent,
    /// Start a fresh run before simulating anything this frame
    pub restart: bool,
    /// Idle/demo mode - the autopilot picks the intent
    pub autopilot: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Restart lands on the frame boundary; nothing else runs this tick
    if input.restart {
        state.reset();
        return;
    }

    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    state.time_ticks += 1;
    state.elapsed += dt;

    let intent = if input.autopilot {
        autopilot::choose_intent(state)
    } else {
        input.intent
    };
    let from = (state.agent.column(), state.agent.row());
    if state.agent.request(intent) {
        if let Motion::InTransit(hop) = state.agent.motion() {
            state.events.push(GameEvent::Hopped {
                from,
                to: (hop.to_column, hop.to_row),
            });
        }
    }

    state.course.ensure_window(state.agent.row());
    state.course.advance(dt);

    if let Some(landing) = state.agent.advance(dt) {
        state.events.push(GameEvent::Landed {
            column: landing.column,
            row: landing.row,
        });
        if landing.new_best {
            state.events.push(GameEvent::NewBest { row: landing.row });
        }
    }

    let row = state.course.row(state.agent.row());
    let outcome = hazard::resolve(&mut state.agent, row, dt, state.course.tuning());
    if let Resolution::Killed(cause) = outcome {
        log::info!(
            "run over at row {} (score {}): {:?}",
            state.agent.row(),
            state.agent.score(),
            cause
        );
        state.events.push(GameEvent::Died { cause });
    }
}
