//! Post-landing hazard resolution
//!
//! Runs once per tick and only for a living agent at rest: nothing can
//! kill or carry the agent mid-hop. The resolver reads the row under the
//! agent and writes only the agent's position and vitality.

use super::agent::{Agent, DeathCause};
use super::grid::Grid;
use super::row::{Lane, Row};
use crate::tuning::Tuning;

/// What resolution did to the agent this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Agent in transit, dead, or on a row with no hazards
    Skipped,
    /// Hazard row survived without displacement
    Survived,
    /// Standing on a drifting log and moved by `dx`
    Carried { dx: f32 },
    Killed(DeathCause),
}

/// Resolve the agent against the row it rests on (`None` means no row is loaded)
pub fn resolve(agent: &mut Agent, row: Option<&Row>, dt: f32, tuning: &Tuning) -> Resolution {
    if !agent.is_alive() || !agent.is_at_rest() {
        return Resolution::Skipped;
    }
    let Some(row) = row else {
        return Resolution::Skipped;
    };
    let grid = Grid::from(tuning.grid);

    match &row.lane {
        Lane::Safe => Resolution::Skipped,
        Lane::Road(_) => resolve_road(agent, row, &grid),
        Lane::Stepping(layout) => {
            let center = agent.ground_position();
            let river = &tuning.river;
            let capture = river.pad_radius_tiles * grid.tile * river.pad_capture_factor;
            let on_pad = layout.columns.iter().any(|&col| {
                grid.cell_center(col, row.index).distance_squared(center) <= capture * capture
            });
            if on_pad {
                Resolution::Survived
            } else {
                kill(agent, DeathCause::Drowned)
            }
        }
        Lane::Drifting(_) => resolve_drifting(agent, row, &grid, dt),
    }
}

fn resolve_road(agent: &mut Agent, row: &Row, grid: &Grid) -> Resolution {
    let hitbox = agent.hitbox();
    let base = grid.row_base_y(row.index);
    let hit = row
        .occupants()
        .iter()
        .filter(|o| o.kind.is_vehicle())
        .any(|car| hitbox.intersects(&car.rect(base, grid.tile)));
    if hit {
        kill(agent, DeathCause::HitByVehicle)
    } else {
        Resolution::Survived
    }
}

fn resolve_drifting(agent: &mut Agent, row: &Row, grid: &Grid, dt: f32) -> Resolution {
    let hitbox = agent.hitbox();
    let base = grid.row_base_y(row.index);
    let support = row
        .occupants()
        .iter()
        .find(|log| hitbox.intersects(&log.rect(base, grid.tile)));

    let Some(log) = support else {
        return kill(agent, DeathCause::Drowned);
    };

    let dx = log.velocity * dt;
    agent.carry(dx);
    // Column must stay within [0, columns): the far edge itself is off the grid
    if agent.x() < 0.0 || agent.x() >= grid.width() {
        return kill(agent, DeathCause::SweptOffEdge);
    }
    Resolution::Carried { dx }
}

fn kill(agent: &mut Agent, cause: DeathCause) -> Resolution {
    log::debug!("agent died at column {} row {}: {:?}", agent.column(), agent.row(), cause);
    agent.kill(cause);
    Resolution::Killed(cause)
}
