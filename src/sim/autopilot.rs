//! Idle/demo mode: a simple forward-biased player
//!
//! Looks one hop ahead, predicting where vehicles and logs will be when the
//! hop lands. Good enough to make visible progress, not to play perfectly.

use glam::Vec2;

use super::agent::MoveIntent;
use super::grid::Grid;
use super::occupant::Occupant;
use super::rect::Rect;
use super::row::{Lane, Row};
use super::state::GameState;

/// Pick this tick's intent for the agent
pub fn choose_intent(state: &GameState) -> MoveIntent {
    let agent = &state.agent;
    if !agent.is_alive() || !agent.is_at_rest() {
        return MoveIntent::None;
    }

    let column = agent.column();
    let row = agent.row();
    let ahead = state.row(row + 1);
    if landing_is_safe(state, ahead, column) {
        return MoveIntent::Up;
    }

    // Line up with the closest pad on a stepping row ahead
    if let Some(Lane::Stepping(layout)) = ahead.map(|r| &r.lane) {
        let nearest = layout
            .columns
            .iter()
            .copied()
            .min_by_key(|pad| (pad - column).abs());
        let slide = match nearest {
            Some(pad) if pad < column => MoveIntent::Left,
            Some(pad) if pad > column => MoveIntent::Right,
            _ => MoveIntent::None,
        };
        if let Some((dcol, _)) = slide.delta() {
            if landing_is_safe(state, state.row(row), column + dcol) {
                return slide;
            }
        }
    }

    MoveIntent::None
}

/// Whether a hop into `column` of `row` would survive its landing
fn landing_is_safe(state: &GameState, row: Option<&Row>, column: i32) -> bool {
    let Some(row) = row else {
        return false;
    };
    let grid = state.course.grid();
    if !grid.contains_column(column) {
        return false;
    }
    let tuning = state.tuning();
    let hop = tuning.agent.hop_duration;
    let landing = Rect::from_center(
        grid.cell_center(column, row.index),
        Vec2::splat(tuning.agent.hitbox_size),
    );

    match &row.lane {
        Lane::Safe => true,
        Lane::Stepping(layout) => layout.has_pad(column),
        // Clear now, at touchdown, and one hop later so there is time to move on
        Lane::Road(_) => [0.0, hop, hop * 2.0].iter().all(|&t| {
            row.occupants()
                .iter()
                .filter(|o| o.kind.is_vehicle())
                .all(|car| !landing.intersects(&projected(car, t, row.index, grid)))
        }),
        Lane::Drifting(_) => row.occupants().iter().any(|log| {
            let rect = projected(log, hop, row.index, grid);
            rect.contains_point(landing.center())
        }),
    }
}

fn projected(occupant: &Occupant, t: f32, row: i32, grid: &Grid) -> Rect {
    let mut ghost = occupant.clone();
    ghost.advance(t);
    ghost.rect(grid.row_base_y(row), grid.tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::sim::agent::{Agent, DeathCause};
    use crate::sim::occupant::{Direction, OccupantKind};
    use crate::sim::row::{RowKind, SegmentMark, SteppingLayout};
    use crate::sim::scheduler::{SpawnScheduler, Stream};

    fn state_with(column: i32, current: Lane, ahead: Lane) -> GameState {
        let mut state = GameState::new(606);
        let tuning = *state.tuning();
        state.agent = Agent::at(Grid::from(tuning.grid), tuning.agent, column, 1);
        for (index, lane) in [(1, current), (2, ahead)] {
            let segment = match &lane {
                Lane::Stepping(layout) => Some(SegmentMark {
                    segment: 0,
                    route_column: layout.route_column,
                }),
                _ => None,
            };
            state.course.replace_row(Row { index, lane, segment });
        }
        state
    }

    fn lane_of(stream: Stream, occupants: Vec<Occupant>) -> Lane {
        let mut scheduler = SpawnScheduler::with_state(stream, Direction::Right, 100.0, 1000.0);
        scheduler.occupants = occupants;
        match stream {
            Stream::Vehicles => Lane::Road(scheduler),
            Stream::Logs => Lane::Drifting(scheduler),
        }
    }

    fn occupant(kind: OccupantKind, x: f32, width: f32) -> Occupant {
        Occupant {
            kind,
            x,
            width,
            height: 33.6,
            velocity: 100.0,
            spawned_at: 0.0,
        }
    }

    #[test]
    fn test_hops_onto_safe_ground() {
        let state = state_with(4, Lane::Safe, Lane::Safe);
        assert_eq!(choose_intent(&state), MoveIntent::Up);
    }

    #[test]
    fn test_waits_for_car_in_landing_cell() {
        let car = occupant(OccupantKind::Car, 190.0, 60.0);
        let state = state_with(4, Lane::Safe, lane_of(Stream::Vehicles, vec![car]));
        assert_eq!(choose_intent(&state), MoveIntent::None);
    }

    #[test]
    fn test_crosses_empty_road() {
        let state = state_with(4, Lane::Safe, lane_of(Stream::Vehicles, vec![]));
        assert_eq!(choose_intent(&state), MoveIntent::Up);
    }

    #[test]
    fn test_slides_toward_nearest_pad() {
        let pads = SteppingLayout {
            route_column: 7,
            columns: vec![1, 7],
        };
        let state = state_with(5, Lane::Safe, Lane::Stepping(pads));
        assert_eq!(choose_intent(&state), MoveIntent::Right);
    }

    #[test]
    fn test_boards_log_that_will_be_under_landing() {
        // Landing centre x=216; log spans 130..250 after one hop at 100 units/sec
        let log = occupant(OccupantKind::Log, 118.0, 120.0);
        let state = state_with(4, Lane::Safe, lane_of(Stream::Logs, vec![log]));
        assert_eq!(choose_intent(&state), MoveIntent::Up);

        let far = occupant(OccupantKind::Log, 300.0, 120.0);
        let state = state_with(4, Lane::Safe, lane_of(Stream::Logs, vec![far]));
        assert_eq!(choose_intent(&state), MoveIntent::None);
    }

    #[test]
    fn test_idle_when_dead_or_hopping() {
        let mut state = state_with(4, Lane::Safe, Lane::Safe);
        state.agent.kill(DeathCause::HitByVehicle);
        assert_eq!(choose_intent(&state), MoveIntent::None);

        let mut state = state_with(4, Lane::Safe, Lane::Safe);
        state.agent.request(MoveIntent::Up);
        assert_eq!(choose_intent(&state), MoveIntent::None);
    }

    #[test]
    fn test_never_hops_into_projected_traffic() {
        let mut road_crossings = 0;
        for seed in 0..6 {
            let mut state = GameState::new(seed);
            let hop = state.tuning().agent.hop_duration;
            let size = Vec2::splat(state.tuning().agent.hitbox_size);
            let mut hazard_rows = 0;
            for _ in 0..1800 {
                let intent = choose_intent(&state);
                let target = state.agent.row() + 1;
                if let (MoveIntent::Up, Some(ahead)) = (intent, state.row(target)) {
                    if ahead.kind().is_hazard() {
                        hazard_rows += 1;
                    }
                    if ahead.kind() == RowKind::Road {
                        road_crossings += 1;
                        let grid = *state.course.grid();
                        let landing =
                            Rect::from_center(grid.cell_center(state.agent.column(), target), size);
                        for t in [0.0, hop] {
                            for car in ahead.occupants() {
                                let mut rect = car.rect(grid.row_base_y(target), grid.tile);
                                rect.min.x += car.velocity * t;
                                assert!(!landing.intersects(&rect), "seed {seed} row {target}");
                            }
                        }
                    }
                }
                state.advance(FRAME_DT, intent);
                if !state.is_alive() {
                    break;
                }
            }
            assert!(state.score() >= 2, "seed {seed} stalled at {}", state.score());
            assert!(hazard_rows > 0);
        }
        assert!(road_crossings > 0);
    }
}
