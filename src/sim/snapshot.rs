//! Read-only view of the course for renderers and tooling

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::occupant::OccupantKind;
use super::rect::Rect;
use super::row::{Row, RowKind};
use super::state::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    /// Drawn centre, including the hop arc
    pub position: Vec2,
    pub hitbox: Rect,
    pub column: i32,
    pub row: i32,
    pub in_transit: bool,
    pub alive: bool,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupantView {
    pub kind: OccupantKind,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    pub index: i32,
    pub kind: RowKind,
    pub occupants: Vec<OccupantView>,
    /// Reserved pad columns on stepping rows
    pub platform_columns: Vec<i32>,
    /// Guaranteed crossing column on river rows
    pub route_column: Option<i32>,
}

impl RowView {
    fn of(row: &Row, grid: &Grid) -> Self {
        let base = grid.row_base_y(row.index);
        Self {
            index: row.index,
            kind: row.kind(),
            occupants: row
                .occupants()
                .iter()
                .map(|o| OccupantView {
                    kind: o.kind,
                    rect: o.rect(base, grid.tile),
                })
                .collect(),
            platform_columns: row.platform_columns().to_vec(),
            route_column: row.route_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub tick: u64,
    pub seed: u64,
    pub agent: AgentView,
    /// Live rows, ascending by index
    pub rows: Vec<RowView>,
}

impl CourseSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let agent = &state.agent;
        let grid = state.course.grid();
        Self {
            tick: state.time_ticks,
            seed: state.seed,
            agent: AgentView {
                position: agent.position(),
                hitbox: agent.hitbox(),
                column: agent.column(),
                row: agent.row(),
                in_transit: !agent.is_at_rest(),
                alive: agent.is_alive(),
                score: agent.score(),
            },
            rows: state.rows().map(|row| RowView::of(row, grid)).collect(),
        }
    }

    pub fn row(&self, index: i32) -> Option<&RowView> {
        self.rows.iter().find(|r| r.index == index)
    }

    /// Where the camera should look, without any smoothing
    pub fn focus(&self) -> Vec2 {
        self.agent.position
    }
}
