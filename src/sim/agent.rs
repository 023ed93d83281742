//! The hopping agent
//!
//! The agent rests on grid cells and moves by discrete hops. A hop is an
//! explicit in-transit state with eased progress; hazards never see the
//! agent until it has landed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::rect::Rect;
use crate::consts::HOP_EPSILON;
use crate::tuning::AgentTuning;
use crate::{hop_arc, lerp, smoothstep};

/// Directional request for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl MoveIntent {
    /// (column delta, row delta); Up advances along the course
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            MoveIntent::None => None,
            MoveIntent::Up => Some((0, 1)),
            MoveIntent::Down => Some((0, -1)),
            MoveIntent::Left => Some((-1, 0)),
            MoveIntent::Right => Some((1, 0)),
        }
    }
}

/// A hop in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub from_x: f32,
    pub from_row: i32,
    pub to_column: i32,
    pub to_row: i32,
    /// Seconds since take-off
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    AtRest,
    InTransit(Hop),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Hitbox overlapped a vehicle on a road row
    HitByVehicle,
    /// Landed on water away from any platform
    Drowned,
    /// A drifting log carried the agent past the playable edge
    SweptOffEdge,
}

/// Terminal once `Dead`; only a reset brings the agent back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vitality {
    Alive,
    Dead(DeathCause),
}

/// Result of a hop completing this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub column: i32,
    pub row: i32,
    /// The landing row beat the previous high-water mark
    pub new_best: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    grid: Grid,
    tuning: AgentTuning,
    /// Resting centre x; drifts off the cell centre while carried
    x: f32,
    row: i32,
    motion: Motion,
    vitality: Vitality,
    max_row: i32,
}

impl Agent {
    /// Agent resting in the middle column of row 0
    pub fn new(grid: Grid, tuning: AgentTuning) -> Self {
        Self::at(grid, tuning, grid.center_column(), 0)
    }

    pub fn at(grid: Grid, tuning: AgentTuning, column: i32, row: i32) -> Self {
        Self {
            grid,
            tuning,
            x: grid.column_center_x(grid.clamp_column(column)),
            row,
            motion: Motion::AtRest,
            vitality: Vitality::Alive,
            max_row: row.max(0),
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Resting column (the cell under the resting centre)
    #[inline]
    pub fn column(&self) -> i32 {
        self.grid.column_of(self.x)
    }

    /// Resting row; only changes when a hop lands
    #[inline]
    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn vitality(&self) -> Vitality {
        self.vitality
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.vitality == Vitality::Alive
    }

    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.motion == Motion::AtRest
    }

    /// Highest row ever landed on
    pub fn max_row(&self) -> i32 {
        self.max_row
    }

    pub fn score(&self) -> u32 {
        self.max_row.max(0) as u32
    }

    /// Hop progress in [0, 1] while in transit
    pub fn progress(&self) -> Option<f32> {
        match self.motion {
            Motion::AtRest => None,
            Motion::InTransit(hop) => {
                Some((hop.elapsed / self.tuning.hop_duration).clamp(0.0, 1.0))
            }
        }
    }

    /// Start a hop; ignored while dead, mid-hop, or if the target is off the grid
    pub fn request(&mut self, intent: MoveIntent) -> bool {
        let Some((dcol, drow)) = intent.delta() else {
            return false;
        };
        if !self.is_alive() || !self.is_at_rest() {
            return false;
        }
        let to_column = self.column() + dcol;
        let to_row = self.row + drow;
        if !self.grid.contains_column(to_column) || to_row < self.tuning.retreat_limit_row {
            return false;
        }

        self.motion = Motion::InTransit(Hop {
            from_x: self.x,
            from_row: self.row,
            to_column,
            to_row,
            elapsed: 0.0,
        });
        true
    }

    /// Advance hop progress; returns the landing if the hop finished this tick
    pub fn advance(&mut self, dt: f32) -> Option<Landing> {
        if !self.is_alive() {
            return None;
        }
        let Motion::InTransit(mut hop) = self.motion else {
            return None;
        };

        hop.elapsed += dt;
        if hop.elapsed < self.tuning.hop_duration * (1.0 - HOP_EPSILON) {
            self.motion = Motion::InTransit(hop);
            return None;
        }

        self.motion = Motion::AtRest;
        self.x = self.grid.column_center_x(hop.to_column);
        self.row = hop.to_row;
        let new_best = self.row > self.max_row;
        if new_best {
            self.max_row = self.row;
        }
        Some(Landing {
            column: hop.to_column,
            row: hop.to_row,
            new_best,
        })
    }

    /// Centre on the ground plane, without the cosmetic hop arc
    pub fn ground_position(&self) -> Vec2 {
        match self.motion {
            Motion::AtRest => Vec2::new(self.x, self.grid.row_center_y(self.row)),
            Motion::InTransit(hop) => {
                let ease = smoothstep(hop.elapsed / self.tuning.hop_duration);
                let to_x = self.grid.column_center_x(hop.to_column);
                let from_y = self.grid.row_center_y(hop.from_row);
                let to_y = self.grid.row_center_y(hop.to_row);
                Vec2::new(lerp(hop.from_x, to_x, ease), lerp(from_y, to_y, ease))
            }
        }
    }

    /// Drawn centre, including the hop arc
    pub fn position(&self) -> Vec2 {
        let arc = self
            .progress()
            .map_or(0.0, |p| hop_arc(p, self.tuning.arc_height_tiles * self.grid.tile));
        self.ground_position() + Vec2::new(0.0, arc)
    }

    /// Square hitbox around the ground position
    pub fn hitbox(&self) -> Rect {
        Rect::from_center(self.ground_position(), Vec2::splat(self.tuning.hitbox_size))
    }

    /// Horizontal displacement from a carrying platform
    pub(crate) fn carry(&mut self, dx: f32) {
        self.x += dx;
    }

    pub(crate) fn kill(&mut self, cause: DeathCause) {
        if self.is_alive() {
            self.vitality = Vitality::Dead(cause);
        }
    }
}
