//! Mobile occupants: vehicles on roads and drifting logs on rivers
//!
//! An occupant is a rectangle moving at a constant signed velocity along
//! its row. It is born off-view beyond one edge and dropped once it is
//! fully past the opposite edge by the despawn margin.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Travel direction of a row's occupants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupantKind {
    Car,
    Truck,
    Log,
}

impl OccupantKind {
    /// Whether touching it kills (vehicles) or supports (logs)
    pub fn is_vehicle(self) -> bool {
        matches!(self, OccupantKind::Car | OccupantKind::Truck)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupant {
    pub kind: OccupantKind,
    /// Left edge in world x
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Signed world units per second
    pub velocity: f32,
    /// Row-local clock reading when the scheduler emitted it
    pub spawned_at: f32,
}

impl Occupant {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn advance(&mut self, dt: f32) {
        self.x += self.velocity * dt;
    }

    /// World rectangle, vertically centred in the row whose bottom is `row_base_y`
    pub fn rect(&self, row_base_y: f32, tile: f32) -> Rect {
        let y = row_base_y + (tile - self.height) * 0.5;
        Rect::new(self.x, y, self.width, self.height)
    }

    /// True once the occupant has fully left `[0, view_width]` on its exit side
    pub fn is_gone(&self, view_width: f32, margin: f32) -> bool {
        if self.velocity >= 0.0 {
            self.x >= view_width + self.width + margin
        } else {
            self.right() <= -margin
        }
    }
}
