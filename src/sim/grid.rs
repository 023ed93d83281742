//! Grid cell <-> world coordinate conversions
//!
//! World x runs left to right across the playable width starting at 0.
//! World y grows with row index: row `r` spans `[r * tile, (r + 1) * tile)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::GridTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub tile: f32,
    pub columns: i32,
}

impl From<GridTuning> for Grid {
    fn from(t: GridTuning) -> Self {
        Self {
            tile: t.tile,
            columns: t.columns,
        }
    }
}

impl Grid {
    /// Playable width in world units
    #[inline]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile
    }

    #[inline]
    pub fn column_center_x(&self, column: i32) -> f32 {
        column as f32 * self.tile + self.tile * 0.5
    }

    /// Bottom edge of a row
    #[inline]
    pub fn row_base_y(&self, row: i32) -> f32 {
        row as f32 * self.tile
    }

    #[inline]
    pub fn row_center_y(&self, row: i32) -> f32 {
        self.row_base_y(row) + self.tile * 0.5
    }

    #[inline]
    pub fn cell_center(&self, column: i32, row: i32) -> Vec2 {
        Vec2::new(self.column_center_x(column), self.row_center_y(row))
    }

    /// Column containing world x (floor division, may be out of range)
    #[inline]
    pub fn column_of(&self, x: f32) -> i32 {
        (x / self.tile).floor() as i32
    }

    #[inline]
    pub fn contains_column(&self, column: i32) -> bool {
        (0..self.columns).contains(&column)
    }

    #[inline]
    pub fn clamp_column(&self, column: i32) -> i32 {
        column.clamp(0, self.columns - 1)
    }

    /// The column nearest the horizontal middle
    #[inline]
    pub fn center_column(&self) -> i32 {
        self.columns / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid { tile: 48.0, columns: 10 }
    }

    #[test]
    fn test_cell_centers() {
        let g = grid();
        assert_eq!(g.column_center_x(4), 216.0);
        assert_eq!(g.row_center_y(1), 72.0);
        assert_eq!(g.row_center_y(-1), -24.0);
        assert_eq!(g.width(), 480.0);
    }

    #[test]
    fn test_column_of_floors() {
        let g = grid();
        assert_eq!(g.column_of(216.0), 4);
        assert_eq!(g.column_of(47.9), 0);
        assert_eq!(g.column_of(-0.5), -1);
        assert!(!g.contains_column(10));
        assert_eq!(g.clamp_column(12), 9);
        assert_eq!(g.clamp_column(-3), 0);
    }
}
