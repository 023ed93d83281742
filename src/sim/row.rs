//! A single row of the course and what lives on it

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::occupant::Occupant;
use super::rect::Rect;
use super::scheduler::SpawnScheduler;
use crate::tuning::Tuning;

/// How a water row can be crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformStyle {
    /// Fixed pads on reserved columns
    Stepping,
    /// Logs drifting across the row
    Drifting,
}

/// Row classification exposed to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Safe,
    Road,
    Water(PlatformStyle),
}

impl RowKind {
    pub fn is_hazard(self) -> bool {
        !matches!(self, RowKind::Safe)
    }
}

/// Ties a water row to the river segment that generated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMark {
    pub segment: u32,
    /// Column guaranteed crossable on this row of the segment
    pub route_column: i32,
}

/// Fixed pad layout of a stepping row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteppingLayout {
    pub route_column: i32,
    /// Reserved pad columns; always contains `route_column`
    pub columns: Vec<i32>,
}

impl SteppingLayout {
    /// Route pad first, then 1-3 extras kept at least the minimum separation
    /// from every other pad so no second trivial bridge appears
    pub fn generate<R: Rng + ?Sized>(route_column: i32, tuning: &Tuning, rng: &mut R) -> Self {
        let river = &tuning.river;
        let mut columns = vec![route_column];

        let mut candidates: Vec<i32> = (0..tuning.grid.columns).collect();
        candidates.shuffle(rng);
        let extra = rng.random_range(river.extra_pads_min..=river.extra_pads_max) as usize;

        for c in candidates {
            if columns.len() >= 1 + extra {
                break;
            }
            if columns.iter().all(|pc| (c - pc).abs() >= river.pad_min_separation) {
                columns.push(c);
            }
        }

        Self { route_column, columns }
    }

    pub fn has_pad(&self, column: i32) -> bool {
        self.columns.contains(&column)
    }
}

/// Row contents; a water row is stepping or drifting, never both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Lane {
    Safe,
    Road(SpawnScheduler),
    Stepping(SteppingLayout),
    Drifting(SpawnScheduler),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub index: i32,
    pub lane: Lane,
    pub segment: Option<SegmentMark>,
}

impl Row {
    pub fn safe(index: i32) -> Self {
        Self {
            index,
            lane: Lane::Safe,
            segment: None,
        }
    }

    pub fn road<R: Rng + ?Sized>(index: i32, tuning: &Tuning, rng: &mut R) -> Self {
        Self {
            index,
            lane: Lane::Road(SpawnScheduler::road(tuning, rng)),
            segment: None,
        }
    }

    pub fn river<R: Rng + ?Sized>(
        index: i32,
        style: PlatformStyle,
        mark: SegmentMark,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let lane = match style {
            PlatformStyle::Stepping => {
                Lane::Stepping(SteppingLayout::generate(mark.route_column, tuning, rng))
            }
            PlatformStyle::Drifting => Lane::Drifting(SpawnScheduler::drifting(tuning, rng)),
        };
        Self {
            index,
            lane,
            segment: Some(mark),
        }
    }

    pub fn kind(&self) -> RowKind {
        match self.lane {
            Lane::Safe => RowKind::Safe,
            Lane::Road(_) => RowKind::Road,
            Lane::Stepping(_) => RowKind::Water(PlatformStyle::Stepping),
            Lane::Drifting(_) => RowKind::Water(PlatformStyle::Drifting),
        }
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, tuning: &Tuning, rng: &mut R) {
        match &mut self.lane {
            Lane::Road(scheduler) | Lane::Drifting(scheduler) => scheduler.advance(dt, tuning, rng),
            Lane::Safe | Lane::Stepping(_) => {}
        }
    }

    /// Vehicles or logs; empty for rows without moving occupants
    pub fn occupants(&self) -> &[Occupant] {
        match &self.lane {
            Lane::Road(scheduler) | Lane::Drifting(scheduler) => &scheduler.occupants,
            Lane::Safe | Lane::Stepping(_) => &[],
        }
    }

    pub fn occupant_rects(&self, grid: &Grid) -> Vec<Rect> {
        let base = grid.row_base_y(self.index);
        self.occupants().iter().map(|o| o.rect(base, grid.tile)).collect()
    }

    /// Reserved pad columns; empty unless stepping
    pub fn platform_columns(&self) -> &[i32] {
        match &self.lane {
            Lane::Stepping(layout) => &layout.columns,
            _ => &[],
        }
    }

    pub fn route_column(&self) -> Option<i32> {
        self.segment.map(|m| m.route_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_stepping_layout_always_has_route_pad() {
        let tuning = Tuning::default();
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let route = (seed % 10) as i32;
            let layout = SteppingLayout::generate(route, &tuning, &mut rng);
            assert_eq!(layout.columns[0], route);
            assert!(layout.has_pad(route));
            assert!(layout.columns.len() >= 2 && layout.columns.len() <= 4, "{:?}", layout.columns);
        }
    }

    #[test]
    fn test_stepping_pads_are_separated() {
        let tuning = Tuning::default();
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let layout = SteppingLayout::generate(5, &tuning, &mut rng);
            for (i, a) in layout.columns.iter().enumerate() {
                assert!((0..10).contains(a));
                for b in &layout.columns[i + 1..] {
                    assert!((a - b).abs() >= 2, "{:?}", layout.columns);
                }
            }
        }
    }

    #[test]
    fn test_kind_matches_lane() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mark = SegmentMark { segment: 0, route_column: 4 };
        assert_eq!(Row::safe(0).kind(), RowKind::Safe);
        assert_eq!(Row::road(1, &tuning, &mut rng).kind(), RowKind::Road);
        let drifting = Row::river(2, PlatformStyle::Drifting, mark, &tuning, &mut rng);
        assert_eq!(drifting.kind(), RowKind::Water(PlatformStyle::Drifting));
        assert!(drifting.platform_columns().is_empty());
        assert_eq!(drifting.route_column(), Some(4));
        let stepping = Row::river(3, PlatformStyle::Stepping, mark, &tuning, &mut rng);
        assert!(stepping.platform_columns().contains(&4));
        assert!(stepping.occupants().is_empty());
    }

    #[test]
    fn test_occupant_rects_sit_on_their_row() {
        let tuning = Tuning::default();
        let grid = Grid::from(tuning.grid);
        let mut rng = Pcg32::seed_from_u64(8);
        let mut row = Row::road(3, &tuning, &mut rng);
        for _ in 0..300 {
            row.advance(1.0 / 60.0, &tuning, &mut rng);
        }
        let rects = row.occupant_rects(&grid);
        assert!(!rects.is_empty());
        for r in rects {
            assert!(r.min.y >= grid.row_base_y(3) && r.max().y <= grid.row_base_y(4));
        }
    }
}
