//! Hazard selection for newly generated rows
//!
//! Rules are evaluated in order for every new row:
//! 1. A river segment in progress always emits its next row.
//! 2. Too few safe rows since the last hazard emits Safe.
//! 3. The road run cap emits Safe and resets both counters.
//! 4. Otherwise one uniform draw picks river start, road, or safe.
//!
//! Rule 1 coming first keeps river segments atomic; the two counters bound
//! hazard runs and hazard spacing without lookahead.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::row::{PlatformStyle, SegmentMark};
use crate::tuning::Tuning;

/// What the policy decided for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneChoice {
    Safe,
    Road,
    River { style: PlatformStyle, mark: SegmentMark },
}

/// A multi-row river being emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RiverSegment {
    id: u32,
    pending: VecDeque<PlatformStyle>,
    route_column: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanePolicy {
    consecutive_roads: u32,
    safe_since_hazard: u32,
    segment: Option<RiverSegment>,
    next_segment_id: u32,
}

impl Default for LanePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl LanePolicy {
    pub fn new() -> Self {
        Self {
            consecutive_roads: 0,
            // A fresh course opens on safe ground, so the first hazard is not gated
            safe_since_hazard: u32::MAX,
            segment: None,
            next_segment_id: 0,
        }
    }

    pub fn consecutive_roads(&self) -> u32 {
        self.consecutive_roads
    }

    pub fn safe_since_hazard(&self) -> u32 {
        self.safe_since_hazard
    }

    /// True while a river segment still has rows to emit
    pub fn in_river(&self) -> bool {
        self.segment.is_some()
    }

    pub fn choose<R: Rng + ?Sized>(&mut self, tuning: &Tuning, rng: &mut R) -> LaneChoice {
        let grid = Grid::from(tuning.grid);
        let policy = &tuning.policy;

        if let Some(choice) = self.continue_river(&grid, tuning, rng) {
            return choice;
        }

        if self.safe_since_hazard < policy.min_safe_between_hazards {
            self.safe_since_hazard += 1;
            self.consecutive_roads = 0;
            return LaneChoice::Safe;
        }

        if self.consecutive_roads >= policy.max_consecutive_roads {
            self.consecutive_roads = 0;
            self.safe_since_hazard = 0;
            return LaneChoice::Safe;
        }

        let roll: f32 = rng.random();

        if roll < policy.river_start_probability {
            self.start_river(&grid, rng);
            // A just-started segment always has a first row
            if let Some(choice) = self.pop_river_row() {
                return choice;
            }
        }

        if roll < policy.river_start_probability + policy.road_probability {
            self.consecutive_roads += 1;
            self.safe_since_hazard = 0;
            return LaneChoice::Road;
        }

        self.consecutive_roads = 0;
        self.safe_since_hazard = self.safe_since_hazard.saturating_add(1);
        LaneChoice::Safe
    }

    /// Rule 1: next row of the current segment, with route drift applied
    fn continue_river<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Option<LaneChoice> {
        let segment = self.segment.as_mut()?;
        let drift = tuning.policy.route_drift.choose(rng).copied().unwrap_or(0);
        segment.route_column = grid.clamp_column(segment.route_column + drift);
        self.pop_river_row()
    }

    fn start_river<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        let pending: VecDeque<PlatformStyle> = if rng.random_bool(0.5) {
            [PlatformStyle::Stepping, PlatformStyle::Drifting].into()
        } else {
            [PlatformStyle::Stepping, PlatformStyle::Drifting, PlatformStyle::Stepping].into()
        };
        let route_column = grid.clamp_column(grid.center_column() + rng.random_range(-1..=1));

        let id = self.next_segment_id;
        self.next_segment_id = self.next_segment_id.wrapping_add(1);
        log::info!(
            "river segment {} starts: {} rows, route column {}",
            id,
            pending.len(),
            route_column
        );

        self.segment = Some(RiverSegment {
            id,
            pending,
            route_column,
        });
    }

    fn pop_river_row(&mut self) -> Option<LaneChoice> {
        let segment = self.segment.as_mut()?;
        let style = segment.pending.pop_front()?;
        let mark = SegmentMark {
            segment: segment.id,
            route_column: segment.route_column,
        };
        if segment.pending.is_empty() {
            self.segment = None;
        }
        self.safe_since_hazard = 0;
        self.consecutive_roads = 0;
        Some(LaneChoice::River { style, mark })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run(seed: u64, rows: usize) -> Vec<LaneChoice> {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut policy = LanePolicy::new();
        (0..rows).map(|_| policy.choose(&tuning, &mut rng)).collect()
    }

    fn river_style(choice: &LaneChoice) -> Option<(PlatformStyle, SegmentMark)> {
        match *choice {
            LaneChoice::River { style, mark } => Some((style, mark)),
            _ => None,
        }
    }

    #[test]
    fn test_segments_follow_style_patterns() {
        let choices = run(2024, 4000);
        let mut i = 0;
        let mut seen = 0;
        while i < choices.len() {
            if let Some((_, mark)) = river_style(&choices[i]) {
                let styles: Vec<PlatformStyle> = choices[i..]
                    .iter()
                    .map_while(river_style)
                    .take_while(|(_, m)| m.segment == mark.segment)
                    .map(|(s, _)| s)
                    .collect();
                let len = styles.len();
                if i + len < choices.len() {
                    use PlatformStyle::*;
                    assert!(
                        styles == [Stepping, Drifting] || styles == [Stepping, Drifting, Stepping],
                        "{styles:?}"
                    );
                    seen += 1;
                }
                i += len;
            } else {
                i += 1;
            }
        }
        assert!(seen > 10);
    }

    fn longest_road_run(choices: &[LaneChoice]) -> u32 {
        let mut longest = 0;
        let mut run_len = 0;
        for c in choices {
            if *c == LaneChoice::Road {
                run_len += 1;
                longest = longest.max(run_len);
            } else {
                run_len = 0;
            }
        }
        longest
    }

    #[test]
    fn test_counters_track_choices() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(314);
        let mut policy = LanePolicy::new();
        assert!(!policy.in_river());
        for _ in 0..3000 {
            let was_in_river = policy.in_river();
            let choice = policy.choose(&tuning, &mut rng);
            if was_in_river {
                assert!(matches!(choice, LaneChoice::River { .. }));
            }
            match choice {
                LaneChoice::Road => {
                    assert_eq!(policy.safe_since_hazard(), 0);
                    assert!(policy.consecutive_roads() >= 1);
                }
                LaneChoice::River { .. } => {
                    assert_eq!(policy.safe_since_hazard(), 0);
                    assert_eq!(policy.consecutive_roads(), 0);
                }
                LaneChoice::Safe => {
                    assert_eq!(policy.consecutive_roads(), 0);
                    assert!(!policy.in_river());
                }
            }
            assert!(policy.consecutive_roads() <= tuning.policy.max_consecutive_roads);
        }
    }

    #[test]
    fn test_every_road_is_followed_by_safe_ground() {
        let choices = run(77, 5000);
        assert_eq!(longest_road_run(&choices), 1);
    }

    #[test]
    fn test_road_runs_are_capped_without_safe_gap() {
        let mut tuning = Tuning::default();
        tuning.policy.min_safe_between_hazards = 0;
        tuning.policy.road_probability = 0.75;
        let mut rng = Pcg32::seed_from_u64(78);
        let mut policy = LanePolicy::new();
        let choices: Vec<LaneChoice> =
            (0..5000).map(|_| policy.choose(&tuning, &mut rng)).collect();
        assert_eq!(longest_road_run(&choices), 3);
    }

    #[test]
    fn test_segments_never_interleave() {
        let choices = run(5, 5000);
        let mut current: Option<u32> = None;
        let mut finished = std::collections::HashSet::new();
        for c in &choices {
            match river_style(c) {
                Some((_, mark)) => {
                    assert!(!finished.contains(&mark.segment));
                    if let Some(prev) = current {
                        if prev != mark.segment {
                            finished.insert(prev);
                        }
                    }
                    current = Some(mark.segment);
                }
                None => {
                    if let Some(prev) = current.take() {
                        finished.insert(prev);
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_route_column_drifts_at_most_one(seed in any::<u64>()) {
            let choices = run(seed, 400);
            for pair in choices.windows(2) {
                let styles = (river_style(&pair[0]), river_style(&pair[1]));
                if let (Some((_, a)), Some((_, b))) = styles {
                    if a.segment == b.segment {
                        prop_assert!((a.route_column - b.route_column).abs() <= 1);
                    }
                }
                if let Some((_, m)) = river_style(&pair[0]) {
                    prop_assert!((0..10).contains(&m.route_column));
                }
            }
        }

        #[test]
        fn prop_hazards_are_separated_by_safe_rows(seed in any::<u64>()) {
            // A hazard run (roads or one river) is always followed by a safe row
            // before a hazard of a different run can start
            let choices = run(seed, 400);
            for pair in choices.windows(2) {
                match (pair[0], pair[1]) {
                    (LaneChoice::Road, LaneChoice::River { .. }) => {
                        prop_assert!(false, "road then river")
                    }
                    (LaneChoice::River { .. }, LaneChoice::Road) => {
                        prop_assert!(false, "river then road")
                    }
                    (LaneChoice::River { mark: a, .. }, LaneChoice::River { mark: b, .. }) => {
                        prop_assert_eq!(a.segment, b.segment);
                    }
                    _ => {}
                }
            }
        }
    }
}
