//! The course: a sliding window of rows around the agent
//!
//! Rows are kept in a contiguous ring indexed by row number. The window
//! must always cover `[agent_row - margin, agent_row + margin]`; rows past
//! a wider slack are pruned, so the agent hovering near a boundary never
//! makes rows flicker in and out of existence.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::grid::Grid;
use super::lane_policy::{LaneChoice, LanePolicy};
use super::row::Row;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct Course {
    tuning: Tuning,
    grid: Grid,
    rng: Pcg32,
    policy: LanePolicy,
    /// Contiguous rows, front is the lowest index
    rows: VecDeque<Row>,
    /// Rows pruned above the window, lowest index on top
    shelf: Vec<Row>,
    /// Highest index the lane policy has emitted
    generated_through: i32,
}

impl Course {
    /// Fresh course: the initial window with the starting rows forced Safe
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut course = Self {
            tuning,
            grid: Grid::from(tuning.grid),
            rng: Pcg32::seed_from_u64(seed),
            policy: LanePolicy::new(),
            rows: VecDeque::new(),
            shelf: Vec::new(),
            generated_through: i32::MIN,
        };

        let window = tuning.window;
        for index in window.initial_low_row..=window.initial_high_row {
            let row = if index <= window.starting_safe_through {
                Row::safe(index)
            } else {
                course.generate_row(index)
            };
            course.rows.push_back(row);
            course.generated_through = index;
        }
        log::debug!(
            "course built with rows {}..={}",
            window.initial_low_row,
            window.initial_high_row
        );
        course
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Lowest live row index
    pub fn min_row(&self) -> Option<i32> {
        self.rows.front().map(|r| r.index)
    }

    /// Highest live row index
    pub fn max_row(&self) -> Option<i32> {
        self.rows.back().map(|r| r.index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: i32) -> Option<&Row> {
        let front = self.min_row()?;
        let offset = usize::try_from(index - front).ok()?;
        self.rows.get(offset)
    }

    /// Rows in ascending index order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Swap in a hand-built row at an index already inside the window
    pub fn replace_row(&mut self, row: Row) -> Option<Row> {
        let front = self.min_row()?;
        let offset = usize::try_from(row.index - front).ok()?;
        let slot = self.rows.get_mut(offset)?;
        Some(std::mem::replace(slot, row))
    }

    /// Grow and prune so the window is correct for `agent_row`
    pub fn ensure_window(&mut self, agent_row: i32) {
        self.maintain(agent_row);

        let covered = self.covers(agent_row);
        debug_assert!(covered, "row window does not cover agent row {agent_row}");
        if !covered {
            log::warn!("row window missed agent row {}, running an extra pass", agent_row);
            self.maintain(agent_row);
        }
    }

    /// Whether every row within the margin of `agent_row` exists
    pub fn covers(&self, agent_row: i32) -> bool {
        let margin = self.tuning.window.margin_rows;
        match (self.min_row(), self.max_row()) {
            (Some(lo), Some(hi)) => lo <= agent_row - margin && hi >= agent_row + margin,
            _ => false,
        }
    }

    fn maintain(&mut self, agent_row: i32) {
        let window = self.tuning.window;
        let target_min = agent_row - window.margin_rows;
        let target_max = agent_row + window.margin_rows;

        // An agent far outside the ring (restored or teleported) restarts it in place
        if self.rows.is_empty()
            || self.max_row().is_some_and(|hi| hi < target_min - window.prune_below_slack)
            || self.min_row().is_some_and(|lo| lo > target_max + window.prune_above_slack)
        {
            self.rebuild_at(agent_row);
        }

        while let Some(hi) = self.max_row().filter(|&hi| hi < target_max) {
            let row = self.row_above(hi + 1);
            self.rows.push_back(row);
        }

        // Low end is retreat territory and only ever gets safe ground
        while let Some(lo) = self.min_row().filter(|&lo| lo > target_min) {
            self.rows.push_front(Row::safe(lo - 1));
        }

        let prune_below = agent_row - (window.margin_rows + window.prune_below_slack);
        let prune_above = agent_row + (window.margin_rows + window.prune_above_slack);
        let mut pruned = 0;
        while self.rows.front().is_some_and(|r| r.index < prune_below) {
            self.rows.pop_front();
            pruned += 1;
        }
        // Rows ahead of the agent are shelved, not dropped; they come back unchanged
        while self.rows.back().is_some_and(|r| r.index > prune_above) {
            if let Some(row) = self.rows.pop_back() {
                self.shelf.push(row);
                pruned += 1;
            }
        }
        if pruned > 0 {
            log::debug!("pruned {} rows around agent row {}", pruned, agent_row);
        }
    }

    fn rebuild_at(&mut self, agent_row: i32) {
        while let Some(row) = self.rows.pop_back() {
            self.shelf.push(row);
        }
        while self.shelf.last().is_some_and(|r| r.index < agent_row) {
            self.shelf.pop();
        }
        let start = match self.shelf.last() {
            Some(r) if r.index == agent_row => self.shelf.pop(),
            _ => None,
        };
        self.rows.push_back(start.unwrap_or_else(|| Row::safe(agent_row)));
        self.generated_through = self.generated_through.max(agent_row);
    }

    /// Next row for the high end: shelved if it exists, fresh from the policy
    /// if the index was never emitted, otherwise safe ground
    fn row_above(&mut self, index: i32) -> Row {
        if self.shelf.last().is_some_and(|r| r.index == index) {
            if let Some(row) = self.shelf.pop() {
                return row;
            }
        }
        if index > self.generated_through {
            self.generated_through = index;
            return self.generate_row(index);
        }
        Row::safe(index)
    }

    fn generate_row(&mut self, index: i32) -> Row {
        let row = match self.policy.choose(&self.tuning, &mut self.rng) {
            LaneChoice::Safe => Row::safe(index),
            LaneChoice::Road => Row::road(index, &self.tuning, &mut self.rng),
            LaneChoice::River { style, mark } => {
                Row::river(index, style, mark, &self.tuning, &mut self.rng)
            }
        };
        log::debug!("generated row {} as {:?}", index, row.kind());
        row
    }

    /// Advance every row's occupants and spawn schedulers
    pub fn advance(&mut self, dt: f32) {
        for row in &mut self.rows {
            row.advance(dt, &self.tuning, &mut self.rng);
        }
    }
}
