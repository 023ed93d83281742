//! Game state: the course, the agent, and the per-tick event log

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, DeathCause, MoveIntent};
use super::course::Course;
use super::grid::Grid;
use super::rect::Rect;
use super::row::Row;
use super::snapshot::CourseSnapshot;
use super::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// Things that happened during the last tick, for audio and UI feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Hopped { from: (i32, i32), to: (i32, i32) },
    Landed { column: i32, row: i32 },
    NewBest { row: i32 },
    Died { cause: DeathCause },
    Restarted { seed: u64 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the current run was built from
    pub seed: u64,
    pub course: Course,
    pub agent: Agent,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds since the run started
    pub elapsed: f32,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let grid = Grid::from(tuning.grid);
        let mut course = Course::new(tuning, seed);
        let agent = Agent::new(grid, tuning.agent);
        course.ensure_window(agent.row());
        log::info!("run started with seed {}", seed);
        Self {
            seed,
            course,
            agent,
            time_ticks: 0,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        self.course.tuning()
    }

    /// Fresh run with a seed derived from the current one
    pub fn reset(&mut self) {
        let seed = Pcg32::seed_from_u64(self.seed).random::<u64>();
        self.reset_with_seed(seed);
    }

    pub fn reset_with_seed(&mut self, seed: u64) {
        let tuning = *self.tuning();
        *self = Self::with_tuning(seed, tuning);
        self.events.push(GameEvent::Restarted { seed });
    }

    /// One frame: apply `intent`, then run the simulation for `dt` seconds
    pub fn advance(&mut self, dt: f32, intent: MoveIntent) {
        let input = TickInput {
            intent,
            ..Default::default()
        };
        tick(self, &input, dt);
    }

    /// Drawn agent centre, including the hop arc
    pub fn agent_position(&self) -> Vec2 {
        self.agent.position()
    }

    pub fn agent_hitbox(&self) -> Rect {
        self.agent.hitbox()
    }

    pub fn is_alive(&self) -> bool {
        self.agent.is_alive()
    }

    /// High-water mark of rows reached
    pub fn score(&self) -> u32 {
        self.agent.score()
    }

    pub fn row(&self, index: i32) -> Option<&Row> {
        self.course.row(index)
    }

    /// Live rows in ascending order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.course.rows()
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        CourseSnapshot::capture(self)
    }
}
