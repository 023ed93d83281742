//! Per-row spawn scheduler shared by road vehicles and drifting logs
//!
//! The scheduler turns a row speed into a stream of occupants whose
//! spacing is fair: intervals come from a distance gap divided by speed,
//! jittered, and floored so fast rows never spawn back to back. A spawn
//! that would crowd the newest occupant at the entry edge is deferred by
//! parking the timer just under the interval, so it retries next tick
//! instead of waiting a whole new interval.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::occupant::{Direction, Occupant, OccupantKind};
use crate::tuning::{SpawnTuning, Tuning};

/// What a scheduler emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stream {
    Vehicles,
    Logs,
}

/// Interval that lets `gap_px` of space pass at `speed`; speed is floored at 1
#[inline]
pub fn base_interval(gap_px: f32, speed: f32) -> f32 {
    gap_px / speed.abs().max(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub stream: Stream,
    pub direction: Direction,
    /// Speed magnitude in world units per second
    pub speed: f32,
    /// Time accumulated toward the next spawn
    pub timer: f32,
    pub next_interval: f32,
    /// Row-local clock, stamped on every occupant at spawn
    pub clock: f32,
    /// Live occupants in spawn order
    pub occupants: Vec<Occupant>,
}

impl SpawnScheduler {
    /// Road lane: vehicles always travel rightward
    pub fn road<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> Self {
        let speed = tuning.road.speed.sample(rng);
        let next_interval = tuning.road.spawn.first_spawn.sample(rng);
        Self::with_state(Stream::Vehicles, Direction::Right, speed, next_interval)
    }

    /// Drifting river lane: direction is drawn once for the row's lifetime
    pub fn drifting<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> Self {
        let direction = if rng.random_bool(0.5) {
            Direction::Right
        } else {
            Direction::Left
        };
        let speed = tuning.river.log_speed.sample(rng);
        let next_interval = tuning.river.spawn.first_spawn.sample(rng);
        let mut scheduler = Self::with_state(Stream::Logs, direction, speed, next_interval);

        // Queue a log off-view so the river is not empty when it scrolls in
        if rng.random::<f32>() < tuning.river.preseed_chance {
            scheduler.spawn(tuning, rng);
            if rng.random::<f32>() < tuning.river.retime_chance {
                scheduler.next_interval = scheduler.draw_interval(tuning, rng);
            }
        }
        scheduler
    }

    /// Scheduler with explicit speed and timing and no occupants
    pub fn with_state(
        stream: Stream,
        direction: Direction,
        speed: f32,
        next_interval: f32,
    ) -> Self {
        Self {
            stream,
            direction,
            speed: speed.abs(),
            timer: 0.0,
            next_interval,
            clock: 0.0,
            occupants: Vec::new(),
        }
    }

    /// Signed velocity given to every occupant of this row
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.speed * self.direction.sign()
    }

    fn profile<'a>(&self, tuning: &'a Tuning) -> &'a SpawnTuning {
        match self.stream {
            Stream::Vehicles => &tuning.road.spawn,
            Stream::Logs => &tuning.river.spawn,
        }
    }

    /// Lower bound on `next_interval` for this row
    pub fn interval_floor(&self, tuning: &Tuning) -> f32 {
        self.profile(tuning).min_interval
    }

    /// Draw the wait before the next spawn: gap / speed, jittered, floored
    pub fn draw_interval<R: Rng + ?Sized>(&self, tuning: &Tuning, rng: &mut R) -> f32 {
        let profile = self.profile(tuning);
        let gap_px = profile.gap_tiles.sample(rng) * tuning.grid.tile;
        let jitter = if profile.jitter > 0.0 {
            rng.random_range(-profile.jitter..=profile.jitter)
        } else {
            0.0
        };
        (base_interval(gap_px, self.speed) + jitter).max(profile.min_interval)
    }

    /// Move occupants, drop departed ones, then run the spawn timer
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, tuning: &Tuning, rng: &mut R) {
        let view_width = tuning.grid.columns as f32 * tuning.grid.tile;
        let margin = tuning.despawn_margin_tiles * tuning.grid.tile;

        for occupant in &mut self.occupants {
            occupant.advance(dt);
        }
        self.occupants.retain(|o| !o.is_gone(view_width, margin));

        self.clock += dt;
        self.timer += dt;
        if self.timer < self.next_interval {
            return;
        }

        if self.entry_is_crowded(tuning, rng) {
            let backoff = self.profile(tuning).defer_backoff;
            self.timer = self.timer.min(self.next_interval - backoff);
            log::trace!("spawn deferred, timer parked at {:.3}", self.timer);
            return;
        }

        self.spawn(tuning, rng);
        self.timer = 0.0;
        self.next_interval = self.draw_interval(tuning, rng);
    }

    /// Whether the occupant nearest the entry edge is inside a freshly drawn clearance
    fn entry_is_crowded<R: Rng + ?Sized>(&self, tuning: &Tuning, rng: &mut R) -> bool {
        if self.occupants.is_empty() {
            return false;
        }
        let clearance = self.profile(tuning).clearance_tiles.sample(rng) * tuning.grid.tile;
        match self.direction {
            Direction::Right => {
                let leftmost = self.occupants.iter().map(|o| o.x).fold(f32::INFINITY, f32::min);
                leftmost < clearance
            }
            Direction::Left => {
                let view_width = tuning.grid.columns as f32 * tuning.grid.tile;
                let rightmost = self
                    .occupants
                    .iter()
                    .map(Occupant::right)
                    .fold(f32::NEG_INFINITY, f32::max);
                rightmost > view_width - clearance
            }
        }
    }

    /// Emit one occupant off-view beyond the entry edge
    fn spawn<R: Rng + ?Sized>(&mut self, tuning: &Tuning, rng: &mut R) {
        let tile = tuning.grid.tile;
        let (kind, width, height) = match self.stream {
            Stream::Vehicles => {
                let road = &tuning.road;
                let (kind, widths) = if rng.random::<f32>() < road.truck_chance {
                    (OccupantKind::Truck, road.truck_width_tiles)
                } else {
                    (OccupantKind::Car, road.car_width_tiles)
                };
                (kind, widths.sample(rng) * tile, road.height_tiles * tile)
            }
            Stream::Logs => {
                let river = &tuning.river;
                let width = river.log_width_tiles.sample(rng) * tile;
                (OccupantKind::Log, width, river.log_height_tiles * tile)
            }
        };
        let buffer = self.profile(tuning).buffer_tiles.sample(rng) * tile;
        let x = match self.direction {
            Direction::Right => -width - buffer,
            Direction::Left => tuning.grid.columns as f32 * tile + buffer,
        };
        self.occupants.push(Occupant {
            kind,
            x,
            width,
            height,
            velocity: self.velocity(),
            spawned_at: self.clock,
        });
    }
}
