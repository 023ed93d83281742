//! Deterministic simulation module
//!
//! All course generation and hazard logic lives here. This module must be
//! pure and deterministic:
//! - Caller-supplied timestep, clamped per frame
//! - Seeded RNG only, owned by the course
//! - Rows generated strictly in ascending index order
//! - No rendering or platform dependencies

pub mod agent;
pub mod autopilot;
pub mod course;
pub mod grid;
pub mod hazard;
pub mod lane_policy;
pub mod occupant;
pub mod rect;
pub mod row;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use agent::{Agent, DeathCause, Hop, Landing, Motion, MoveIntent, Vitality};
pub use course::Course;
pub use grid::Grid;
pub use hazard::{Resolution, resolve};
pub use lane_policy::{LaneChoice, LanePolicy};
pub use occupant::{Direction, Occupant, OccupantKind};
pub use rect::Rect;
pub use row::{Lane, PlatformStyle, Row, RowKind, SegmentMark, SteppingLayout};
pub use scheduler::{SpawnScheduler, Stream};
pub use snapshot::{AgentView, CourseSnapshot, OccupantView, RowView};
pub use state::{GameEvent, GameState};
pub use tick::{TickInput, tick};
