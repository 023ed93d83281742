//! Game balance and generation tuning
//!
//! Every constant the generator, spawners and agent read lives here so a
//! host can ship alternative balance as JSON. `Tuning::default()` is the
//! canonical game.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed numeric range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample; degenerate spans return `min`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    /// Side of one grid cell in world units
    pub tile: f32,
    /// Number of playable columns
    pub columns: i32,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            tile: 48.0,
            columns: 10,
        }
    }
}

/// Sliding row window around the agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowTuning {
    /// Rows that must exist on each side of the agent
    pub margin_rows: i32,
    /// Extra rows tolerated below the window before pruning
    pub prune_below_slack: i32,
    /// Extra rows tolerated above the window before pruning
    pub prune_above_slack: i32,
    /// Lowest row of a fresh course
    pub initial_low_row: i32,
    /// Highest row of a fresh course
    pub initial_high_row: i32,
    /// Rows at or below this index are always Safe in a fresh course
    pub starting_safe_through: i32,
}

impl Default for WindowTuning {
    fn default() -> Self {
        Self {
            margin_rows: 18,
            prune_below_slack: 6,
            prune_above_slack: 10,
            initial_low_row: -6,
            initial_high_row: 18,
            starting_safe_through: 1,
        }
    }
}

/// Hazard selection policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTuning {
    /// Probability band for a road row (after the river band)
    pub road_probability: f32,
    /// Probability band for starting a river segment
    pub river_start_probability: f32,
    /// Safe rows required after any hazard
    pub min_safe_between_hazards: u32,
    /// Roads allowed back to back before a forced Safe row
    pub max_consecutive_roads: u32,
    /// Route column drift drawn uniformly per river row (each in -1..=1)
    pub route_drift: [i32; 4],
}

impl Default for PolicyTuning {
    fn default() -> Self {
        Self {
            road_probability: 0.45,
            river_start_probability: 0.25,
            min_safe_between_hazards: 1,
            max_consecutive_roads: 3,
            route_drift: [-1, 0, 0, 1],
        }
    }
}

/// Spawn timing shared by vehicles and drifting logs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    /// Distance between consecutive occupants, in tiles
    pub gap_tiles: Span,
    /// Symmetric timing jitter in seconds
    pub jitter: f32,
    /// Absolute floor on the spawn interval in seconds
    pub min_interval: f32,
    /// Delay before the first spawn of a new row
    pub first_spawn: Span,
    /// Clearance the newest occupant must have from the spawn edge, in tiles
    pub clearance_tiles: Span,
    /// Off-view distance new occupants start at, in tiles
    pub buffer_tiles: Span,
    /// How far under the interval a deferred spawn parks its timer
    pub defer_backoff: f32,
}

/// Road rows and their vehicles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadTuning {
    pub speed: Span,
    pub car_width_tiles: Span,
    pub truck_chance: f32,
    pub truck_width_tiles: Span,
    pub height_tiles: f32,
    pub spawn: SpawnTuning,
}

impl Default for RoadTuning {
    fn default() -> Self {
        Self {
            speed: Span::new(120.0, 320.0),
            car_width_tiles: Span::new(1.0, 2.45),
            truck_chance: 0.28,
            truck_width_tiles: Span::new(1.8, 2.6),
            height_tiles: 0.8,
            spawn: SpawnTuning {
                gap_tiles: Span::new(2.6, 4.8),
                jitter: 0.20,
                min_interval: 0.28,
                first_spawn: Span::new(0.35, 0.85),
                clearance_tiles: Span::new(1.4, 2.8),
                buffer_tiles: Span::new(0.8, 2.4),
                defer_backoff: 0.15,
            },
        }
    }
}

/// River rows: drifting logs and stepping pads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverTuning {
    pub log_speed: Span,
    pub log_width_tiles: Span,
    pub log_height_tiles: f32,
    pub spawn: SpawnTuning,
    /// Chance a new drifting row starts with one log already queued off-view
    pub preseed_chance: f32,
    /// Chance the pre-seeded row redraws its next interval from the gap model
    pub retime_chance: f32,
    /// Visual pad radius, in tiles
    pub pad_radius_tiles: f32,
    /// Capture radius as a fraction of the visual radius
    pub pad_capture_factor: f32,
    pub extra_pads_min: u32,
    pub extra_pads_max: u32,
    /// Minimum column distance between any two pads on a row
    pub pad_min_separation: i32,
}

impl Default for RiverTuning {
    fn default() -> Self {
        Self {
            log_speed: Span::new(60.0, 170.0),
            log_width_tiles: Span::new(1.8, 3.3),
            log_height_tiles: 0.7,
            spawn: SpawnTuning {
                gap_tiles: Span::new(1.7, 3.3),
                jitter: 0.12,
                min_interval: 0.35,
                first_spawn: Span::new(0.35, 0.85),
                clearance_tiles: Span::new(1.0, 2.4),
                buffer_tiles: Span::new(0.6, 2.0),
                defer_backoff: 0.12,
            },
            preseed_chance: 0.85,
            retime_chance: 0.45,
            pad_radius_tiles: 0.34,
            pad_capture_factor: 0.92,
            extra_pads_min: 1,
            extra_pads_max: 3,
            pad_min_separation: 2,
        }
    }
}

/// The hopping agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    /// Seconds per hop
    pub hop_duration: f32,
    /// Side of the square hitbox in world units
    pub hitbox_size: f32,
    /// Cosmetic hop apex, in tiles
    pub arc_height_tiles: f32,
    /// Lowest row the agent may retreat to
    pub retreat_limit_row: i32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            hop_duration: 0.12,
            hitbox_size: 34.0,
            arc_height_tiles: 0.18,
            retreat_limit_row: -3,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid: GridTuning,
    pub window: WindowTuning,
    pub policy: PolicyTuning,
    pub road: RoadTuning,
    pub river: RiverTuning,
    pub agent: AgentTuning,
    /// Occupants are dropped this many tiles past the far edge
    pub despawn_margin_tiles: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid: GridTuning::default(),
            window: WindowTuning::default(),
            policy: PolicyTuning::default(),
            road: RoadTuning::default(),
            river: RiverTuning::default(),
            agent: AgentTuning::default(),
            despawn_margin_tiles: 3.0,
        }
    }
}

/// Why a tuning sheet was rejected
#[derive(Debug)]
pub enum TuningError {
    /// The JSON did not parse
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning JSON is malformed: {err}"),
            Self::Invalid { field, reason } => write!(f, "{field} {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> TuningError {
    TuningError::Invalid { field, reason }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn probability(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl Tuning {
    /// Parse and validate a JSON tuning sheet; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        self.validate_grid()?;
        self.validate_window()?;
        self.validate_policy()?;
        validate_spawn("road.spawn", &self.road.spawn)?;
        validate_spawn("river.spawn", &self.river.spawn)?;
        self.validate_road()?;
        self.validate_river()?;
        self.validate_agent()?;
        if !(self.despawn_margin_tiles.is_finite() && self.despawn_margin_tiles >= 0.0) {
            return Err(invalid("despawn_margin_tiles", "must be finite and non-negative"));
        }
        Ok(())
    }

    fn validate_grid(&self) -> Result<(), TuningError> {
        if !positive(self.grid.tile) {
            return Err(invalid("grid.tile", "must be positive and finite"));
        }
        if self.grid.columns <= 0 {
            return Err(invalid("grid.columns", "must be greater than 0"));
        }
        Ok(())
    }

    fn validate_window(&self) -> Result<(), TuningError> {
        let w = &self.window;
        if w.margin_rows <= 0 {
            return Err(invalid("window.margin_rows", "must be greater than 0"));
        }
        if w.prune_below_slack < 0 || w.prune_above_slack < 0 {
            return Err(invalid("window.prune_*_slack", "must be non-negative"));
        }
        if w.initial_low_row > w.initial_high_row {
            return Err(invalid("window.initial_low_row", "must not exceed initial_high_row"));
        }
        Ok(())
    }

    fn validate_policy(&self) -> Result<(), TuningError> {
        let p = &self.policy;
        if !probability(p.road_probability) {
            return Err(invalid("policy.road_probability", "must be within [0,1]"));
        }
        if !probability(p.river_start_probability) {
            return Err(invalid("policy.river_start_probability", "must be within [0,1]"));
        }
        if p.road_probability + p.river_start_probability > 1.0 {
            return Err(invalid(
                "policy.road_probability + river_start_probability",
                "must be <= 1.0",
            ));
        }
        if p.route_drift.iter().any(|d| !(-1..=1).contains(d)) {
            return Err(invalid("policy.route_drift", "entries must be -1, 0 or 1"));
        }
        Ok(())
    }

    fn validate_road(&self) -> Result<(), TuningError> {
        let r = &self.road;
        if !(r.speed.is_ordered() && r.speed.min > 0.0) {
            return Err(invalid("road.speed", "must be an ordered positive range"));
        }
        if !(r.car_width_tiles.is_ordered() && r.car_width_tiles.min > 0.0) {
            return Err(invalid("road.car_width_tiles", "must be an ordered positive range"));
        }
        if !(r.truck_width_tiles.is_ordered() && r.truck_width_tiles.min > 0.0) {
            return Err(invalid("road.truck_width_tiles", "must be an ordered positive range"));
        }
        if !probability(r.truck_chance) {
            return Err(invalid("road.truck_chance", "must be within [0,1]"));
        }
        if !positive(r.height_tiles) {
            return Err(invalid("road.height_tiles", "must be positive and finite"));
        }
        Ok(())
    }

    fn validate_river(&self) -> Result<(), TuningError> {
        let r = &self.river;
        if !(r.log_speed.is_ordered() && r.log_speed.min > 0.0) {
            return Err(invalid("river.log_speed", "must be an ordered positive range"));
        }
        if !(r.log_width_tiles.is_ordered() && r.log_width_tiles.min > 0.0) {
            return Err(invalid("river.log_width_tiles", "must be an ordered positive range"));
        }
        if !positive(r.log_height_tiles) {
            return Err(invalid("river.log_height_tiles", "must be positive and finite"));
        }
        if !probability(r.preseed_chance) || !probability(r.retime_chance) {
            return Err(invalid("river.preseed_chance/retime_chance", "must be within [0,1]"));
        }
        if !positive(r.pad_radius_tiles) {
            return Err(invalid("river.pad_radius_tiles", "must be positive and finite"));
        }
        let capture = r.pad_capture_factor;
        if !(capture.is_finite() && capture > 0.0 && capture <= 1.0) {
            return Err(invalid("river.pad_capture_factor", "must be within (0,1]"));
        }
        if r.extra_pads_min > r.extra_pads_max {
            return Err(invalid("river.extra_pads_min", "must not exceed extra_pads_max"));
        }
        if r.pad_min_separation < 2 {
            return Err(invalid("river.pad_min_separation", "must be at least 2"));
        }
        Ok(())
    }

    fn validate_agent(&self) -> Result<(), TuningError> {
        let a = &self.agent;
        if !positive(a.hop_duration) {
            return Err(invalid("agent.hop_duration", "must be positive and finite"));
        }
        if !positive(a.hitbox_size) {
            return Err(invalid("agent.hitbox_size", "must be positive and finite"));
        }
        if !(a.arc_height_tiles.is_finite() && a.arc_height_tiles >= 0.0) {
            return Err(invalid("agent.arc_height_tiles", "must be finite and non-negative"));
        }
        if a.retreat_limit_row > 0 {
            return Err(invalid("agent.retreat_limit_row", "must be zero or negative"));
        }
        if a.retreat_limit_row < -self.window.margin_rows {
            return Err(invalid("agent.retreat_limit_row", "must stay inside the row window"));
        }
        Ok(())
    }
}

fn validate_spawn(field: &'static str, s: &SpawnTuning) -> Result<(), TuningError> {
    if !(s.gap_tiles.is_ordered() && s.gap_tiles.min > 0.0) {
        return Err(invalid(field, "gap_tiles must be an ordered positive range"));
    }
    if !(s.jitter.is_finite() && s.jitter >= 0.0) {
        return Err(invalid(field, "jitter must be finite and non-negative"));
    }
    if !positive(s.min_interval) {
        return Err(invalid(field, "min_interval must be positive and finite"));
    }
    if !(s.first_spawn.is_ordered() && s.first_spawn.min >= s.min_interval) {
        return Err(invalid(field, "first_spawn must be ordered and not below min_interval"));
    }
    if !(s.clearance_tiles.is_ordered() && s.clearance_tiles.min >= 0.0) {
        return Err(invalid(field, "clearance_tiles must be an ordered non-negative range"));
    }
    if !(s.buffer_tiles.is_ordered() && s.buffer_tiles.min >= 0.0) {
        return Err(invalid(field, "buffer_tiles must be an ordered non-negative range"));
    }
    if !(s.defer_backoff.is_finite() && s.defer_backoff > 0.0 && s.defer_backoff < s.min_interval) {
        return Err(invalid(field, "defer_backoff must be positive and below min_interval"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_defaults() {
        let json = Tuning::default().to_json().unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed, Tuning::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed = Tuning::from_json(r#"{ "agent": { "hop_duration": 0.2 } }"#).unwrap();
        assert_eq!(parsed.agent.hop_duration, 0.2);
        assert_eq!(parsed.agent.hitbox_size, 34.0);
        assert_eq!(parsed.grid.columns, 10);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_probability_budget_rejected() {
        let mut tuning = Tuning::default();
        tuning.policy.road_probability = 0.8;
        tuning.policy.river_start_probability = 0.3;
        let err = tuning.validate().unwrap_err();
        assert!(matches!(err, TuningError::Invalid { .. }));
        assert!(err.to_string().contains("<= 1.0"));
    }

    #[test]
    fn test_first_spawn_below_floor_rejected() {
        let mut tuning = Tuning::default();
        tuning.road.spawn.first_spawn = Span::new(0.1, 0.5);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_adjacent_pads_rejected() {
        let err = Tuning::from_json(r#"{ "river": { "pad_min_separation": 1 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "river.pad_min_separation",
                ..
            }
        ));
        let ok = Tuning::from_json(r#"{ "river": { "pad_min_separation": 3 } }"#).unwrap();
        assert_eq!(ok.river.pad_min_separation, 3);
    }

    #[test]
    fn test_span_sample_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let span = Span::new(2.6, 4.8);
        for _ in 0..500 {
            assert!(span.contains(span.sample(&mut rng)));
        }
        let flat = Span::new(1.5, 1.5);
        assert_eq!(flat.sample(&mut rng), 1.5);
    }
}
