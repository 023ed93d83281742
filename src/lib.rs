//! Lane Hopper - an endless lane-hopping obstacle course
//!
//! Core modules:
//! - `sim`: Deterministic simulation (course generation, spawning, hopping, hazards)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio, input polling and UI text are left to the host; they
//! read `sim::CourseSnapshot` and feed `sim::TickInput` back in.

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Target frame rate of the host loop (one tick per rendered frame)
    pub const TARGET_FPS: f32 = 60.0;
    /// Nominal frame delta at the target frame rate
    pub const FRAME_DT: f32 = 1.0 / TARGET_FPS;
    /// Largest delta a single tick will accept (hitches are clamped, not replayed)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Tolerance when deciding a hop has finished (absorbs f32 accumulation)
    pub const HOP_EPSILON: f32 = 1e-4;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep on [0, 1]; input is clamped
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Vertical hop offset at `progress` (0 at both ends, `height` at the apex)
#[inline]
pub fn hop_arc(progress: f32, height: f32) -> f32 {
    (progress.clamp(0.0, 1.0) * std::f32::consts::PI).sin() * height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
        // Clamped outside the unit interval
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }

    #[test]
    fn test_hop_arc_peaks_mid_hop() {
        assert!(hop_arc(0.0, 10.0).abs() < 1e-5);
        assert!((hop_arc(0.5, 10.0) - 10.0).abs() < 1e-4);
        assert!(hop_arc(1.0, 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
    }
}
