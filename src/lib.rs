//! Reveal Field - the interactive layer of a storefront "About" section
//!
//! Core modules:
//! - `sim`: Deterministic simulation (springs, collisions, particles, highlights)
//! - `settings`: Tunable constants and presets
//! - `web`: Browser binding (wasm32 only)

pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{QualityPreset, Settings, SettingsError};

use glam::Vec2;

/// Field configuration constants
pub mod consts {
    /// Fixed simulation timestep (one animation frame at 60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Floating reveal panel dimensions
    pub const OBSTACLE_WIDTH: f32 = 350.0;
    pub const OBSTACLE_HEIGHT: f32 = 250.0;

    /// Number of dust particles in the field
    pub const PARTICLE_COUNT: usize = 40;
    /// Particle diameter range (min inclusive, max exclusive)
    pub const PARTICLE_MIN_SIZE: f32 = 3.0;
    pub const PARTICLE_MAX_SIZE: f32 = 6.0;

    /// Pointer repulsion: radius of influence and force at the centre
    pub const REPULSION_RADIUS: f32 = 120.0;
    pub const MAX_REPULSION: f32 = 20.0;

    /// Particles never drift further than this from their base position (per axis)
    pub const MAX_OFFSET: f32 = 60.0;
    /// Extra push so a bounced particle lands just outside the edge
    pub const BOUNCE_STRENGTH: f32 = 1.05;
    /// Inset applied to bounce targets to avoid boundary flicker
    pub const BOUNCE_MARGIN: f32 = 2.0;
    /// The panel must reach this far into a word before it lights up
    pub const HIGHLIGHT_MARGIN: f32 = 5.0;

    /// Cosmetic float loop: period range (seconds) and amplitude
    pub const FLOAT_MIN_PERIOD: f32 = 20.0;
    pub const FLOAT_MAX_PERIOD: f32 = 35.0;
    pub const FLOAT_AMPLITUDE: f32 = 15.0;

    /// Number of decorative light beams behind the particles
    pub const BEAM_COUNT: usize = 3;
}

/// Clamp each component of `v` to `[-limit, limit]`
#[inline]
pub fn clamp_symmetric(v: Vec2, limit: f32) -> Vec2 {
    v.clamp(Vec2::splat(-limit), Vec2::splat(limit))
}

/// Convert a percentage anchor (0-100 on each axis) to container-local units
#[inline]
pub fn percent_to_local(percent: Vec2, container: Vec2) -> Vec2 {
    percent / 100.0 * container
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_symmetric() {
        let v = clamp_symmetric(Vec2::new(80.0, -75.0), 60.0);
        assert_eq!(v, Vec2::new(60.0, -60.0));

        let v = clamp_symmetric(Vec2::new(12.0, -3.0), 60.0);
        assert_eq!(v, Vec2::new(12.0, -3.0));
    }

    #[test]
    fn test_percent_to_local() {
        let p = percent_to_local(Vec2::new(50.0, 25.0), Vec2::new(800.0, 400.0));
        assert!((p.x - 400.0).abs() < 1e-4);
        assert!((p.y - 100.0).abs() < 1e-4);
    }
}
