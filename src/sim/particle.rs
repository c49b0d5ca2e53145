//! Reactive dust particles
//!
//! Each particle sits at a random anchor inside the container and carries a
//! physics offset. Every frame the offset is pushed away from the reveal
//! panel's centre, bounced out of the panel and out of every registered text
//! fragment, then clamped. Which of those applies is decided from scratch
//! each frame; nothing about the previous frame's contact is remembered.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::bounce_correction;
use super::keyframes::{Easing, Keyframes};
use super::rect::Rect;
use super::spring::{Spring2, SpringConfig};
use crate::settings::Settings;
use crate::{clamp_symmetric, percent_to_local};

/// Tunables for the per-frame offset update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    pub repulsion_radius: f32,
    pub max_repulsion: f32,
    pub max_offset: f32,
    pub bounce_strength: f32,
    pub bounce_margin: f32,
}

impl From<&Settings> for FieldParams {
    fn from(settings: &Settings) -> Self {
        Self {
            repulsion_radius: settings.repulsion_radius,
            max_repulsion: settings.max_repulsion,
            max_offset: settings.max_offset,
            bounce_strength: settings.bounce_strength,
            bounce_margin: settings.bounce_margin,
        }
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Push applied to a particle at `position` by a repeller at `source`
///
/// Linear falloff: `max_force` at the source, zero at `radius` and beyond. A
/// particle exactly on the source has no defined direction and gets no push.
pub fn repulsion(position: Vec2, source: Vec2, radius: f32, max_force: f32) -> Vec2 {
    let toward_source = source - position;
    let dist = toward_source.length();
    if dist <= 0.0 || dist >= radius {
        return Vec2::ZERO;
    }

    let strength = (radius - dist) / radius;
    -(toward_source / dist) * max_force * strength
}

/// Cosmetic vertical drift and opacity pulse (never touches physics)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatPhase {
    /// Seconds per up-and-back loop
    period: f32,
    /// Peak vertical drift (sign gives direction)
    amplitude: f32,
}

/// One sample of the float overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatSample {
    pub dy: f32,
    pub opacity: f32,
}

impl FloatPhase {
    pub fn new(period: f32, amplitude: f32) -> Self {
        Self { period, amplitude }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn sample(&self, time: f32) -> FloatSample {
        let drift = Keyframes::new([0.0, self.amplitude, 0.0], self.period)
            .with_easing(Easing::EaseInOut);
        let opacity = Keyframes::new([0.2, 0.5, 0.2], self.period).with_easing(Easing::EaseInOut);
        FloatSample {
            dy: drift.sample(time),
            opacity: opacity.sample(time),
        }
    }

    /// Frozen at the start pose (reduced motion)
    pub fn at_rest(&self) -> FloatSample {
        self.sample(0.0)
    }
}

/// A single dust particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    id: u32,
    /// Anchor in percent of the container (0-100 on each axis)
    base: Vec2,
    size: f32,
    /// Physics offset from the anchor (container units)
    offset: Vec2,
    /// Smoothed offset used for drawing
    display: Spring2,
    float: FloatPhase,
}

impl Particle {
    pub fn new(id: u32, base: Vec2, size: f32, float: FloatPhase, spring: SpringConfig) -> Self {
        Self {
            id,
            base,
            size,
            offset: Vec2::ZERO,
            display: Spring2::new(spring, Vec2::ZERO),
            float,
        }
    }

    /// Randomised particle drawn from the ranges in `settings`
    pub fn random<R: Rng>(id: u32, rng: &mut R, settings: &Settings) -> Self {
        let base = Vec2::new(
            sample_range(rng, 0.0, 100.0),
            sample_range(rng, 0.0, 100.0),
        );
        let size = sample_range(rng, settings.particle_min_size, settings.particle_max_size);
        let period = sample_range(rng, settings.float_min_period, settings.float_max_period);
        let amplitude = sample_range(rng, -settings.float_amplitude, settings.float_amplitude);

        Self::new(
            id,
            base,
            size,
            FloatPhase::new(period, amplitude),
            settings.particle_spring,
        )
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn base_percent(&self) -> Vec2 {
        self.base
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn display_offset(&self) -> Vec2 {
        self.display.value()
    }

    /// Drawn offset has caught up with the physics offset
    pub fn display_settled(&self) -> bool {
        self.display.is_settled() && self.display.target() == self.offset
    }

    #[cfg(test)]
    pub(crate) fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn float_phase(&self) -> &FloatPhase {
        &self.float
    }

    /// Anchor in container units
    pub fn base_position(&self, container: Vec2) -> Vec2 {
        percent_to_local(self.base, container)
    }

    /// Anchor plus physics offset, in container units
    pub fn position(&self, container: Vec2) -> Vec2 {
        self.base_position(container) + self.offset
    }

    /// Recompute the physics offset for one frame
    ///
    /// Repulsion first, then a bounce against the panel, then one bounce per
    /// fragment. Every bounce is tested against the box the particle occupied
    /// at the start of the frame, and all contributions land in the same
    /// offset before the clamp.
    pub fn step_physics(
        &mut self,
        container: Vec2,
        obstacle: &Rect,
        fragments: &[Rect],
        params: &FieldParams,
    ) {
        let current = self.position(container);
        let mut offset = self.offset;

        offset += repulsion(
            current,
            obstacle.center(),
            params.repulsion_radius,
            params.max_repulsion,
        );

        let body = Rect::centered(current, self.size);
        for target in std::iter::once(obstacle).chain(fragments) {
            if let Some(push) =
                bounce_correction(&body, target, params.bounce_margin, params.bounce_strength)
            {
                offset += push;
            }
        }

        self.offset = clamp_symmetric(offset, params.max_offset);
    }

    /// Ease the drawn offset toward the physics offset
    pub fn step_display(&mut self, dt: f32) {
        self.display.set_target(self.offset);
        self.display.step(dt);
    }

    /// Host-facing view of this particle at `time`
    pub fn view(&self, time: f32, animate_float: bool) -> ParticleView {
        let float = if animate_float {
            self.float.sample(time)
        } else {
            self.float.at_rest()
        };
        ParticleView {
            id: self.id,
            position_percent: self.base,
            offset: self.offset,
            display_offset: self.display.value(),
            size: self.size,
            float_dy: float.dy,
            opacity: float.opacity,
        }
    }
}

/// What the host needs to place one particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub id: u32,
    pub position_percent: Vec2,
    pub offset: Vec2,
    pub display_offset: Vec2,
    pub size: f32,
    pub float_dy: f32,
    pub opacity: f32,
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
fn sample_range<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn particle_at(base_percent: Vec2, size: f32) -> Particle {
        Particle::new(
            1,
            base_percent,
            size,
            FloatPhase::new(20.0, 10.0),
            SpringConfig::particle(),
        )
    }

    // 1000x1000 container so percent maps to units x10
    const CONTAINER: Vec2 = Vec2::new(1000.0, 1000.0);

    #[test]
    fn test_repulsion_falloff() {
        let source = Vec2::new(100.0, 100.0);

        // On the boundary: nothing
        let push = repulsion(Vec2::new(220.0, 100.0), source, 120.0, 20.0);
        assert_eq!(push, Vec2::ZERO);

        // Just inside: tiny push away from the source
        let push = repulsion(Vec2::new(219.0, 100.0), source, 120.0, 20.0);
        assert!(push.x > 0.0 && push.x < 0.5);
        assert_eq!(push.y, 0.0);

        // Halfway: half force
        let push = repulsion(Vec2::new(100.0, 40.0), source, 120.0, 20.0);
        assert!((push.y + 10.0).abs() < 1e-4);

        // Nearly on top: close to full force
        let push = repulsion(Vec2::new(100.001, 100.0), source, 120.0, 20.0);
        assert!((push.length() - 20.0).abs() < 0.01);

        // Exactly on top: no direction, no force
        let push = repulsion(source, source, 120.0, 20.0);
        assert_eq!(push, Vec2::ZERO);
        assert!(push.is_finite());
    }

    #[test]
    fn test_idle_particle_keeps_offset() {
        let mut p = particle_at(Vec2::new(10.0, 10.0), 4.0);
        p.offset = Vec2::new(12.0, -7.0);
        let far = Rect::new(800.0, 950.0, 800.0, 950.0);

        p.step_physics(CONTAINER, &far, &[], &FieldParams::default());
        assert_eq!(p.offset(), Vec2::new(12.0, -7.0));
    }

    #[test]
    fn test_bounce_out_of_panel_edge() {
        // Particle centre at (301, 500), panel left edge at 300
        let mut p = particle_at(Vec2::new(30.1, 50.0), 4.0);
        let panel = Rect::new(300.0, 650.0, 375.0, 625.0);
        let params = FieldParams {
            // Isolate the bounce
            max_repulsion: 0.0,
            ..Default::default()
        };

        p.step_physics(CONTAINER, &panel, &[], &params);
        // Right edge 303 vs inset left edge 302: depth 1, pushed left by 1.05
        assert!((p.offset().x + 1.05).abs() < 1e-3);
        assert_eq!(p.offset().y, 0.0);
    }

    #[test]
    fn test_bounce_contributions_accumulate() {
        // Particle straddling two fragments' top edges
        let mut p = particle_at(Vec2::new(50.0, 10.0), 4.0);
        let far_panel = Rect::new(-2000.0, -1650.0, -2000.0, -1750.0);
        let a = Rect::new(480.0, 520.0, 99.0, 140.0);
        let b = Rect::new(490.0, 530.0, 99.0, 140.0);

        p.step_physics(CONTAINER, &far_panel, &[a, b], &FieldParams::default());
        // Body bottom 102 vs inset top 101: each pushes up by 1.05
        assert!((p.offset().y + 2.1).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_limits_offset() {
        let mut p = particle_at(Vec2::new(50.0, 50.0), 4.0);
        p.offset = Vec2::new(59.0, -59.0);
        // Panel top edge just below the particle pushes it past the limit
        let panel = Rect::new(380.0, 730.0, 434.0, 684.0);

        p.step_physics(CONTAINER, &panel, &[], &FieldParams::default());
        assert!(p.offset().x <= 60.0);
        assert!(p.offset().y >= -60.0);
    }

    #[test]
    fn test_display_offset_follows_physics() {
        let mut p = particle_at(Vec2::new(50.0, 50.0), 4.0);
        p.offset = Vec2::new(30.0, 0.0);
        for _ in 0..600 {
            p.step_display(crate::consts::FRAME_DT);
        }
        assert!((p.display_offset().x - 30.0).abs() < 0.05);
    }

    #[test]
    fn test_random_particles_are_deterministic() {
        let settings = Settings::default();
        let mut rng1 = Pcg32::seed_from_u64(7);
        let mut rng2 = Pcg32::seed_from_u64(7);

        for id in 0..10 {
            let a = Particle::random(id, &mut rng1, &settings);
            let b = Particle::random(id, &mut rng2, &settings);
            assert_eq!(a.base_percent(), b.base_percent());
            assert_eq!(a.size(), b.size());

            assert!((0.0..100.0).contains(&a.base_percent().x));
            assert!((3.0..6.0).contains(&a.size()));
            assert!((20.0..35.0).contains(&a.float_phase().period()));
            assert!(a.float_phase().amplitude().abs() <= 15.0);
        }
    }

    #[test]
    fn test_float_overlay_shape() {
        let float = FloatPhase::new(20.0, 12.0);
        assert_eq!(float.sample(0.0).dy, 0.0);
        assert!((float.sample(10.0).dy - 12.0).abs() < 1e-4);
        assert!((float.sample(10.0).opacity - 0.5).abs() < 1e-4);
        assert!((float.sample(20.0).dy).abs() < 1e-4);
        assert_eq!(float.at_rest().opacity, 0.2);
    }

    proptest! {
        #[test]
        fn prop_offset_stays_clamped(
            base in (0.0f32..100.0, 0.0f32..100.0),
            size in 3.0f32..6.0,
            panels in proptest::collection::vec((0.0f32..1000.0, 0.0f32..1000.0), 1..30),
            fragments in proptest::collection::vec((0.0f32..1000.0, 0.0f32..1000.0, 1.0f32..200.0, 1.0f32..60.0), 0..15),
        ) {
            let mut p = particle_at(Vec2::new(base.0, base.1), size);
            let frags: Vec<Rect> = fragments
                .iter()
                .map(|&(x, y, w, h)| Rect::new(x, x + w, y, y + h))
                .collect();
            let params = FieldParams::default();

            for (x, y) in panels {
                let panel = Rect::from_origin_size(Vec2::new(x, y), Vec2::new(350.0, 250.0));
                p.step_physics(CONTAINER, &panel, &frags, &params);
                prop_assert!(p.offset().x >= -60.0 && p.offset().x <= 60.0);
                prop_assert!(p.offset().y >= -60.0 && p.offset().y <= 60.0);
            }
        }
    }
}
