//! Field state and core simulation types
//!
//! Everything the frame tick reads or writes lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::beams::{BeamFrame, LightBeam, beams};
use super::highlight::{HighlightChange, HighlightSet};
use super::layout::FragmentRegistry;
use super::motion::PointerSignal;
use super::particle::{FieldParams, Particle, ParticleView};
use super::rect::Rect;
use super::spring::Spring2;
use crate::consts::BEAM_COUNT;
use crate::settings::Settings;

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete state of the reveal field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldState {
    settings: Settings,
    params: FieldParams,
    rng_state: RngState,
    /// Raw panel corner, written by pointer events
    pointer: PointerSignal,
    /// Smoothed panel corner, read by the tick
    panel: Spring2,
    /// Pointer is over the interactive area
    hovered: bool,
    particles: Vec<Particle>,
    beams: Vec<LightBeam>,
    registry: FragmentRegistry,
    highlights: HighlightSet,
    /// Seconds of simulated time
    time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl FieldState {
    /// Create a field, placing particles from `settings.seed`
    pub fn new(settings: Settings) -> Self {
        let rng_state = RngState::new(settings.seed);
        let mut rng = rng_state.to_rng();

        let particles = (0..settings.particle_count())
            .map(|i| Particle::random(i as u32, &mut rng, &settings))
            .collect();
        let beams = if settings.effective_beams() {
            beams(BEAM_COUNT)
        } else {
            Vec::new()
        };

        Self {
            params: FieldParams::from(&settings),
            panel: Spring2::new(settings.panel_spring, Vec2::ZERO),
            settings,
            rng_state,
            pointer: PointerSignal::default(),
            hovered: false,
            particles,
            beams,
            registry: FragmentRegistry::new(),
            highlights: HighlightSet::new(),
            time: 0.0,
            time_ticks: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn pointer(&self) -> &PointerSignal {
        &self.pointer
    }

    /// Place the panel centre at a container-local pointer position
    pub fn move_pointer(&mut self, local: Vec2) {
        self.pointer.set(local - self.settings.obstacle_size() / 2.0);
    }

    /// Place the panel from a viewport pointer position and the container's viewport bounds
    pub fn move_pointer_client(&mut self, client: Vec2, container: &Rect) {
        let size = self.settings.obstacle_size();
        self.pointer.set_from_client(client, container, size);
    }

    /// Smoothed top-left corner of the panel
    pub fn smoothed(&self) -> Vec2 {
        self.panel.value()
    }

    /// The panel's collision box
    pub fn obstacle(&self) -> Rect {
        Rect::from_origin_size(self.smoothed(), self.settings.obstacle_size())
    }

    /// Advance the panel spring toward the latest pointer position
    pub(crate) fn step_panel(&mut self, dt: f32) {
        self.panel.set_target(self.pointer.get());
        self.panel.step(dt);
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.time += dt;
        self.time_ticks += 1;
    }

    /// Enter or leave the interactive area
    ///
    /// Leaving empties the highlight set immediately and returns the flips.
    pub fn set_hovered(&mut self, hovered: bool) -> Vec<HighlightChange> {
        self.hovered = hovered;
        if hovered {
            return Vec::new();
        }
        self.replace_highlights(HighlightSet::new())
    }

    pub fn registry(&self) -> &FragmentRegistry {
        &self.registry
    }

    pub fn register_fragment(&mut self, key: impl Into<String>) -> bool {
        self.registry.register(key)
    }

    /// Stop tracking a fragment; it also drops out of the highlight set
    ///
    /// Returns the un-highlight flip if the fragment was lit.
    pub fn deregister_fragment(&mut self, key: &str) -> Vec<HighlightChange> {
        if !self.registry.deregister(key) || !self.highlights.contains(key) {
            return Vec::new();
        }
        let remaining: HighlightSet = self.highlights.iter().filter(|k| *k != key).collect();
        self.replace_highlights(remaining)
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    /// Swap in a freshly computed set, returning the style flips
    pub(crate) fn replace_highlights(&mut self, next: HighlightSet) -> Vec<HighlightChange> {
        let changes = self.highlights.changes_to(&next);
        self.highlights = next;
        changes
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Ease every particle's drawn offset toward its physics offset
    ///
    /// Used by hosts while the tick loop is idle, so particles finish their
    /// glide after the pointer leaves. Returns true once all have settled.
    pub fn settle_display(&mut self, dt: f32) -> bool {
        let mut settled = true;
        for particle in &mut self.particles {
            particle.step_display(dt);
            settled &= particle.display_settled();
        }
        settled
    }

    /// Float or beams still need frames even with the pointer away
    pub fn has_ambient_motion(&self) -> bool {
        self.settings.effective_float() || !self.beams.is_empty()
    }

    /// Particles as drawn at `wall_time` seconds on the host's clock
    ///
    /// The float overlay runs on wall time, independent of `time()`, which
    /// only advances while the tick loop runs.
    pub fn particle_views(&self, wall_time: f32) -> Vec<ParticleView> {
        let animate = self.settings.effective_float();
        self.particles
            .iter()
            .map(|p| p.view(wall_time, animate))
            .collect()
    }

    pub fn beam_frames(&self, wall_time: f32) -> Vec<BeamFrame> {
        self.beams.iter().map(|b| b.sample(wall_time)).collect()
    }

    /// Everything the host needs to draw the frame at `wall_time`
    pub fn snapshot(&self, wall_time: f32) -> Snapshot {
        Snapshot {
            time: self.time,
            wall_time,
            hovered: self.hovered,
            obstacle: self.obstacle(),
            highlights: self.highlights.iter().map(str::to_owned).collect(),
            particles: self.particle_views(wall_time),
            beams: self.beam_frames(wall_time),
        }
    }
}

/// Serializable per-frame view of the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated seconds
    pub time: f32,
    /// Host clock the overlays were sampled at
    pub wall_time: f32,
    pub hovered: bool,
    pub obstacle: Rect,
    pub highlights: Vec<String>,
    pub particles: Vec<ParticleView>,
    pub beams: Vec<BeamFrame>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::settings::QualityPreset;

    #[test]
    fn test_new_field_matches_settings() {
        let state = FieldState::new(Settings::default());
        assert_eq!(state.particles().len(), 40);
        assert_eq!(state.beam_frames(0.0).len(), 3);
        assert_eq!(state.obstacle(), Rect::new(0.0, 350.0, 0.0, 250.0));
        assert!(!state.is_hovered());

        let low = FieldState::new(Settings::from_preset(QualityPreset::Low));
        assert_eq!(low.particles().len(), 12);
        assert!(low.beam_frames(0.0).is_empty());
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = FieldState::new(Settings::default());
        let b = FieldState::new(Settings::default());
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.id(), pb.id());
            assert_eq!(pa.base_percent(), pb.base_percent());
            assert_eq!(pa.size(), pb.size());
        }

        let c = FieldState::new(Settings {
            seed: 1,
            ..Default::default()
        });
        assert_ne!(a.particles()[0].base_percent(), c.particles()[0].base_percent());
    }

    #[test]
    fn test_move_pointer_centres_panel() {
        let mut state = FieldState::new(Settings::default());
        state.move_pointer(Vec2::new(400.0, 300.0));
        assert_eq!(state.pointer().get(), Vec2::new(225.0, 175.0));
        // Smoothed value only moves on tick
        assert_eq!(state.smoothed(), Vec2::ZERO);
    }

    #[test]
    fn test_leave_clears_highlights() {
        let mut state = FieldState::new(Settings::default());
        state.register_fragment("a");
        state.set_hovered(true);
        state.replace_highlights(["a"].into_iter().collect());

        let changes = state.set_hovered(false);
        assert!(state.highlights().is_empty());
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].highlighted);
    }

    #[test]
    fn test_deregister_drops_highlight() {
        let mut state = FieldState::new(Settings::default());
        state.register_fragment("a");
        state.register_fragment("b");
        state.replace_highlights(["a", "b"].into_iter().collect());

        let changes = state.deregister_fragment("a");
        assert_eq!(
            changes,
            vec![HighlightChange {
                key: "a".to_owned(),
                highlighted: false,
            }]
        );
        assert!(!state.highlights().contains("a"));
        assert!(state.highlights().contains("b"));
        assert!(!state.registry().contains("a"));

        // Already gone, or registered but dark: no flips
        assert!(state.deregister_fragment("a").is_empty());
        state.register_fragment("c");
        assert!(state.deregister_fragment("c").is_empty());
        assert!(!state.registry().contains("c"));
    }

    #[test]
    fn test_overlays_follow_wall_clock_while_idle() {
        let state = FieldState::new(Settings::default());
        assert_eq!(state.time(), 0.0);

        let early = state.particle_views(0.0);
        let later = state.particle_views(10.0);
        assert!(early.iter().zip(&later).any(|(a, b)| a.float_dy != b.float_dy));
        assert!(early.iter().zip(&later).any(|(a, b)| a.opacity != b.opacity));

        // Beam 0 is mid-sweep ten seconds in
        assert_eq!(state.beam_frames(0.0)[0].x_percent, -100.0);
        assert!(state.beam_frames(10.0)[0].x_percent > -100.0);
        assert!(state.has_ambient_motion());
    }

    #[test]
    fn test_reduced_motion_has_no_ambient_motion() {
        let state = FieldState::new(Settings {
            reduced_motion: true,
            ..Default::default()
        });
        assert!(!state.has_ambient_motion());
        assert_eq!(state.particle_views(0.0), state.particle_views(12.0));
    }

    #[test]
    fn test_settle_display_finishes_glide() {
        let mut state = FieldState::new(Settings::default());
        state.particles_mut()[0].set_offset(Vec2::new(30.0, -20.0));
        assert!(!state.settle_display(FRAME_DT));

        let mut settled = false;
        for _ in 0..300 {
            if state.settle_display(FRAME_DT) {
                settled = true;
                break;
            }
        }
        assert!(settled);
        let drawn = state.particles()[0].display_offset();
        assert!((drawn - Vec2::new(30.0, -20.0)).length() < 0.02);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = FieldState::new(Settings::default());
        let json = serde_json::to_string(&state.snapshot(1.5)).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.particles.len(), 40);
        assert_eq!(back.obstacle, state.obstacle());
        assert_eq!(back.wall_time, 1.5);
    }
}
