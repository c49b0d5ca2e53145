//! Fixed timestep field tick and the frame loop around it
//!
//! `tick` is the whole per-frame update and knows nothing about scheduling.
//! `FrameLoop` decides when ticks happen: only while the pointer is over the
//! area, and never again once the host has unmounted.

use glam::Vec2;

use super::highlight::{HighlightChange, recompute_highlights};
use super::layout::LayoutProvider;
use super::rect::Rect;
use super::state::FieldState;
use crate::consts::*;

/// Input gathered since the previous tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position, container-local (the panel centres on it)
    pub pointer: Option<Vec2>,
    /// Pointer entered (`Some(true)`) or left (`Some(false)`) the area
    pub hover: Option<bool>,
}

/// What a single tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the layout was not ready and physics was skipped
    pub stepped: bool,
    /// Highlight flips produced by this tick
    pub changes: Vec<HighlightChange>,
}

/// Advance the field by one timestep
///
/// Order: input, panel spring, then (if the layout is measured) particle
/// physics against the panel and every registered fragment, then the
/// highlight set. An unmeasured container or missing panel skips the
/// physics for this tick; the next tick simply tries again.
pub fn tick<L: LayoutProvider + ?Sized>(
    state: &mut FieldState,
    input: &TickInput,
    layout: &L,
    dt: f32,
) -> TickReport {
    let mut report = TickReport::default();

    if let Some(hovered) = input.hover {
        report.changes.extend(state.set_hovered(hovered));
    }
    if let Some(pointer) = input.pointer {
        state.move_pointer(pointer);
    }

    state.advance_clock(dt);
    state.step_panel(dt);

    let Some(container) = layout.container_size() else {
        return report;
    };
    if !layout.obstacle_mounted() {
        return report;
    }

    let obstacle = state.obstacle();
    let params = *state.params();
    let fragments: Vec<Rect> = state
        .registry()
        .iter()
        .filter_map(|key| layout.fragment_bounds(key))
        .collect();

    for particle in state.particles_mut() {
        particle.step_physics(container, &obstacle, &fragments, &params);
        particle.step_display(dt);
    }

    if state.is_hovered() {
        let margin = state.settings().highlight_margin;
        let next = recompute_highlights(&obstacle, state.registry(), layout, margin);
        report.changes.extend(state.replace_highlights(next));
    }

    report.stepped = true;
    report
}

/// Whether the host should request another animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

/// Result of one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub outcome: FrameOutcome,
    /// Fixed-timestep ticks run this frame
    pub substeps: u32,
    /// Net highlight flips over the whole frame
    pub changes: Vec<HighlightChange>,
}

impl FrameReport {
    fn stopped() -> Self {
        Self {
            outcome: FrameOutcome::Stop,
            substeps: 0,
            changes: Vec::new(),
        }
    }
}

/// Drives `tick` from animation-frame timestamps
#[derive(Debug, Clone)]
pub struct FrameLoop {
    accumulator: f32,
    last_time: Option<f64>,
    active: bool,
    mounted: bool,
    /// Pointer moves since the last tick
    input: TickInput,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_time: None,
            active: false,
            mounted: true,
            input: TickInput::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active && self.mounted
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Pointer entered the area; returns true if the host must start scheduling frames
    pub fn pointer_enter(&mut self, state: &mut FieldState) -> bool {
        if !self.mounted {
            return false;
        }
        state.set_hovered(true);
        let start = !self.active;
        self.active = true;
        if start {
            self.last_time = None;
            self.accumulator = 0.0;
            log::debug!("Field loop started");
        }
        start
    }

    /// Pointer moved, container-local; applied on the next tick
    pub fn pointer_move(&mut self, local: Vec2) {
        if self.mounted {
            self.input.pointer = Some(local);
        }
    }

    /// Pointer left: highlights clear now, and the loop stops at the next frame
    pub fn pointer_leave(&mut self, state: &mut FieldState) -> Vec<HighlightChange> {
        if !self.mounted {
            return Vec::new();
        }
        if self.active {
            log::debug!("Field loop stopping");
        }
        self.active = false;
        self.input = TickInput::default();
        state.set_hovered(false)
    }

    /// Host is tearing down; no further reads or writes happen after this
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.active = false;
        self.input = TickInput::default();
        log::debug!("Field loop unmounted");
    }

    /// Run the ticks owed for an animation frame at `now_ms`
    pub fn frame<L: LayoutProvider + ?Sized>(
        &mut self,
        now_ms: f64,
        state: &mut FieldState,
        layout: &L,
    ) -> FrameReport {
        if !self.is_active() {
            return FrameReport::stopped();
        }

        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => FRAME_DT,
        };
        self.last_time = Some(now_ms);

        // Drop time we could never catch up on (tab in background, debugger)
        self.accumulator += dt.min(FRAME_DT * MAX_SUBSTEPS as f32);

        let before = state.highlights().clone();
        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.input);
            tick(state, &input, layout, FRAME_DT);
            self.accumulator -= FRAME_DT;
            substeps += 1;
        }

        let changes = before.changes_to(state.highlights());
        if !changes.is_empty() {
            log::trace!("{} highlight change(s) at t={:.2}s", changes.len(), state.time());
        }

        FrameReport {
            outcome: FrameOutcome::Continue,
            substeps,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::layout::StaticLayout;

    fn field() -> (FieldState, StaticLayout) {
        let mut state = FieldState::new(Settings::default());
        state.register_fragment("word");
        let layout = StaticLayout::new(Vec2::new(1200.0, 800.0))
            .with_fragment("word", Rect::new(120.0, 200.0, 120.0, 140.0));
        (state, layout)
    }

    #[test]
    fn test_tick_highlights_under_panel() {
        let (mut state, layout) = field();
        let enter = TickInput {
            pointer: Some(Vec2::new(275.0, 225.0)),
            hover: Some(true),
        };
        tick(&mut state, &enter, &layout, FRAME_DT);

        let idle = TickInput::default();
        for _ in 0..120 {
            tick(&mut state, &idle, &layout, FRAME_DT);
        }

        // Panel settled at (100, 100)-(450, 350)
        assert_eq!(state.obstacle(), Rect::new(100.0, 450.0, 100.0, 350.0));
        assert!(state.highlights().contains("word"));
    }

    #[test]
    fn test_tick_skips_until_measured() {
        let mut state = FieldState::new(Settings::default());
        let layout = StaticLayout::unmounted();

        let report = tick(&mut state, &TickInput::default(), &layout, FRAME_DT);
        assert!(!report.stepped);
        assert_eq!(state.time_ticks, 1);
        assert!(state.particles().iter().all(|p| p.offset() == Vec2::ZERO));
    }

    #[test]
    fn test_tick_skips_without_panel() {
        let (mut state, mut layout) = field();
        layout.obstacle_mounted = false;

        // The panel's resting box at (0, 0) already covers the word
        let enter = TickInput {
            pointer: Some(Vec2::new(175.0, 125.0)),
            hover: Some(true),
        };
        let report = tick(&mut state, &enter, &layout, FRAME_DT);
        assert!(!report.stepped);
        assert!(report.changes.is_empty());

        for _ in 0..30 {
            let report = tick(&mut state, &TickInput::default(), &layout, FRAME_DT);
            assert!(!report.stepped);
        }
        assert!(state.particles().iter().all(|p| p.offset() == Vec2::ZERO));
        assert!(state.highlights().is_empty());
        assert_eq!(state.time_ticks, 31);

        // Panel appears: the next tick catches up
        layout.obstacle_mounted = true;
        let report = tick(&mut state, &TickInput::default(), &layout, FRAME_DT);
        assert!(report.stepped);
        assert!(state.highlights().contains("word"));
    }

    #[test]
    fn test_tick_leave_clears_same_update() {
        let (mut state, layout) = field();
        tick(
            &mut state,
            &TickInput {
                pointer: Some(Vec2::new(275.0, 225.0)),
                hover: Some(true),
            },
            &layout,
            FRAME_DT,
        );
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), &layout, FRAME_DT);
        }
        assert!(!state.highlights().is_empty());

        let report = tick(
            &mut state,
            &TickInput {
                hover: Some(false),
                ..Default::default()
            },
            &layout,
            FRAME_DT,
        );
        assert!(state.highlights().is_empty());
        assert_eq!(report.changes.len(), 1);
    }

    #[test]
    fn test_frame_loop_lifecycle() {
        let (mut state, layout) = field();
        let mut frames = FrameLoop::new();

        // Not entered yet: nothing scheduled
        assert_eq!(frames.frame(0.0, &mut state, &layout).outcome, FrameOutcome::Stop);

        assert!(frames.pointer_enter(&mut state));
        assert!(!frames.pointer_enter(&mut state));
        frames.pointer_move(Vec2::new(275.0, 225.0));

        let first = frames.frame(1000.0, &mut state, &layout);
        assert_eq!(first.outcome, FrameOutcome::Continue);
        assert_eq!(first.substeps, 1);
        assert_eq!(state.pointer().get(), Vec2::new(100.0, 100.0));

        let mut now = 1000.0;
        for _ in 0..120 {
            now += 1000.0 / 60.0;
            frames.frame(now, &mut state, &layout);
        }
        assert!(state.highlights().contains("word"));

        let changes = frames.pointer_leave(&mut state);
        assert_eq!(changes.len(), 1);
        assert!(state.highlights().is_empty());
        assert_eq!(frames.frame(now + 16.0, &mut state, &layout).outcome, FrameOutcome::Stop);
    }

    #[test]
    fn test_frame_loop_caps_catch_up() {
        let (mut state, layout) = field();
        let mut frames = FrameLoop::new();
        frames.pointer_enter(&mut state);

        frames.frame(0.0, &mut state, &layout);
        // Five seconds later: still at most MAX_SUBSTEPS ticks
        let report = frames.frame(5000.0, &mut state, &layout);
        assert!(report.substeps <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_unmount_stops_everything() {
        let (mut state, layout) = field();
        let mut frames = FrameLoop::new();
        frames.pointer_enter(&mut state);
        frames.frame(0.0, &mut state, &layout);

        frames.unmount();
        let ticks = state.time_ticks;
        assert_eq!(frames.frame(16.0, &mut state, &layout).outcome, FrameOutcome::Stop);
        assert_eq!(state.time_ticks, ticks);
        assert!(!frames.pointer_enter(&mut state));
    }
}
