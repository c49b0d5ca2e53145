//! Deterministic simulation module
//!
//! All of the field's behaviour lives here. This module must stay pure:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (particle id, fragment registration order)
//! - No DOM or platform dependencies; measurements come in through `LayoutProvider`

pub mod beams;
pub mod collision;
pub mod dock;
pub mod highlight;
pub mod keyframes;
pub mod layout;
pub mod motion;
pub mod particle;
pub mod rect;
pub mod spring;
pub mod state;
pub mod tick;

pub use beams::{BeamFrame, BeamTone, LightBeam};
pub use collision::{Axis, Overlap, Side, bounce_correction, min_overlap, rect_intersects};
pub use dock::{Dock, DockIcon, magnified_size};
pub use highlight::{HighlightChange, HighlightSet, recompute_highlights};
pub use keyframes::{Easing, Keyframes, interpolate};
pub use layout::{FragmentRegistry, LayoutProvider, StaticLayout};
pub use motion::{MotionValue, PointerSignal};
pub use particle::{FieldParams, FloatPhase, FloatSample, Particle, ParticleView, repulsion};
pub use rect::Rect;
pub use spring::{Spring, Spring2, SpringConfig};
pub use state::{FieldState, Snapshot};
pub use tick::{FrameLoop, FrameOutcome, FrameReport, TickInput, TickReport, tick};
