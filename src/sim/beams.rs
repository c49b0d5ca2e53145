//! Decorative light beams sweeping behind the particle layer
//!
//! Purely time-driven: beam `i` starts `2i` seconds in, takes `15 + 5i`
//! seconds to cross, rests for 2 seconds, and repeats.

use serde::{Deserialize, Serialize};

use super::keyframes::Keyframes;

/// Seconds a beam rests off-screen between sweeps
const REPEAT_DELAY: f32 = 2.0;

/// Colour family a beam is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamTone {
    Primary,
    Secondary,
}

/// One frame of a beam for the host to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamFrame {
    pub index: usize,
    /// Fixed horizontal anchor, percent of the container width
    pub left_percent: f32,
    /// Translation relative to the beam's own width, percent
    pub x_percent: f32,
    pub opacity: f32,
    pub tone: BeamTone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightBeam {
    index: usize,
}

impl LightBeam {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Seconds for one sweep
    pub fn duration(&self) -> f32 {
        15.0 + self.index as f32 * 5.0
    }

    /// Seconds before the first sweep
    pub fn delay(&self) -> f32 {
        self.index as f32 * 2.0
    }

    fn timeline<const N: usize>(&self, values: [f32; N]) -> Keyframes<N> {
        Keyframes::new(values, self.duration())
            .with_delay(self.delay())
            .with_repeat_delay(REPEAT_DELAY)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tone(&self) -> BeamTone {
        if self.index % 2 == 0 {
            BeamTone::Primary
        } else {
            BeamTone::Secondary
        }
    }

    pub fn sample(&self, time: f32) -> BeamFrame {
        BeamFrame {
            index: self.index,
            left_percent: self.index as f32 * 30.0,
            x_percent: self.timeline([-100.0, 200.0]).sample(time),
            opacity: self.timeline([0.0, 0.4, 0.0]).sample(time),
            tone: self.tone(),
        }
    }
}

/// The standard set of `count` beams
pub fn beams(count: usize) -> Vec<LightBeam> {
    (0..count).map(LightBeam::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_waits_for_delay() {
        let beam = LightBeam::new(2);
        let frame = beam.sample(3.0);
        assert_eq!(frame.x_percent, -100.0);
        assert_eq!(frame.opacity, 0.0);
        assert_eq!(frame.left_percent, 60.0);
        assert_eq!(frame.tone, BeamTone::Primary);
    }

    #[test]
    fn test_beam_peaks_mid_sweep() {
        let beam = LightBeam::new(0);
        let frame = beam.sample(7.5);
        assert!((frame.x_percent - 50.0).abs() < 1e-3);
        assert!((frame.opacity - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_beam_rests_between_sweeps() {
        let beam = LightBeam::new(1);
        // Delay 2, duration 20: rest from 22 to 24
        let frame = beam.sample(23.0);
        assert_eq!(frame.x_percent, 200.0);
        assert_eq!(frame.opacity, 0.0);
        assert_eq!(beam.sample(24.0).x_percent, -100.0);
        assert_eq!(frame.tone, BeamTone::Secondary);
    }

    #[test]
    fn test_beam_set() {
        let set = beams(3);
        assert_eq!(set.len(), 3);
        assert_eq!(set[2].index(), 2);
    }
}
