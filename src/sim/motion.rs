//! Raw pointer signals
//!
//! Pointer events only write here; everything heavier happens in the frame tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// A continuously updated scalar
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionValue {
    value: f32,
    /// Number of writes so far (lets readers detect fresh input)
    version: u64,
}

impl MotionValue {
    pub fn new(value: f32) -> Self {
        Self { value, version: 0 }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value
    }

    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.version += 1;
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Raw (unsmoothed) top-left corner of the reveal panel, container-local
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSignal {
    pub x: MotionValue,
    pub y: MotionValue,
}

impl PointerSignal {
    pub fn get(&self) -> Vec2 {
        Vec2::new(self.x.get(), self.y.get())
    }

    pub fn set(&mut self, pos: Vec2) {
        self.x.set(pos.x);
        self.y.set(pos.y);
    }

    /// Update from a viewport pointer position so the panel is centred on the pointer
    pub fn set_from_client(&mut self, client: Vec2, container: &Rect, obstacle_size: Vec2) {
        let local = client - Vec2::new(container.left, container.top);
        self.set(local - obstacle_size / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_value_tracks_writes() {
        let mut v = MotionValue::default();
        assert_eq!(v.get(), 0.0);
        assert_eq!(v.version(), 0);

        v.set(4.5);
        v.set(7.0);
        assert_eq!(v.get(), 7.0);
        assert_eq!(v.version(), 2);
    }

    #[test]
    fn test_pointer_centres_panel() {
        let mut signal = PointerSignal::default();
        let container = Rect::new(100.0, 1100.0, 200.0, 900.0);

        signal.set_from_client(Vec2::new(500.0, 600.0), &container, Vec2::new(350.0, 250.0));
        // (500 - 100 - 175, 600 - 200 - 125)
        assert_eq!(signal.get(), Vec2::new(225.0, 275.0));
    }
}
