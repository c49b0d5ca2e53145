//! Axis-aligned rectangles in container-local coordinates
//!
//! Screen convention: x grows to the right, y grows downward, so `top < bottom`
//! for any non-empty rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Rectangle with its top-left corner at `origin`
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.x + size.x, origin.y, origin.y + size.y)
    }

    /// Square of side `size` centred on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.x + half, center.y - half, center.y + half)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Zero-area or inverted rectangles are empty and never collide
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Shrink by `margin` on every side (grows for negative margins)
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.left + margin,
            self.right - margin,
            self.top + margin,
            self.bottom - margin,
        )
    }

    /// Move by `delta`
    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(
            self.left + delta.x,
            self.right + delta.x,
            self.top + delta.y,
            self.bottom + delta.y,
        )
    }

    /// Express a viewport-space rectangle relative to `origin`'s top-left corner
    pub fn relative_to(&self, origin: &Rect) -> Self {
        self.translate(Vec2::new(-origin.left, -origin.top))
    }
}
