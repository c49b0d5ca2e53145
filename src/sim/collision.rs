//! Collision detection and response for axis-aligned rectangles
//!
//! Particles, the reveal panel and the text fragments are all boxes, so every
//! test here is a separating-axis check plus a minimum-penetration search.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Which side of the target a penetrating box should be pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Axis of a corrective displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Side {
    pub fn axis(&self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::X,
            Side::Top | Side::Bottom => Axis::Y,
        }
    }

    /// Unit direction that moves the penetrating box out through this side
    pub fn push(&self) -> Vec2 {
        match self {
            Side::Left => Vec2::NEG_X,
            Side::Right => Vec2::X,
            Side::Top => Vec2::NEG_Y,
            Side::Bottom => Vec2::Y,
        }
    }
}

/// Smallest penetration of one box into another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub side: Side,
    /// Penetration depth along `side` (distance to push out)
    pub amount: f32,
}

impl Overlap {
    /// Displacement that resolves the overlap, scaled by `strength`
    pub fn correction(&self, strength: f32) -> Vec2 {
        self.side.push() * self.amount * strength
    }
}

/// Check whether `a` overlaps `b` shrunk by `margin` on every side
///
/// Boxes that merely touch do not intersect, and empty boxes never do. The
/// test only compares interval overlap against `margin`, so swapping `a` and
/// `b` gives the same answer.
pub fn rect_intersects(a: &Rect, b: &Rect, margin: f32) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    a.left < b.right - margin
        && b.left < a.right - margin
        && a.top < b.bottom - margin
        && b.top < a.bottom - margin
}

/// Penetration depth of `a` into `b` along each direction, returning the smallest
///
/// Ties resolve in the order left, right, top, bottom.
pub fn min_overlap(a: &Rect, b: &Rect) -> Overlap {
    let candidates = [
        (Side::Left, a.right - b.left),
        (Side::Right, b.right - a.left),
        (Side::Top, a.bottom - b.top),
        (Side::Bottom, b.bottom - a.top),
    ];

    let mut best = Overlap {
        side: candidates[0].0,
        amount: candidates[0].1,
    };
    for &(side, amount) in &candidates[1..] {
        // Strict comparison keeps the earlier side on exact ties
        if amount < best.amount {
            best = Overlap { side, amount };
        }
    }
    best
}

/// Push-out correction for `a` against `target`, if they intersect
///
/// The target is inset by `margin` both for the test and for the depth
/// computation, so a corrected box ends up just outside the inset edge.
pub fn bounce_correction(a: &Rect, target: &Rect, margin: f32, strength: f32) -> Option<Vec2> {
    if !rect_intersects(a, target, margin) {
        return None;
    }
    let overlap = min_overlap(a, &target.inset(margin));
    Some(overlap.correction(strength))
}
