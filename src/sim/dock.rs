//! Pointer-following magnification for the floating navbar
//!
//! Each icon grows as the pointer approaches its centre and eases back when
//! it leaves. A pointer outside the bar counts as infinitely far away.

use serde::{Deserialize, Serialize};

use super::keyframes::interpolate;
use super::rect::Rect;
use super::spring::{Spring, SpringConfig};

/// Pointer distance (from icon centre) at which magnification starts
pub const DOCK_REACH: f32 = 150.0;
/// Icon edge length at rest and under the pointer
pub const DOCK_BASE_SIZE: f32 = 40.0;
pub const DOCK_PEAK_SIZE: f32 = 56.0;

/// Target edge length for an icon whose centre is `distance` from the pointer
pub fn magnified_size(distance: f32) -> f32 {
    interpolate(
        &[-DOCK_REACH, 0.0, DOCK_REACH],
        &[DOCK_BASE_SIZE, DOCK_PEAK_SIZE, DOCK_BASE_SIZE],
        distance,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockIcon {
    width: Spring,
    height: Spring,
}

impl DockIcon {
    fn new(config: SpringConfig) -> Self {
        Self {
            width: Spring::new(config, DOCK_BASE_SIZE),
            height: Spring::new(config, DOCK_BASE_SIZE),
        }
    }

    pub fn width(&self) -> f32 {
        self.width.value()
    }

    pub fn height(&self) -> f32 {
        self.height.value()
    }
}

/// Navbar icon sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dock {
    icons: Vec<DockIcon>,
    /// Viewport pointer x, `None` while the pointer is outside the bar
    pointer_x: Option<f32>,
}

impl Dock {
    pub fn new(count: usize, config: SpringConfig) -> Self {
        Self {
            icons: vec![DockIcon::new(config); count],
            pointer_x: None,
        }
    }

    pub fn icons(&self) -> &[DockIcon] {
        &self.icons
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.pointer_x = Some(x);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_x = None;
    }

    /// Retarget every icon from its measured bounds and advance the springs
    ///
    /// Icons without bounds keep their previous target.
    pub fn step(&mut self, bounds: &[Option<Rect>], dt: f32) {
        for (icon, rect) in self.icons.iter_mut().zip(bounds) {
            if let Some(rect) = rect {
                let distance = match self.pointer_x {
                    Some(x) => x - (rect.left + rect.width() / 2.0),
                    None => f32::INFINITY,
                };
                let size = magnified_size(distance);
                icon.width.set_target(size);
                icon.height.set_target(size);
            }
            icon.width.step(dt);
            icon.height.step(dt);
        }
    }

    pub fn is_settled(&self) -> bool {
        self.icons
            .iter()
            .all(|i| i.width.is_settled() && i.height.is_settled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;

    fn bar() -> Vec<Option<Rect>> {
        (0..4)
            .map(|i| {
                let left = 100.0 + i as f32 * 56.0;
                Some(Rect::new(left, left + 40.0, 0.0, 40.0))
            })
            .collect()
    }

    #[test]
    fn test_magnified_size_curve() {
        assert_eq!(magnified_size(0.0), 56.0);
        assert_eq!(magnified_size(75.0), 48.0);
        assert_eq!(magnified_size(-400.0), 40.0);
        assert_eq!(magnified_size(f32::INFINITY), 40.0);
    }

    #[test]
    fn test_icon_under_pointer_grows() {
        let mut dock = Dock::new(4, SpringConfig::dock());
        let bounds = bar();
        // Centre of icon 1
        dock.pointer_move(176.0);

        for _ in 0..120 {
            dock.step(&bounds, FRAME_DT);
        }

        assert!((dock.icons()[1].width() - 56.0).abs() < 0.05);
        assert!(dock.icons()[0].width() > 40.0);
        assert!(dock.icons()[0].width() < dock.icons()[1].width());
        // Icon 3 sits 112 away: slightly magnified, less than its neighbour
        assert!((dock.icons()[3].width() - 44.053).abs() < 0.05);
        assert!(dock.icons()[3].width() < dock.icons()[2].width());
    }

    #[test]
    fn test_pointer_leave_restores_rest_size() {
        let mut dock = Dock::new(4, SpringConfig::dock());
        let bounds = bar();
        dock.pointer_move(176.0);
        for _ in 0..60 {
            dock.step(&bounds, FRAME_DT);
        }

        dock.pointer_leave();
        for _ in 0..120 {
            dock.step(&bounds, FRAME_DT);
        }
        assert!(dock.is_settled());
        for icon in dock.icons() {
            assert_eq!(icon.width(), 40.0);
            assert_eq!(icon.height(), 40.0);
        }
    }
}
