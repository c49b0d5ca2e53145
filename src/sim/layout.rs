//! Measurements supplied by the host page
//!
//! The simulation never touches a UI tree. It asks a [`LayoutProvider`] for
//! the container size and for the live bounds of each registered text
//! fragment, so the same code runs against the DOM or a synthetic fixture.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Read-only view of the host layout, valid for the duration of one frame
pub trait LayoutProvider {
    /// Size of the interactive container, or `None` before it is measured
    fn container_size(&self) -> Option<Vec2>;

    /// Whether the reveal panel element exists (it may be hidden on small screens)
    fn obstacle_mounted(&self) -> bool {
        true
    }

    /// Container-local bounds of a text fragment, or `None` if it is not mounted
    fn fragment_bounds(&self, key: &str) -> Option<Rect>;
}

/// The set of text fragments the host wants to be collision-aware
///
/// Keys keep their registration order so iteration is stable frame to frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRegistry {
    keys: Vec<String>,
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment key; returns false if it was already present
    pub fn register(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Remove a fragment key; returns false if it was not registered
    pub fn deregister(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FragmentRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = Self::new();
        for key in iter {
            registry.register(key);
        }
        registry
    }
}

/// Fixed layout, used by the native demo and by tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticLayout {
    pub container: Option<Vec2>,
    pub obstacle_mounted: bool,
    pub fragments: HashMap<String, Rect>,
}

impl StaticLayout {
    pub fn new(container: Vec2) -> Self {
        Self {
            container: Some(container),
            obstacle_mounted: true,
            fragments: HashMap::new(),
        }
    }

    /// Layout that has not been measured yet
    pub fn unmounted() -> Self {
        Self::default()
    }

    pub fn with_fragment(mut self, key: impl Into<String>, bounds: Rect) -> Self {
        self.fragments.insert(key.into(), bounds);
        self
    }

    pub fn set_fragment(&mut self, key: impl Into<String>, bounds: Rect) {
        self.fragments.insert(key.into(), bounds);
    }

    pub fn remove_fragment(&mut self, key: &str) {
        self.fragments.remove(key);
    }
}

impl LayoutProvider for StaticLayout {
    fn container_size(&self) -> Option<Vec2> {
        self.container
    }

    fn obstacle_mounted(&self) -> bool {
        self.obstacle_mounted
    }

    fn fragment_bounds(&self, key: &str) -> Option<Rect> {
        self.fragments.get(key).copied()
    }
}
