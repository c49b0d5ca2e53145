//! Which words the reveal panel is currently covering
//!
//! The set is rebuilt from nothing every frame and swapped in whole, so a
//! reader never sees a half-updated set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::collision::rect_intersects;
use super::layout::{FragmentRegistry, LayoutProvider};
use super::rect::Rect;

/// Keys of the text fragments overlapped by the panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSet {
    keys: BTreeSet<String>,
}

/// A single style flip the host has to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightChange {
    pub key: String,
    pub highlighted: bool,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
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

    /// Style flips needed to go from `self` to `next`
    pub fn changes_to(&self, next: &HighlightSet) -> Vec<HighlightChange> {
        let lit = next.keys.difference(&self.keys).map(|k| HighlightChange {
            key: k.clone(),
            highlighted: true,
        });
        let dimmed = self.keys.difference(&next.keys).map(|k| HighlightChange {
            key: k.clone(),
            highlighted: false,
        });
        lit.chain(dimmed).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build the highlight set for the panel at `obstacle`
///
/// Only registered fragments with measurable bounds are considered, so the
/// result is always a subset of the registry.
pub fn recompute_highlights<L: LayoutProvider + ?Sized>(
    obstacle: &Rect,
    registry: &FragmentRegistry,
    layout: &L,
    margin: f32,
) -> HighlightSet {
    registry
        .iter()
        .filter(|key| {
            layout
                .fragment_bounds(key)
                .is_some_and(|bounds| rect_intersects(obstacle, &bounds, margin))
        })
        .collect()
}
