//! Core types for spark-plot.
//!
//! These types flow between the component tree, the layout algorithms and the
//! render scheduler. Geometry uses taffy's `Point` / `Size` with `f64` fields.

use std::fmt;

pub use taffy::geometry::{Point, Size};

// =============================================================================
// Component Identity
// =============================================================================

/// Stable handle to a node in a [`ComponentTree`](crate::engine::ComponentTree).
///
/// The generation distinguishes a live node from an earlier node that used
/// the same slot, so a stale id never resolves to a newer component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ComponentId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the registry.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Space Negotiation
// =============================================================================

/// Answer to "how much space do you need if offered this much?".
///
/// `width` / `height` are the minimum the component needs. The `wants_*`
/// flags say whether it would use strictly more if offered more.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpaceRequest {
    pub width: f64,
    pub height: f64,
    pub wants_width: bool,
    pub wants_height: bool,
}

impl SpaceRequest {
    /// Needs nothing, wants nothing.
    pub const NONE: Self = Self {
        width: 0.0,
        height: 0.0,
        wants_width: false,
        wants_height: false,
    };

    /// A fixed minimum that does not grow with the offer.
    pub const fn fixed(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            wants_width: false,
            wants_height: false,
        }
    }

    /// A minimum that would happily take everything offered.
    pub const fn greedy(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            wants_width: true,
            wants_height: true,
        }
    }
}

/// Position (relative to the parent) and size assigned by layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub origin: Point<f64>,
    pub size: Size<f64>,
}

impl Bounds {
    pub const ZERO: Self = Self {
        origin: Point { x: 0.0, y: 0.0 },
        size: Size {
            width: 0.0,
            height: 0.0,
        },
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Shift by a parent's absolute origin.
    pub fn translate(self, by: Point<f64>) -> Self {
        Self {
            origin: Point {
                x: self.origin.x + by.x,
                y: self.origin.y + by.y,
            },
            size: self.size,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Shorthand for building an `f64` size.
pub const fn size(width: f64, height: f64) -> Size<f64> {
    Size { width, height }
}

/// Shorthand for building an `f64` point.
pub const fn point(x: f64, y: f64) -> Point<f64> {
    Point { x, y }
}

// =============================================================================
// Alignment
// =============================================================================

/// Horizontal placement of a fixed-width component inside its offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl XAlign {
    /// Fraction of the slack placed to the left of the component.
    pub const fn proportion(self) -> f64 {
        match self {
            XAlign::Left => 0.0,
            XAlign::Center => 0.5,
            XAlign::Right => 1.0,
        }
    }
}

/// Vertical placement of a fixed-height component inside its offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl YAlign {
    /// Fraction of the slack placed above the component.
    pub const fn proportion(self) -> f64 {
        match self {
            YAlign::Top => 0.0,
            YAlign::Center => 0.5,
            YAlign::Bottom => 1.0,
        }
    }
}

// =============================================================================
// Component Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle and sizing state of a component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComponentFlags: u8 {
        const NONE = 0;
        /// Bound to a drawing surface through its root.
        const ANCHORED = 1 << 0;
        /// One-time setup already ran.
        const SETUP = 1 << 1;
        const FIXED_WIDTH = 1 << 2;
        const FIXED_HEIGHT = 1 << 3;
        /// Root follows viewport resizes while anchored.
        const AUTO_RESIZE = 1 << 4;
    }
}

/// What a bound broadcaster event invalidates on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Repaint only; the size did not change.
    Render,
    /// Renegotiate layout, then repaint.
    Layout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_proportions() {
        assert_eq!(XAlign::Left.proportion(), 0.0);
        assert_eq!(XAlign::Center.proportion(), 0.5);
        assert_eq!(YAlign::Bottom.proportion(), 1.0);
    }

    #[test]
    fn test_bounds_translate() {
        let b = Bounds::new(1.0, 2.0, 10.0, 20.0).translate(point(5.0, 5.0));
        assert_eq!(b, Bounds::new(6.0, 7.0, 10.0, 20.0));
    }

    #[test]
    fn test_flags_combine() {
        let flags = ComponentFlags::ANCHORED | ComponentFlags::FIXED_WIDTH;
        assert!(flags.contains(ComponentFlags::ANCHORED));
        assert!(!flags.contains(ComponentFlags::SETUP));
    }
}
