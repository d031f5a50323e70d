//! Drawing surfaces.
//!
//! A root component is anchored to a [`Surface`]. The engine only asks a
//! surface for its measured size; drawing itself belongs to the elements.

use std::cell::Cell;

use crate::pipeline::Viewport;
use crate::types::{size, Size};

pub trait Surface {
    /// Current size, or `None` when it cannot be measured.
    fn measure(&self) -> Option<Size<f64>>;
}

/// The terminal, measured through the shared [`Viewport`] signals.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    viewport: Viewport,
}

impl TerminalSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl Surface for TerminalSurface {
    fn measure(&self) -> Option<Size<f64>> {
        let (w, h) = (self.viewport.width(), self.viewport.height());
        (w > 0 && h > 0).then(|| size(w as f64, h as f64))
    }
}

/// A surface with a size set by the host; for headless use and tests.
#[derive(Debug)]
pub struct FixedSurface {
    size: Cell<Option<Size<f64>>>,
}

impl FixedSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Cell::new(Some(size(width, height))),
        }
    }

    /// A surface that cannot be measured (detached host element).
    pub fn unmeasurable() -> Self {
        Self {
            size: Cell::new(None),
        }
    }

    pub fn set_size(&self, width: f64, height: f64) {
        self.size.set(Some(size(width, height)));
    }
}

impl Surface for FixedSurface {
    fn measure(&self) -> Option<Size<f64>> {
        self.size.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_surface_follows_viewport() {
        let viewport = Viewport::new(80, 24);
        let surface = TerminalSurface::new(viewport.clone());
        assert_eq!(surface.measure(), Some(size(80.0, 24.0)));

        viewport.set_size(100, 30);
        assert_eq!(surface.measure(), Some(size(100.0, 30.0)));

        viewport.set_size(0, 30);
        assert_eq!(surface.measure(), None);
    }

    #[test]
    fn test_fixed_surface() {
        let surface = FixedSurface::new(300.0, 200.0);
        assert_eq!(surface.measure(), Some(size(300.0, 200.0)));
        assert_eq!(FixedSurface::unmeasurable().measure(), None);
    }
}
