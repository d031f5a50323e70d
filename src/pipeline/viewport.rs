//! Viewport size signals.
//!
//! The host viewport's size lives in two signals so anything reading it
//! (surfaces, reactive consumers) sees resizes as they are delivered.

use spark_signals::{signal, Signal};

// =============================================================================
// Viewport
// =============================================================================

/// Width and height of the host viewport, in cells.
///
/// Cloning shares the underlying signals.
#[derive(Clone)]
pub struct Viewport {
    width: Signal<u16>,
    height: Signal<u16>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: signal(width),
            height: signal(height),
        }
    }

    pub fn width(&self) -> u16 {
        self.width.get()
    }

    pub fn height(&self) -> u16 {
        self.height.get()
    }

    /// Set both dimensions (called on resize events).
    pub fn set_size(&self, width: u16, height: u16) {
        self.width.set(width);
        self.height.set(height);
    }

    /// Width signal for reactive tracking.
    pub fn width_signal(&self) -> Signal<u16> {
        self.width.clone()
    }

    /// Height signal for reactive tracking.
    pub fn height_signal(&self) -> Signal<u16> {
        self.height.clone()
    }

    /// Query the terminal through crossterm. Leaves the size untouched when
    /// no terminal is attached or it reports an empty size.
    pub fn detect(&self) -> bool {
        match crossterm::terminal::size() {
            Ok((width, height)) if width > 0 && height > 0 => {
                self.set_size(width, height);
                true
            }
            Ok(_) => false,
            Err(err) => {
                tracing::debug!(%err, "viewport size unavailable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_size() {
        let viewport = Viewport::new(80, 24);
        assert_eq!((viewport.width(), viewport.height()), (80, 24));

        viewport.set_size(120, 40);
        assert_eq!(viewport.width(), 120);
        assert_eq!(viewport.height(), 40);
    }

    #[test]
    fn test_clones_share_signals() {
        let viewport = Viewport::new(10, 10);
        let other = viewport.clone();
        other.set_size(33, 7);
        assert_eq!(viewport.width(), 33);
        assert_eq!(viewport.height_signal().get(), 7);
    }
}
