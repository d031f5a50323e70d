//! Engine configuration.
//!
//! One [`EngineConfig`] seeds an [`Engine`](crate::engine::Engine): render
//! policy and its timings, the Table iteration cap and the initial viewport.

use std::time::Duration;

use crate::error::{PlotError, PlotResult};
use crate::layout::table::MAX_LAYOUT_ITERATIONS;
use crate::pipeline::RenderPolicy;

/// Display refresh cadence used by [`RenderPolicy::AnimationFrame`].
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Fixed delay used by [`RenderPolicy::Timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_micros(1_000_000 / 60);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub render_policy: RenderPolicy,
    pub frame_interval: Duration,
    pub timeout: Duration,
    pub table_iteration_limit: usize,
    /// Columns x rows before the first measurement.
    pub initial_viewport: (u16, u16),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_policy: RenderPolicy::AnimationFrame,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            table_iteration_limit: MAX_LAYOUT_ITERATIONS,
            initial_viewport: (80, 24),
        }
    }
}

impl EngineConfig {
    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.render_policy = policy;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_table_iteration_limit(mut self, limit: usize) -> Self {
        self.table_iteration_limit = limit;
        self
    }

    pub fn with_initial_viewport(mut self, width: u16, height: u16) -> Self {
        self.initial_viewport = (width, height);
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        if self.frame_interval.is_zero() {
            return Err(PlotError::InvalidConfig("frame interval must be non-zero".into()));
        }
        if self.timeout.is_zero() {
            return Err(PlotError::InvalidConfig("timeout must be non-zero".into()));
        }
        if self.table_iteration_limit == 0 {
            return Err(PlotError::InvalidConfig(
                "table iteration limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.render_policy, RenderPolicy::AnimationFrame);
        assert_eq!(config.table_iteration_limit, 5);
    }

    #[test]
    fn test_rejects_zero_cap() {
        let config = EngineConfig::default().with_table_iteration_limit(0);
        assert!(matches!(config.validate(), Err(PlotError::InvalidConfig(_))));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_render_policy(RenderPolicy::Timeout)
            .with_timeout(Duration::from_millis(5))
            .with_initial_viewport(120, 40);
        assert_eq!(config.render_policy, RenderPolicy::Timeout);
        assert_eq!(config.timeout, Duration::from_millis(5));
        assert_eq!(config.initial_viewport, (120, 40));
    }
}
