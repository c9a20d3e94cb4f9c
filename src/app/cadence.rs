//! Render cadence and render-time compensation.

use std::time::{Duration, Instant};

use crate::config::ChartConfig;

/// Decides when a render pass is due and keeps the time axis free of the
/// time spent rendering.
#[derive(Debug, Clone)]
pub struct RenderCadence {
    interval: Duration,
    enabled: bool,
    compensate: bool,
    last_render: Instant,
    time_spent_rendering: Duration,
    passes: usize,
}

impl RenderCadence {
    /// `started_at` counts as the last render, so the first pass comes one
    /// interval after ingestion starts.
    pub fn new(config: &ChartConfig, started_at: Instant) -> Self {
        Self {
            interval: config.render_interval(),
            enabled: !config.no_refresh,
            compensate: config.compensate_render_time,
            last_render: started_at,
            time_spent_rendering: Duration::ZERO,
            passes: 0,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled && now.saturating_duration_since(self.last_render) >= self.interval
    }

    /// Account for a pass that ran from `began` to `ended`.
    pub fn record_pass(&mut self, began: Instant, ended: Instant) {
        self.last_render = began;
        self.time_spent_rendering += ended.saturating_duration_since(began);
        self.passes += 1;
    }

    /// Seconds since `started_at` to plot for a sample taken at `now`.
    pub fn axis_time(&self, started_at: Instant, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(started_at);
        let elapsed = if self.compensate {
            elapsed.saturating_sub(self.time_spent_rendering)
        } else {
            elapsed
        };
        elapsed.as_secs_f64()
    }

    pub fn time_spent_rendering(&self) -> Duration {
        self.time_spent_rendering
    }

    pub fn passes(&self) -> usize {
        self.passes
    }
}
