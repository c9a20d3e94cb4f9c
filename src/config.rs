use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Chart configuration, fixed for the lifetime of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Divide each series by its maximum absolute value before drawing
    #[serde(default = "default_false")]
    pub normalize: bool,

    #[serde(default)]
    pub subplots: SubplotConfig,

    /// Minimum number of seconds between two render passes
    #[serde(default = "default_render_interval")]
    pub render_interval: f64,

    /// Bulk mode: only render once the input is exhausted
    #[serde(default = "default_false")]
    pub no_refresh: bool,

    /// Exclude time spent rendering from the plotted time axis
    #[serde(default = "default_true")]
    pub compensate_render_time: bool,
}

/// Subplot-per-series layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubplotConfig {
    #[serde(default = "default_false")]
    pub show: bool,

    /// Number of subplot rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<usize>,

    /// Number of subplot columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<usize>,
}

/// Largest number of subplot rows or columns
pub const MAX_GRID_DIMENSION: usize = 64;

fn default_render_interval() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            normalize: false,
            subplots: SubplotConfig::default(),
            render_interval: default_render_interval(),
            no_refresh: false,
            compensate_render_time: true,
        }
    }
}

impl SubplotConfig {
    /// Subplots with the grid chosen from the series count.
    pub fn auto() -> Self {
        Self {
            show: true,
            vertical: None,
            horizontal: None,
        }
    }

    /// Subplots on an explicit `horizontal` x `vertical` grid.
    pub fn grid(horizontal: usize, vertical: usize) -> Self {
        Self {
            show: true,
            vertical: Some(vertical),
            horizontal: Some(horizontal),
        }
    }
}

/// `HxV` grid argument, e.g. `5x6` for five columns and six rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub horizontal: usize,
    pub vertical: usize,
}

impl FromStr for GridSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || ConfigError::ValidationError(format!("expected a grid like `3x2`, got `{s}`"));

        let (horizontal, vertical) = s
            .trim()
            .split_once(|c: char| c.eq_ignore_ascii_case(&'x'))
            .ok_or_else(invalid)?;
        let horizontal: usize = horizontal.trim().parse().map_err(|_| invalid())?;
        let vertical: usize = vertical.trim().parse().map_err(|_| invalid())?;
        if horizontal == 0 || vertical == 0 {
            return Err(ConfigError::ValidationError(format!(
                "subplot grid `{s}` must have at least one row and one column"
            )));
        }
        if horizontal > MAX_GRID_DIMENSION || vertical > MAX_GRID_DIMENSION {
            return Err(ConfigError::ValidationError(format!(
                "subplot grid `{s}` exceeds {MAX_GRID_DIMENSION} rows or columns"
            )));
        }

        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

impl From<GridSpec> for SubplotConfig {
    fn from(spec: GridSpec) -> Self {
        SubplotConfig::grid(spec.horizontal, spec.vertical)
    }
}

impl ChartConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: ChartConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the aggregator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        interval_from_secs(self.render_interval)?;
        for dimension in [self.subplots.vertical, self.subplots.horizontal]
            .into_iter()
            .flatten()
        {
            if !(1..=MAX_GRID_DIMENSION).contains(&dimension) {
                return Err(ConfigError::ValidationError(format!(
                    "subplot grid dimensions must be between 1 and {MAX_GRID_DIMENSION}, got {dimension}"
                )));
            }
        }
        Ok(())
    }

    /// Render interval as a [`Duration`]; unrepresentable values saturate.
    pub fn render_interval(&self) -> Duration {
        interval_from_secs(self.render_interval).unwrap_or(Duration::MAX)
    }
}

/// Seconds between render passes as a [`Duration`].
///
/// Rejects negative, non-finite and out-of-range values.
pub fn interval_from_secs(seconds: f64) -> Result<Duration, ConfigError> {
    if seconds.is_finite() && seconds >= 0.0 {
        if let Ok(interval) = Duration::try_from_secs_f64(seconds) {
            return Ok(interval);
        }
    }
    Err(ConfigError::ValidationError(format!(
        "render_interval must be a non-negative number of seconds, got {seconds}"
    )))
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
